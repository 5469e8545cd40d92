//! Relief API - HTTP client for the relief platform REST API.
//!
//! A typed client over every route the relief server exposes, with JSON
//! error bodies mapped onto `ReliefError::ServerError` and exponential
//! backoff retry on gateway errors.

pub mod client;
pub mod endpoints;

// Re-export key types
pub use client::{ApiClient, RetryConfig};
pub use endpoints::campaigns::CampaignQuery;
pub use endpoints::proofs::ProofFile;
