//! API endpoint modules organized by resource.
//!
//! Each module adds typed methods to [`ApiClient`](crate::ApiClient) for a
//! group of related routes.

pub mod server;
pub mod campaigns;
pub mod donations;
pub mod proofs;
pub mod users;
pub mod chain;
pub mod assess;
