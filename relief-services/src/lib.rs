//! Relief Services - Business logic and service layer.
//!
//! This crate provides the service trait, the service registry that wires
//! the store, event bus, and chain simulator together, and the concrete
//! services behind every REST route:
//! - Campaign listing, lookup, and creation
//! - Donations with lenient amount parsing and goal tracking
//! - Proof uploads written to disk, plus verification status
//! - Mock login with opaque bearer tokens
//! - Platform statistics
//! - The shared donation escrow on the simulated chain
//! - Event bus (typed intra-service communication)
//! - Event logger that records application and ledger events

pub mod service;
pub mod registry;
pub mod event_bus;
pub mod event_log;
pub mod campaign;
pub mod donation;
pub mod proof;
pub mod auth;
pub mod stats;
pub mod escrow;

// Re-export key types
pub use service::{Service, ServiceState};
pub use registry::ServiceRegistry;
pub use event_bus::{AppEvent, EventBus};
pub use event_log::{EventLogger, EventTally};
pub use campaign::CampaignService;
pub use donation::{DonationReceipt, DonationService};
pub use proof::{ProofService, Upload};
pub use auth::{AuthService, LoginRequest, LoginResponse};
pub use stats::StatsService;
pub use escrow::{EscrowApproval, EscrowRelease, EscrowService, EscrowStatus, QuickDonation, QuickDonationReceipt};
