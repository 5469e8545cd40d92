//! Relief Models - Entity models, the in-memory store, and seed data.
//!
//! Nothing here is persisted: the store is rebuilt from the seed generator
//! every time a server starts, and discarded when it stops.

pub mod models;
pub mod store;
pub mod seed;

// Re-export key types
pub use models::campaign::{Campaign, CampaignFilter, CampaignList, CampaignStatus, DisasterType, NewCampaign};
pub use models::donation::{Amount, Donation, NewDonation};
pub use models::proof::{NewProof, Proof, ProofStatus, ProofStatusUpdate};
pub use models::user::{User, UserProfile};
pub use models::stats::Stats;
pub use models::health::HealthStatus;
pub use models::page::{Page, PageRequest};
pub use store::{RecordedDonation, Store, StoreData};
