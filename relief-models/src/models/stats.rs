//! Platform-wide aggregate figures.

use serde::{Deserialize, Serialize};

/// Aggregates over every in-memory collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    pub completed_campaigns: usize,
    pub total_raised: f64,
    pub total_goal: f64,
    pub total_donations: usize,
    /// Distinct donor names, compared case-insensitively.
    pub unique_donors: usize,
    pub average_donation: f64,
    pub total_proofs: usize,
    pub verified_proofs: usize,
    pub total_users: usize,
}
