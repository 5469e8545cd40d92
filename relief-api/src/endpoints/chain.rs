//! Escrow endpoints backed by the simulated chain.

use relief_core::error::ReliefResult;
use relief_models::Amount;
use relief_services::{EscrowApproval, EscrowRelease, EscrowStatus, QuickDonation, QuickDonationReceipt};

use crate::client::ApiClient;

impl ApiClient {
    /// `POST /api/donate`: deposit `algos` into the platform escrow.
    pub async fn quick_donate(
        &self,
        algos: f64,
        donor: Option<&str>,
        campaign_id: Option<u64>,
    ) -> ReliefResult<QuickDonationReceipt> {
        let body = QuickDonation {
            amount: Amount::Number(algos),
            donor: donor.map(str::to_owned),
            campaign_id,
        };
        self.post_json("/api/donate", &body).await
    }

    /// `GET /api/escrow-status`.
    pub async fn escrow_status(&self) -> ReliefResult<EscrowStatus> {
        self.get_json("/api/escrow-status").await
    }

    /// `POST /api/escrow/approve` as the oracle with this name or address.
    pub async fn approve_escrow(&self, oracle: &str) -> ReliefResult<EscrowStatus> {
        let body = EscrowApproval {
            oracle: oracle.to_string(),
        };
        self.post_json("/api/escrow/approve", &body).await
    }

    /// `POST /api/escrow/release`: pay the escrow to its beneficiary.
    pub async fn release_escrow(&self) -> ReliefResult<EscrowRelease> {
        self.post_json("/api/escrow/release", &serde_json::json!({})).await
    }
}
