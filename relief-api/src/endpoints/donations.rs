//! Donation endpoints.

use relief_core::error::ReliefResult;
use relief_models::{Donation, NewDonation};
use relief_services::DonationReceipt;

use crate::client::ApiClient;

impl ApiClient {
    /// `GET /api/campaigns/:id/donations`.
    pub async fn donations(&self, campaign_id: u64) -> ReliefResult<Vec<Donation>> {
        self.get_json(&format!("/api/campaigns/{campaign_id}/donations"))
            .await
    }

    /// `POST /api/campaigns/:id/donate`. Returns the donation and the
    /// campaign with its updated `raised` total.
    pub async fn donate(&self, campaign_id: u64, donation: &NewDonation) -> ReliefResult<DonationReceipt> {
        self.post_json(&format!("/api/campaigns/{campaign_id}/donate"), donation)
            .await
    }
}
