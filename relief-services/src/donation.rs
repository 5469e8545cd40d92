//! Donations against campaigns.

use serde::{Deserialize, Serialize};
use tracing::info;

use relief_core::error::ReliefResult;
use relief_core::ids;
use relief_models::{Campaign, Donation, NewDonation, RecordedDonation, Store};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState, StateCell};

/// Result of a donation: the record plus the campaign after the update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceipt {
    pub donation: Donation,
    pub campaign: Campaign,
}

pub struct DonationService {
    state: StateCell,
    store: Store,
    event_bus: EventBus,
}

impl DonationService {
    pub fn new(store: Store, event_bus: EventBus) -> Self {
        Self {
            state: StateCell::new(),
            store,
            event_bus,
        }
    }

    /// Donations recorded for a campaign. Unknown campaigns are `NotFound`.
    pub async fn list(&self, campaign_id: u64) -> ReliefResult<Vec<Donation>> {
        self.store.donations_for(campaign_id).await
    }

    /// Record a donation and bump the campaign's raised total.
    pub async fn donate(&self, campaign_id: u64, new: NewDonation) -> ReliefResult<DonationReceipt> {
        let amount = new.amount.value()?;
        let donor = new.donor_name();
        let tx_id = ids::random_tx_id(&mut rand::thread_rng());

        let RecordedDonation {
            donation,
            campaign,
            reached_goal,
        } = self
            .store
            .record_donation(campaign_id, donor, amount, new.message, tx_id)
            .await?;

        info!(
            "donation {} of {:.2} to campaign {} ({:.0}% of goal)",
            donation.id,
            donation.amount,
            campaign_id,
            campaign.progress() * 100.0
        );
        self.event_bus.emit(AppEvent::DonationReceived {
            campaign_id,
            donation_id: donation.id,
            amount: donation.amount,
            goal_reached: reached_goal,
        });
        Ok(DonationReceipt { donation, campaign })
    }
}

impl Service for DonationService {
    fn name(&self) -> &str {
        "donation"
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    fn init(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Running);
        Ok(())
    }

    fn shutdown(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}
