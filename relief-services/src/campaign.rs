//! Campaign listing, lookup, and creation.

use tracing::info;

use relief_core::error::ReliefResult;
use relief_models::{Campaign, CampaignFilter, NewCampaign, Page, PageRequest, Store};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState, StateCell};

pub struct CampaignService {
    state: StateCell,
    store: Store,
    event_bus: EventBus,
}

impl CampaignService {
    pub fn new(store: Store, event_bus: EventBus) -> Self {
        Self {
            state: StateCell::new(),
            store,
            event_bus,
        }
    }

    /// Campaigns matching `filter`, newest first.
    pub async fn list(&self, filter: &CampaignFilter, page: PageRequest) -> Page<Campaign> {
        self.store.list_campaigns(filter, page).await
    }

    pub async fn get(&self, id: u64) -> ReliefResult<Campaign> {
        self.store.campaign(id).await
    }

    /// Validate and store a new campaign.
    pub async fn create(&self, new: NewCampaign) -> ReliefResult<Campaign> {
        let campaign = self.store.insert_campaign(new).await?;
        info!("campaign {} created: {}", campaign.id, campaign.title);
        self.event_bus.emit(AppEvent::CampaignCreated {
            campaign_id: campaign.id,
            title: campaign.title.clone(),
        });
        Ok(campaign)
    }
}

impl Service for CampaignService {
    fn name(&self) -> &str {
        "campaign"
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
