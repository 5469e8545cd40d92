//! Typed event bus for intra-service communication.
//!
//! Uses tokio broadcast channels to decouple services from one another.
//! Any service can emit events without knowing who is listening, and any
//! number of subscribers can independently consume events.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use relief_models::ProofStatus;

/// Application-level state changes other components may care about.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A campaign was added to the store.
    CampaignCreated {
        campaign_id: u64,
        title: String,
    },
    /// A donation was recorded.
    DonationReceived {
        campaign_id: u64,
        donation_id: u64,
        amount: f64,
        /// Whether this donation pushed the campaign over its goal.
        goal_reached: bool,
    },
    /// A proof file was stored.
    ProofUploaded {
        campaign_id: u64,
        proof_id: u64,
    },
    /// A proof was verified or rejected.
    ProofStatusChanged {
        proof_id: u64,
        status: ProofStatus,
    },
    /// A user logged in.
    UserLoggedIn {
        user_id: u64,
    },
    /// The platform escrow changed (deposit, approval, release).
    EscrowUpdated {
        app_id: u64,
        approved_weight: f64,
        released: bool,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Every subscriber gets every event. Slow subscribers that fall behind
/// receive a `Lagged` error and may miss events.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Human-readable label for an event (for logging).
pub fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::CampaignCreated { .. } => "CampaignCreated",
        AppEvent::DonationReceived { .. } => "DonationReceived",
        AppEvent::ProofUploaded { .. } => "ProofUploaded",
        AppEvent::ProofStatusChanged { .. } => "ProofStatusChanged",
        AppEvent::UserLoggedIn { .. } => "UserLoggedIn",
        AppEvent::EscrowUpdated { .. } => "EscrowUpdated",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::CampaignCreated {
            campaign_id: 7,
            title: "Flood".into(),
        });

        match rx.recv().await.unwrap() {
            AppEvent::CampaignCreated { campaign_id, .. } => assert_eq!(campaign_id, 7),
            _ => panic!("unexpected event type"),
        }
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(AppEvent::UserLoggedIn { user_id: 1 });

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                AppEvent::UserLoggedIn { user_id } => assert_eq!(user_id, 1),
                _ => panic!("unexpected event type"),
            }
        }
    }

    #[test]
    fn test_event_bus_no_subscribers() {
        let bus = EventBus::new(16);
        bus.emit(AppEvent::ProofUploaded {
            campaign_id: 1,
            proof_id: 1,
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_labels() {
        assert_eq!(
            event_label(&AppEvent::EscrowUpdated {
                app_id: 1000,
                approved_weight: 0.0,
                released: false,
            }),
            "EscrowUpdated"
        );
    }
}
