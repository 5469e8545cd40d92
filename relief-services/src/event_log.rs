//! Background task that writes every application and ledger event to the log.

use std::collections::BTreeMap;

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use relief_chain::{ChainEvent, ChainEventDispatcher};

use crate::event_bus::{event_label, AppEvent, EventBus};

/// Number of events seen, keyed by event label.
pub type EventTally = BTreeMap<&'static str, u64>;

/// Handle to a running event logger.
pub struct EventLogger {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<EventTally>,
}

impl EventLogger {
    /// Subscribe to the bus, and to the ledger when one is given, then start
    /// logging. The subscriptions exist before this returns, so anything
    /// emitted afterwards is seen.
    pub fn spawn(bus: &EventBus, chain: Option<&ChainEventDispatcher>) -> Self {
        let app_rx = bus.subscribe();
        let chain_rx = chain.map(ChainEventDispatcher::subscribe);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(app_rx, chain_rx, shutdown_rx));
        Self { shutdown, task }
    }

    /// Drain queued events, stop the task, and return what it saw.
    pub async fn stop(self) -> EventTally {
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(tally) => tally,
            Err(e) => {
                warn!("event logger task failed: {e}");
                EventTally::new()
            }
        }
    }
}

async fn recv_chain(rx: &mut Option<broadcast::Receiver<ChainEvent>>) -> Result<ChainEvent, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn run(
    mut app_rx: broadcast::Receiver<AppEvent>,
    mut chain_rx: Option<broadcast::Receiver<ChainEvent>>,
    mut shutdown: watch::Receiver<bool>,
) -> EventTally {
    let mut tally = EventTally::new();

    loop {
        // Event branches come first so queued events drain before shutdown.
        tokio::select! {
            biased;
            event = app_rx.recv() => match event {
                Ok(event) => {
                    let label = event_label(&event);
                    info!("app event {label}: {event:?}");
                    *tally.entry(label).or_default() += 1;
                }
                Err(RecvError::Lagged(n)) => warn!("event log missed {n} application events"),
                Err(RecvError::Closed) => break,
            },
            event = recv_chain(&mut chain_rx) => match event {
                Ok(event) => {
                    let name = event.name();
                    info!("chain event {name}: {event:?}");
                    *tally.entry(name).or_default() += 1;
                }
                Err(RecvError::Lagged(n)) => warn!("event log missed {n} chain events"),
                Err(RecvError::Closed) => chain_rx = None,
            },
            _ = shutdown.changed() => break,
        }
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logs_app_events_until_stopped() {
        let bus = EventBus::new(16);
        let logger = EventLogger::spawn(&bus, None);
        assert_eq!(bus.subscriber_count(), 1);

        bus.emit(AppEvent::DonationReceived {
            campaign_id: 1,
            donation_id: 4,
            amount: 25.0,
            goal_reached: false,
        });
        bus.emit(AppEvent::UserLoggedIn { user_id: 1 });

        let tally = logger.stop().await;
        assert_eq!(tally.get("DonationReceived"), Some(&1));
        assert_eq!(tally.get("UserLoggedIn"), Some(&1));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_logs_chain_events() {
        let bus = EventBus::new(16);
        let dispatcher = ChainEventDispatcher::new(16);
        let logger = EventLogger::spawn(&bus, Some(&dispatcher));

        dispatcher.dispatch(ChainEvent::AccountCreated {
            address: "ADDR".into(),
        });

        let tally = logger.stop().await;
        assert_eq!(tally.get("account-created"), Some(&1));
    }
}
