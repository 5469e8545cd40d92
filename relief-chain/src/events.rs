//! Ledger events and the broadcast dispatcher that fans them out.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use crate::types::{MicroAlgos, TxKind};

/// Something observable happened on the simulated ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChainEvent {
    AccountCreated {
        address: String,
    },
    TransactionConfirmed {
        tx_id: String,
        kind: TxKind,
        amount: MicroAlgos,
        round: u64,
    },
    EscrowDeployed {
        app_id: u64,
        address: String,
    },
    EscrowApproved {
        app_id: u64,
        oracle: String,
        approved_weight: f64,
    },
    EscrowReleased {
        app_id: u64,
        beneficiary: String,
        amount: MicroAlgos,
    },
}

impl ChainEvent {
    /// Stable event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AccountCreated { .. } => "account-created",
            Self::TransactionConfirmed { .. } => "transaction-confirmed",
            Self::EscrowDeployed { .. } => "escrow-deployed",
            Self::EscrowApproved { .. } => "escrow-approved",
            Self::EscrowReleased { .. } => "escrow-released",
        }
    }

    /// Whether this event concerns an escrow application.
    pub fn is_escrow_event(&self) -> bool {
        matches!(
            self,
            Self::EscrowDeployed { .. } | Self::EscrowApproved { .. } | Self::EscrowReleased { .. }
        )
    }
}

/// Broadcast-based dispatcher for ledger events.
///
/// Slow subscribers that fall behind receive `RecvError::Lagged` and miss
/// events; the ledger never blocks on them.
#[derive(Clone)]
pub struct ChainEventDispatcher {
    sender: broadcast::Sender<ChainEvent>,
}

impl ChainEventDispatcher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all active subscribers.
    pub fn dispatch(&self, event: ChainEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(count) => debug!("dispatched {name} to {count} subscriber(s)"),
            Err(_) => debug!("no subscribers for chain event {name}"),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
