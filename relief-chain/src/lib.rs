//! Relief Chain - Simulated Algorand ledger for donation escrow demos.
//!
//! Nothing here talks to a real network. The crate provides:
//! - The `ChainClient` trait the rest of the workspace codes against
//! - `SimulatedChain`, an in-process ledger with accounts, payments, and
//!   oracle-approved escrow applications
//! - Ledger event broadcasting via tokio broadcast channels
//! - The scripted escrow walkthrough used by `relief chain demo`

pub mod types;
pub mod events;
pub mod client;
pub mod mnemonic;
pub mod simulated;
pub mod demo;

// Re-export key types
pub use client::ChainClient;
pub use demo::{DemoReport, DemoStep};
pub use events::{ChainEvent, ChainEventDispatcher};
pub use simulated::SimulatedChain;
pub use types::{
    Account, EscrowHandle, EscrowState, MicroAlgos, OracleApproval, OracleSpec, TxKind, Transaction,
};
