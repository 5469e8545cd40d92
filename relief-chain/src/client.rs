//! The ledger operations the platform relies on.

use async_trait::async_trait;

use relief_core::error::ReliefResult;

use crate::types::{Account, EscrowHandle, EscrowState, MicroAlgos, OracleSpec, Transaction};

/// Ledger operations used by the donation and escrow flows.
///
/// Payments charge the minimum fee to the sender on top of the amount.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Generate a new empty account.
    async fn create_account(&self) -> ReliefResult<Account>;

    /// Credit an account from the network dispenser. No fee.
    async fn fund_account(&self, address: &str, amount: MicroAlgos) -> ReliefResult<Transaction>;

    async fn balance(&self, address: &str) -> ReliefResult<MicroAlgos>;

    /// Move `amount` from `from` to `to`.
    async fn pay(
        &self,
        from: &str,
        to: &str,
        amount: MicroAlgos,
        note: Option<String>,
    ) -> ReliefResult<Transaction>;

    /// Create an escrow application releasing to `beneficiary` once oracles
    /// holding at least `threshold` of the total weight have approved.
    async fn deploy_escrow(
        &self,
        creator: &str,
        beneficiary: &str,
        oracles: &[OracleSpec],
        threshold: f64,
    ) -> ReliefResult<EscrowHandle>;

    async fn escrow_deposit(&self, app_id: u64, from: &str, amount: MicroAlgos) -> ReliefResult<Transaction>;

    /// Record one oracle's approval. Each oracle may approve once.
    async fn oracle_approve(&self, app_id: u64, oracle: &str) -> ReliefResult<Transaction>;

    /// Pay the whole escrow balance to the beneficiary.
    async fn escrow_release(&self, app_id: u64, caller: &str) -> ReliefResult<Transaction>;

    async fn escrow_state(&self, app_id: u64) -> ReliefResult<EscrowState>;

    async fn transaction(&self, tx_id: &str) -> ReliefResult<Transaction>;

    /// Network label ("testnet", ...).
    fn network(&self) -> &str;
}
