//! In-process ledger implementing [`ChainClient`].
//!
//! State lives behind a single tokio mutex. Every call first sleeps for the
//! configured latency (outside the lock) so demos feel like a network round
//! trip; tests construct the chain with zero latency.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info};

use relief_core::config::ChainConfig;
use relief_core::constants::MIN_TX_FEE;
use relief_core::error::{ReliefError, ReliefResult};
use relief_core::ids;

use crate::client::ChainClient;
use crate::events::{ChainEvent, ChainEventDispatcher};
use crate::mnemonic;
use crate::types::{
    Account, EscrowHandle, EscrowState, MicroAlgos, OracleApproval, OracleSpec, Transaction, TxKind,
};

const FEE: MicroAlgos = MicroAlgos(MIN_TX_FEE);

/// First application id handed out.
pub const FIRST_APP_ID: u64 = 1000;

struct Escrow {
    address: String,
    creator: String,
    beneficiary: String,
    oracles: Vec<OracleSpec>,
    approved: HashSet<String>,
    threshold: f64,
    released: bool,
}

impl Escrow {
    fn approved_weight(&self) -> f64 {
        let total: f64 = self.oracles.iter().map(|o| o.weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let approved: f64 = self
            .oracles
            .iter()
            .filter(|o| self.approved.contains(&o.address))
            .map(|o| o.weight)
            .sum();
        approved / total
    }

    fn ensure_open(&self, app_id: u64) -> ReliefResult<()> {
        if self.released {
            return Err(ReliefError::Chain(format!("escrow {app_id} already released")));
        }
        Ok(())
    }
}

struct Ledger {
    dispenser: String,
    accounts: HashMap<String, MicroAlgos>,
    transactions: HashMap<String, Transaction>,
    escrows: BTreeMap<u64, Escrow>,
    next_app_id: u64,
    round: u64,
    rng: StdRng,
    /// Events produced while the lock is held, sent after it is released.
    pending: Vec<ChainEvent>,
}

impl Ledger {
    fn new(rng: StdRng) -> Self {
        let mut ledger = Self {
            dispenser: String::new(),
            accounts: HashMap::new(),
            transactions: HashMap::new(),
            escrows: BTreeMap::new(),
            next_app_id: FIRST_APP_ID,
            round: 0,
            rng,
            pending: Vec::new(),
        };
        ledger.dispenser = ledger.fresh_address();
        ledger
    }

    fn fresh_address(&mut self) -> String {
        loop {
            let address = ids::random_address(&mut self.rng);
            if !self.accounts.contains_key(&address) {
                return address;
            }
        }
    }

    fn balance_of(&self, address: &str) -> ReliefResult<MicroAlgos> {
        self.accounts
            .get(address)
            .copied()
            .ok_or_else(|| ReliefError::not_found("account", address))
    }

    fn debit(&mut self, address: &str, amount: MicroAlgos) -> ReliefResult<()> {
        let available = self.balance_of(address)?;
        let remaining = available
            .checked_sub(amount)
            .ok_or(ReliefError::InsufficientFunds {
                need: amount.0,
                available: available.0,
            })?;
        self.accounts.insert(address.to_string(), remaining);
        Ok(())
    }

    fn credit(&mut self, address: &str, amount: MicroAlgos) {
        let entry = self.accounts.entry(address.to_string()).or_default();
        *entry = *entry + amount;
    }

    fn escrow(&self, app_id: u64) -> ReliefResult<&Escrow> {
        self.escrows
            .get(&app_id)
            .ok_or_else(|| ReliefError::not_found("escrow", app_id))
    }

    fn escrow_mut(&mut self, app_id: u64) -> ReliefResult<&mut Escrow> {
        self.escrows
            .get_mut(&app_id)
            .ok_or_else(|| ReliefError::not_found("escrow", app_id))
    }

    fn record(
        &mut self,
        kind: TxKind,
        sender: &str,
        receiver: Option<&str>,
        amount: MicroAlgos,
        fee: MicroAlgos,
        note: Option<String>,
    ) -> Transaction {
        let id = loop {
            let id = ids::random_tx_id(&mut self.rng);
            if !self.transactions.contains_key(&id) {
                break id;
            }
        };
        self.round += 1;
        let tx = Transaction {
            id: id.clone(),
            kind,
            sender: sender.to_string(),
            receiver: receiver.map(str::to_string),
            amount,
            fee,
            round: self.round,
            note,
            confirmed_at: Utc::now(),
        };
        self.transactions.insert(id, tx.clone());
        self.pending.push(ChainEvent::TransactionConfirmed {
            tx_id: tx.id.clone(),
            kind,
            amount,
            round: tx.round,
        });
        tx
    }

    fn state_of(&self, app_id: u64) -> ReliefResult<EscrowState> {
        let escrow = self.escrow(app_id)?;
        Ok(EscrowState {
            app_id,
            address: escrow.address.clone(),
            creator: escrow.creator.clone(),
            beneficiary: escrow.beneficiary.clone(),
            balance: self.accounts.get(&escrow.address).copied().unwrap_or_default(),
            oracles: escrow
                .oracles
                .iter()
                .map(|o| OracleApproval {
                    address: o.address.clone(),
                    name: o.name.clone(),
                    weight: o.weight,
                    approved: escrow.approved.contains(&o.address),
                })
                .collect(),
            approved_weight: escrow.approved_weight(),
            threshold: escrow.threshold,
            released: escrow.released,
        })
    }
}

fn check_address(address: &str) -> ReliefResult<()> {
    if ids::is_valid_address(address) {
        Ok(())
    } else {
        Err(ReliefError::InvalidInput(format!("malformed address: {address:?}")))
    }
}

fn check_escrow_terms(oracles: &[OracleSpec], threshold: f64) -> ReliefResult<()> {
    if !threshold.is_finite() || threshold <= 0.0 || threshold > 1.0 {
        return Err(ReliefError::InvalidInput(format!(
            "approval threshold must be in (0, 1], got {threshold}"
        )));
    }
    if oracles.is_empty() {
        return Err(ReliefError::InvalidInput("escrow needs at least one oracle".into()));
    }
    let mut seen = HashSet::new();
    for oracle in oracles {
        check_address(&oracle.address)?;
        if !oracle.weight.is_finite() || oracle.weight <= 0.0 {
            return Err(ReliefError::InvalidInput(format!(
                "oracle {} has invalid weight {}",
                oracle.name, oracle.weight
            )));
        }
        if !seen.insert(oracle.address.as_str()) {
            return Err(ReliefError::InvalidInput(format!(
                "oracle {} listed twice",
                oracle.address
            )));
        }
    }
    Ok(())
}

/// Simulated ledger.
///
/// Accounts and transactions are kept for the life of the process, like a
/// real chain's history, so memory grows with every payment. That is fine
/// for a demo ledger that restarts with the server.
pub struct SimulatedChain {
    network: String,
    latency: Duration,
    ledger: Mutex<Ledger>,
    dispatcher: Option<ChainEventDispatcher>,
}

impl SimulatedChain {
    pub fn new(network: impl Into<String>, latency: Duration) -> Self {
        Self {
            network: network.into(),
            latency,
            ledger: Mutex::new(Ledger::new(StdRng::from_entropy())),
            dispatcher: None,
        }
    }

    pub fn from_config(config: &ChainConfig) -> Self {
        Self::new(config.network.clone(), Duration::from_millis(config.latency_ms))
    }

    /// Make generated addresses and transaction ids reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        let ledger = self.ledger.get_mut();
        *ledger = Ledger::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Publish ledger events on `dispatcher`.
    pub fn with_dispatcher(mut self, dispatcher: ChainEventDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Address that signs dispenser funding transactions.
    pub async fn dispenser(&self) -> String {
        self.ledger.lock().await.dispenser.clone()
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
    }

    fn publish(&self, events: Vec<ChainEvent>) {
        if let Some(dispatcher) = &self.dispatcher {
            for event in events {
                dispatcher.dispatch(event);
            }
        }
    }

    /// Run `op` against the ledger, then publish whatever events it queued.
    async fn with_ledger<T>(&self, op: impl FnOnce(&mut Ledger) -> ReliefResult<T>) -> ReliefResult<T> {
        self.pause().await;
        let (result, events) = {
            let mut ledger = self.ledger.lock().await;
            let result = op(&mut *ledger);
            (result, std::mem::take(&mut ledger.pending))
        };
        // Failed operations leave no trace on the ledger, so their events go too.
        if result.is_ok() {
            self.publish(events);
        }
        result
    }
}

#[async_trait]
impl ChainClient for SimulatedChain {
    async fn create_account(&self) -> ReliefResult<Account> {
        let account = self
            .with_ledger(|ledger| {
                let address = ledger.fresh_address();
                ledger.accounts.insert(address.clone(), MicroAlgos::ZERO);
                ledger.pending.push(ChainEvent::AccountCreated {
                    address: address.clone(),
                });
                Ok(Account {
                    address,
                    mnemonic: mnemonic::generate(&mut ledger.rng),
                })
            })
            .await?;
        debug!("created account {}", account.address);
        Ok(account)
    }

    async fn fund_account(&self, address: &str, amount: MicroAlgos) -> ReliefResult<Transaction> {
        check_address(address)?;
        self.with_ledger(|ledger| {
            ledger.credit(address, amount);
            let dispenser = ledger.dispenser.clone();
            Ok(ledger.record(
                TxKind::Fund,
                &dispenser,
                Some(address),
                amount,
                MicroAlgos::ZERO,
                Some("dispenser".into()),
            ))
        })
        .await
    }

    async fn balance(&self, address: &str) -> ReliefResult<MicroAlgos> {
        self.with_ledger(|ledger| ledger.balance_of(address)).await
    }

    async fn pay(
        &self,
        from: &str,
        to: &str,
        amount: MicroAlgos,
        note: Option<String>,
    ) -> ReliefResult<Transaction> {
        check_address(to)?;
        let tx = self
            .with_ledger(|ledger| {
                ledger.debit(from, amount + FEE)?;
                ledger.credit(to, amount);
                Ok(ledger.record(TxKind::Payment, from, Some(to), amount, FEE, note))
            })
            .await?;
        debug!("payment {} of {} confirmed in round {}", tx.id, tx.amount, tx.round);
        Ok(tx)
    }

    async fn deploy_escrow(
        &self,
        creator: &str,
        beneficiary: &str,
        oracles: &[OracleSpec],
        threshold: f64,
    ) -> ReliefResult<EscrowHandle> {
        check_address(beneficiary)?;
        check_escrow_terms(oracles, threshold)?;

        let handle = self
            .with_ledger(|ledger| {
                ledger.debit(creator, FEE)?;
                let app_id = ledger.next_app_id;
                ledger.next_app_id += 1;
                let address = ledger.fresh_address();
                ledger.accounts.insert(address.clone(), MicroAlgos::ZERO);
                ledger.escrows.insert(
                    app_id,
                    Escrow {
                        address: address.clone(),
                        creator: creator.to_string(),
                        beneficiary: beneficiary.to_string(),
                        oracles: oracles.to_vec(),
                        approved: HashSet::new(),
                        threshold,
                        released: false,
                    },
                );
                let tx = ledger.record(
                    TxKind::AppCreate,
                    creator,
                    None,
                    MicroAlgos::ZERO,
                    FEE,
                    Some(format!("escrow app {app_id}")),
                );
                ledger.pending.push(ChainEvent::EscrowDeployed {
                    app_id,
                    address: address.clone(),
                });
                Ok(EscrowHandle {
                    app_id,
                    address,
                    tx_id: tx.id,
                })
            })
            .await?;
        info!(
            "deployed escrow app {} with {} oracle(s), threshold {:.2}",
            handle.app_id,
            oracles.len(),
            threshold
        );
        Ok(handle)
    }

    async fn escrow_deposit(&self, app_id: u64, from: &str, amount: MicroAlgos) -> ReliefResult<Transaction> {
        if amount == MicroAlgos::ZERO {
            return Err(ReliefError::InvalidInput("deposit must be greater than zero".into()));
        }
        self.with_ledger(|ledger| {
            let escrow = ledger.escrow(app_id)?;
            escrow.ensure_open(app_id)?;
            let address = escrow.address.clone();
            ledger.debit(from, amount + FEE)?;
            ledger.credit(&address, amount);
            Ok(ledger.record(
                TxKind::Payment,
                from,
                Some(&address),
                amount,
                FEE,
                Some(format!("deposit to escrow {app_id}")),
            ))
        })
        .await
    }

    async fn oracle_approve(&self, app_id: u64, oracle: &str) -> ReliefResult<Transaction> {
        let tx = self
            .with_ledger(|ledger| {
                let escrow = ledger.escrow(app_id)?;
                escrow.ensure_open(app_id)?;
                if !escrow.oracles.iter().any(|o| o.address == oracle) {
                    return Err(ReliefError::InvalidInput(format!(
                        "{oracle} is not an oracle of escrow {app_id}"
                    )));
                }
                if escrow.approved.contains(oracle) {
                    return Err(ReliefError::InvalidInput(format!(
                        "{oracle} already approved escrow {app_id}"
                    )));
                }
                ledger.debit(oracle, FEE)?;
                let escrow = ledger.escrow_mut(app_id)?;
                escrow.approved.insert(oracle.to_string());
                let approved_weight = escrow.approved_weight();
                ledger.pending.push(ChainEvent::EscrowApproved {
                    app_id,
                    oracle: oracle.to_string(),
                    approved_weight,
                });
                Ok(ledger.record(
                    TxKind::AppCall,
                    oracle,
                    None,
                    MicroAlgos::ZERO,
                    FEE,
                    Some("approve".into()),
                ))
            })
            .await?;
        debug!("oracle {oracle} approved escrow {app_id}");
        Ok(tx)
    }

    async fn escrow_release(&self, app_id: u64, caller: &str) -> ReliefResult<Transaction> {
        let tx = self
            .with_ledger(|ledger| {
                let escrow = ledger.escrow(app_id)?;
                escrow.ensure_open(app_id)?;
                let have = escrow.approved_weight();
                if have < escrow.threshold {
                    return Err(ReliefError::InsufficientApprovals {
                        have,
                        need: escrow.threshold,
                    });
                }
                let address = escrow.address.clone();
                let beneficiary = escrow.beneficiary.clone();

                ledger.debit(caller, FEE)?;
                let amount = ledger.balance_of(&address)?;
                ledger.accounts.insert(address, MicroAlgos::ZERO);
                ledger.credit(&beneficiary, amount);
                ledger.escrow_mut(app_id)?.released = true;
                ledger.pending.push(ChainEvent::EscrowReleased {
                    app_id,
                    beneficiary: beneficiary.clone(),
                    amount,
                });
                Ok(ledger.record(
                    TxKind::AppCall,
                    caller,
                    Some(&beneficiary),
                    amount,
                    FEE,
                    Some("release".into()),
                ))
            })
            .await?;
        info!("escrow {app_id} released {} to beneficiary", tx.amount);
        Ok(tx)
    }

    async fn escrow_state(&self, app_id: u64) -> ReliefResult<EscrowState> {
        self.with_ledger(|ledger| ledger.state_of(app_id)).await
    }

    async fn transaction(&self, tx_id: &str) -> ReliefResult<Transaction> {
        self.with_ledger(|ledger| {
            ledger
                .transactions
                .get(tx_id)
                .cloned()
                .ok_or_else(|| ReliefError::not_found("transaction", tx_id))
        })
        .await
    }

    fn network(&self) -> &str {
        &self.network
    }
}
