//! The platform's shared donation escrow on the simulated chain.
//!
//! The escrow is deployed lazily on first use together with a treasury
//! account (which pays release fees), a beneficiary, and one funded account
//! per configured oracle. Once an escrow has been released the next call
//! starts a fresh round with a newly deployed escrow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use relief_chain::{ChainClient, EscrowState, MicroAlgos, OracleApproval, OracleSpec};
use relief_core::config::ChainConfig;
use relief_core::constants::MIN_TX_FEE;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::Amount;

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState, StateCell};

const TREASURY_FUNDING_ALGOS: u64 = 10;
const ORACLE_FUNDING_ALGOS: u64 = 1;

/// Request body for `POST /api/donate`. Amounts are in ALGO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickDonation {
    pub amount: Amount,
    #[serde(default)]
    pub donor: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickDonationReceipt {
    pub success: bool,
    pub tx_id: String,
    pub amount: f64,
    pub network: String,
    pub app_id: u64,
}

/// Request body for `POST /api/escrow/approve`: an oracle name or address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowApproval {
    pub oracle: String,
}

/// Response body for `POST /api/escrow/release`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowRelease {
    pub network: String,
    pub app_id: u64,
    pub tx_id: String,
    pub beneficiary: String,
    pub amount: MicroAlgos,
    pub amount_algos: f64,
}

/// Response body for `GET /api/escrow-status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowStatus {
    pub network: String,
    pub app_id: u64,
    pub address: String,
    pub beneficiary: String,
    pub balance: MicroAlgos,
    pub balance_algos: f64,
    pub oracles: Vec<OracleApproval>,
    pub approved_weight: f64,
    pub threshold: f64,
    pub can_release: bool,
    pub released: bool,
}

impl EscrowStatus {
    fn from_state(network: &str, state: EscrowState) -> Self {
        Self {
            network: network.to_string(),
            can_release: state.can_release(),
            app_id: state.app_id,
            address: state.address,
            beneficiary: state.beneficiary,
            balance_algos: state.balance.as_algos(),
            balance: state.balance,
            oracles: state.oracles,
            approved_weight: state.approved_weight,
            threshold: state.threshold,
            released: state.released,
        }
    }
}

struct Round {
    app_id: u64,
    treasury: String,
    oracles: Vec<OracleSpec>,
}

pub struct EscrowService {
    state: StateCell,
    chain: Arc<dyn ChainClient>,
    config: ChainConfig,
    event_bus: EventBus,
    round: Mutex<Option<Round>>,
}

impl EscrowService {
    pub fn new(chain: Arc<dyn ChainClient>, config: ChainConfig, event_bus: EventBus) -> Self {
        Self {
            state: StateCell::new(),
            chain,
            config,
            event_bus,
            round: Mutex::new(None),
        }
    }

    async fn deploy_round(&self) -> ReliefResult<Round> {
        let chain = self.chain.as_ref();
        let treasury = chain.create_account().await?;
        chain
            .fund_account(&treasury.address, MicroAlgos::from_algos(TREASURY_FUNDING_ALGOS))
            .await?;
        let beneficiary = chain.create_account().await?;

        let mut oracles = Vec::with_capacity(self.config.oracles.len());
        for oracle in &self.config.oracles {
            let account = chain.create_account().await?;
            chain
                .fund_account(&account.address, MicroAlgos::from_algos(ORACLE_FUNDING_ALGOS))
                .await?;
            oracles.push(OracleSpec {
                address: account.address,
                name: oracle.name.clone(),
                weight: oracle.weight,
            });
        }

        let handle = chain
            .deploy_escrow(
                &treasury.address,
                &beneficiary.address,
                &oracles,
                self.config.approval_threshold,
            )
            .await?;
        info!("platform escrow round started: app {}", handle.app_id);
        Ok(Round {
            app_id: handle.app_id,
            treasury: treasury.address,
            oracles,
        })
    }

    /// Make sure `slot` holds an escrow that has not been released yet.
    async fn open_round<'a>(&self, slot: &'a mut Option<Round>) -> ReliefResult<&'a Round> {
        let stale = match slot.as_ref() {
            Some(round) => self.chain.escrow_state(round.app_id).await?.released,
            None => true,
        };
        if stale {
            *slot = Some(self.deploy_round().await?);
        }
        slot.as_ref()
            .ok_or_else(|| ReliefError::Internal("escrow round missing after deploy".into()))
    }

    fn announce(&self, state: &EscrowState) {
        self.event_bus.emit(AppEvent::EscrowUpdated {
            app_id: state.app_id,
            approved_weight: state.approved_weight,
            released: state.released,
        });
    }

    /// Deposit a donation into the current escrow from a fresh donor account.
    pub async fn quick_donate(&self, request: QuickDonation) -> ReliefResult<QuickDonationReceipt> {
        let algos = request.amount.value()?;
        let amount = MicroAlgos::from_algos_f64(algos)
            .ok_or_else(|| ReliefError::InvalidInput(format!("amount {algos} is too large for the ledger")))?;
        if amount == MicroAlgos::ZERO {
            return Err(ReliefError::InvalidInput(format!("amount {algos} is below one microalgo")));
        }

        let mut slot = self.round.lock().await;
        let round = self.open_round(&mut slot).await?;

        let donor = self.chain.create_account().await?;
        self.chain
            .fund_account(&donor.address, amount + MicroAlgos(MIN_TX_FEE))
            .await?;
        let tx = self.chain.escrow_deposit(round.app_id, &donor.address, amount).await?;
        let state = self.chain.escrow_state(round.app_id).await?;
        drop(slot);

        debug!(
            "quick donation of {amount} from {} (campaign {:?})",
            request.donor.as_deref().unwrap_or("anonymous"),
            request.campaign_id
        );
        self.announce(&state);
        Ok(QuickDonationReceipt {
            success: true,
            tx_id: tx.id,
            amount: algos,
            network: self.chain.network().to_string(),
            app_id: state.app_id,
        })
    }

    /// Current escrow balance and approval progress.
    pub async fn status(&self) -> ReliefResult<EscrowStatus> {
        let mut slot = self.round.lock().await;
        let round = self.open_round(&mut slot).await?;
        let state = self.chain.escrow_state(round.app_id).await?;
        Ok(EscrowStatus::from_state(self.chain.network(), state))
    }

    /// Approve as the oracle with this name (case-insensitive) or address.
    pub async fn approve(&self, oracle: &str) -> ReliefResult<EscrowStatus> {
        let mut slot = self.round.lock().await;
        let round = self.open_round(&mut slot).await?;
        let member = round
            .oracles
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(oracle.trim()) || o.address == oracle)
            .ok_or_else(|| ReliefError::InvalidInput(format!("unknown oracle: {oracle}")))?;

        self.chain.oracle_approve(round.app_id, &member.address).await?;
        let state = self.chain.escrow_state(round.app_id).await?;
        drop(slot);

        self.announce(&state);
        Ok(EscrowStatus::from_state(self.chain.network(), state))
    }

    /// Pay the escrow balance to its beneficiary.
    ///
    /// Fails with `InsufficientApprovals` until enough oracle weight has
    /// approved. After a release the next call opens a new round.
    pub async fn release(&self) -> ReliefResult<EscrowRelease> {
        let mut slot = self.round.lock().await;
        let round = self.open_round(&mut slot).await?;
        let tx = self.chain.escrow_release(round.app_id, &round.treasury).await?;
        let state = self.chain.escrow_state(round.app_id).await?;
        drop(slot);

        info!("escrow {} released {}", state.app_id, tx.amount);
        self.announce(&state);
        Ok(EscrowRelease {
            network: self.chain.network().to_string(),
            app_id: state.app_id,
            tx_id: tx.id,
            beneficiary: state.beneficiary,
            amount_algos: tx.amount.as_algos(),
            amount: tx.amount,
        })
    }
}

impl Service for EscrowService {
    fn name(&self) -> &str {
        "escrow"
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    fn init(&self) -> ReliefResult<()> {
        // Deployment happens on first use; init only reports readiness.
        self.state.set(ServiceState::Running);
        Ok(())
    }

    fn shutdown(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}
