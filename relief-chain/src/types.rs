//! Ledger value types shared by every `ChainClient` implementation.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relief_core::constants::MICROALGOS_PER_ALGO;

/// An amount of microalgos. 1 ALGO = 1,000,000 microalgos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MicroAlgos(pub u64);

impl MicroAlgos {
    pub const ZERO: MicroAlgos = MicroAlgos(0);

    /// Whole-algo amount.
    pub fn from_algos(algos: u64) -> Self {
        Self(algos.saturating_mul(MICROALGOS_PER_ALGO))
    }

    /// Convert a fractional algo amount, rounding to the nearest microalgo.
    ///
    /// Returns `None` for negative or non-finite values.
    pub fn from_algos_f64(algos: f64) -> Option<Self> {
        if !algos.is_finite() || algos < 0.0 {
            return None;
        }
        let micro = (algos * MICROALGOS_PER_ALGO as f64).round();
        if micro > u64::MAX as f64 {
            return None;
        }
        Some(Self(micro as u64))
    }

    pub fn as_algos(&self) -> f64 {
        self.0 as f64 / MICROALGOS_PER_ALGO as f64
    }

    pub fn checked_sub(self, other: MicroAlgos) -> Option<MicroAlgos> {
        self.0.checked_sub(other.0).map(MicroAlgos)
    }
}

impl Add for MicroAlgos {
    type Output = MicroAlgos;

    fn add(self, rhs: MicroAlgos) -> MicroAlgos {
        MicroAlgos(self.0.saturating_add(rhs.0))
    }
}

impl Sub for MicroAlgos {
    type Output = MicroAlgos;

    fn sub(self, rhs: MicroAlgos) -> MicroAlgos {
        MicroAlgos(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for MicroAlgos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} ALGO", self.as_algos())
    }
}

/// A freshly generated account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub address: String,
    /// 25-word recovery phrase.
    pub mnemonic: String,
}

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TxKind {
    /// Dispenser funding, no fee.
    Fund,
    Payment,
    AppCreate,
    AppCall,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fund => "fund",
            Self::Payment => "payment",
            Self::AppCreate => "app-create",
            Self::AppCall => "app-call",
        }
    }
}

/// A confirmed transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TxKind,
    pub sender: String,
    pub receiver: Option<String>,
    pub amount: MicroAlgos,
    pub fee: MicroAlgos,
    /// Round the transaction was confirmed in.
    pub round: u64,
    pub note: Option<String>,
    pub confirmed_at: DateTime<Utc>,
}

/// Oracle registered on an escrow at deploy time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleSpec {
    pub address: String,
    pub name: String,
    pub weight: f64,
}

/// Result of deploying an escrow application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowHandle {
    pub app_id: u64,
    pub address: String,
    pub tx_id: String,
}

/// Per-oracle approval status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleApproval {
    pub address: String,
    pub name: String,
    pub weight: f64,
    pub approved: bool,
}

/// Snapshot of an escrow application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscrowState {
    pub app_id: u64,
    pub address: String,
    pub creator: String,
    pub beneficiary: String,
    pub balance: MicroAlgos,
    pub oracles: Vec<OracleApproval>,
    /// Approved weight divided by total oracle weight.
    pub approved_weight: f64,
    pub threshold: f64,
    pub released: bool,
}

impl EscrowState {
    /// Whether a release call would currently pass the approval check.
    pub fn can_release(&self) -> bool {
        !self.released && self.approved_weight >= self.threshold
    }

    pub fn approvals(&self) -> usize {
        self.oracles.iter().filter(|o| o.approved).count()
    }
}
