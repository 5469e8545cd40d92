//! Donation entity model and the lenient amount type accepted from clients.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use relief_core::error::{ReliefError, ReliefResult};

lazy_static! {
    /// Leading decimal number, the way browsers read `"12.5 USD"` as 12.5.
    static ref LEADING_NUMBER: Regex =
        Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("valid regex");
}

/// A single donation recorded against a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: u64,
    pub campaign_id: u64,
    pub donor: String,
    pub amount: f64,
    pub message: Option<String>,
    /// Simulated chain transaction id.
    pub tx_id: String,
    pub created_at: DateTime<Utc>,
}

/// Donation amount as sent by clients: either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Resolve to a positive finite value.
    ///
    /// Strings are read up to the first character that cannot continue a
    /// decimal number, so `"25 dollars"` is 25.
    pub fn value(&self) -> ReliefResult<f64> {
        let v = match self {
            Amount::Number(n) => *n,
            Amount::Text(s) => LEADING_NUMBER
                .find(s)
                .and_then(|m| m.as_str().trim().parse::<f64>().ok())
                .ok_or_else(|| ReliefError::InvalidInput(format!("amount is not a number: {s:?}")))?,
        };
        if !v.is_finite() || v <= 0.0 {
            return Err(ReliefError::InvalidInput(format!(
                "amount must be a positive number, got {v}"
            )));
        }
        Ok(v)
    }
}

impl From<f64> for Amount {
    fn from(v: f64) -> Self {
        Amount::Number(v)
    }
}

/// Request body for `POST /api/campaigns/:id/donate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub amount: Amount,
    #[serde(default)]
    pub donor: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewDonation {
    /// Donor name to record, falling back to "Anonymous".
    pub fn donor_name(&self) -> String {
        self.donor
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("Anonymous")
            .to_string()
    }
}
