//! Proof entity: an uploaded file offered as evidence of aid delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relief_core::error::{ReliefError, ReliefResult};

/// Review state of a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofStatus {
    Pending,
    Verified,
    Rejected,
}

impl ProofStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }

    /// Parse a wire name, case-insensitively.
    pub fn parse(s: &str) -> ReliefResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "verified" => Ok(Self::Verified),
            "rejected" => Ok(Self::Rejected),
            other => Err(ReliefError::InvalidInput(format!("unknown proof status: {other}"))),
        }
    }
}

impl std::fmt::Display for ProofStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a stored proof file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    pub id: u64,
    pub campaign_id: u64,
    /// Name of the file on disk inside the upload directory.
    pub file_name: String,
    /// Name the client uploaded the file under.
    pub original_name: String,
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    pub description: Option<String>,
    pub status: ProofStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// Request body for `PATCH /api/proofs/:id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStatusUpdate {
    pub status: ProofStatus,
}

/// Everything about a proof except its id, used when inserting.
#[derive(Debug, Clone)]
pub struct NewProof {
    pub campaign_id: u64,
    pub file_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
    pub description: Option<String>,
}

impl NewProof {
    /// Build the stored proof with the given id, starting as pending.
    pub fn into_proof(self, id: u64, now: DateTime<Utc>) -> Proof {
        Proof {
            id,
            campaign_id: self.campaign_id,
            file_name: self.file_name,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size: self.size,
            description: self.description,
            status: ProofStatus::Pending,
            uploaded_at: now,
        }
    }
}
