//! Campaign (fundraising effort) entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use relief_core::error::{ReliefError, ReliefResult};

use super::page::Page;

/// Kind of disaster a campaign responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterType {
    Flood,
    Earthquake,
    Wildfire,
    Hurricane,
    Drought,
    Tsunami,
    Other,
}

impl DisasterType {
    /// Every variant, in display order.
    pub const ALL: [DisasterType; 7] = [
        Self::Flood,
        Self::Earthquake,
        Self::Wildfire,
        Self::Hurricane,
        Self::Drought,
        Self::Tsunami,
        Self::Other,
    ];

    /// Wire name of this disaster type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Earthquake => "earthquake",
            Self::Wildfire => "wildfire",
            Self::Hurricane => "hurricane",
            Self::Drought => "drought",
            Self::Tsunami => "tsunami",
            Self::Other => "other",
        }
    }

    /// Parse a wire name, case-insensitively.
    pub fn parse(s: &str) -> ReliefResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| ReliefError::InvalidInput(format!("unknown disaster type: {s}")))
    }
}

impl std::fmt::Display for DisasterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Active,
    Completed,
    Paused,
}

impl CampaignStatus {
    /// Wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Paused => "paused",
        }
    }

    /// Parse a wire name, case-insensitively.
    pub fn parse(s: &str) -> ReliefResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "paused" => Ok(Self::Paused),
            other => Err(ReliefError::InvalidInput(format!("unknown campaign status: {other}"))),
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A disaster-relief fundraising campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: u64,
    pub title: String,
    pub description: String,
    /// Fundraising target.
    pub goal: f64,
    /// Sum of all donations recorded against this campaign.
    pub raised: f64,
    pub location: String,
    pub disaster_type: DisasterType,
    pub status: CampaignStatus,
    pub creator: String,
    /// Chain address that receives released escrow funds.
    pub beneficiary_address: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Campaign {
    /// Fraction of the goal raised so far. Zero when the goal is zero.
    pub fn progress(&self) -> f64 {
        if self.goal > 0.0 {
            self.raised / self.goal
        } else {
            0.0
        }
    }

    /// Whether the raised amount has reached the goal.
    pub fn goal_reached(&self) -> bool {
        self.goal > 0.0 && self.raised >= self.goal
    }

    /// Whether this campaign matches every criterion in `filter`.
    pub fn matches(&self, filter: &CampaignFilter) -> bool {
        if filter.status.is_some_and(|s| s != self.status) {
            return false;
        }
        if filter.disaster_type.is_some_and(|t| t != self.disaster_type) {
            return false;
        }
        match filter.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                self.title.to_lowercase().contains(&q)
                    || self.location.to_lowercase().contains(&q)
                    || self.description.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

/// Request body for creating a campaign. Only `title` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCampaign {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub goal: Option<f64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub disaster_type: Option<DisasterType>,
    #[serde(default)]
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub beneficiary_address: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
}

impl NewCampaign {
    /// Check the fields that would make a campaign meaningless.
    pub fn validate(&self) -> ReliefResult<()> {
        if self.title.trim().is_empty() {
            return Err(ReliefError::InvalidInput("title is required".into()));
        }
        if let Some(goal) = self.goal {
            if !goal.is_finite() || goal < 0.0 {
                return Err(ReliefError::InvalidInput(format!(
                    "goal must be a non-negative number, got {goal}"
                )));
            }
        }
        Ok(())
    }

    /// Build the stored campaign with the given id.
    pub fn into_campaign(self, id: u64, now: DateTime<Utc>) -> Campaign {
        Campaign {
            id,
            title: self.title.trim().to_string(),
            description: self.description.unwrap_or_default(),
            goal: self.goal.unwrap_or(0.0),
            raised: 0.0,
            location: self.location.unwrap_or_default(),
            disaster_type: self.disaster_type.unwrap_or(DisasterType::Other),
            status: self.status.unwrap_or(CampaignStatus::Active),
            creator: self.creator.unwrap_or_else(|| "anonymous".to_string()),
            beneficiary_address: self.beneficiary_address,
            image_url: self.image_url,
            created_at: now,
            end_date: self.end_date,
        }
    }
}

/// Criteria for listing campaigns.
#[derive(Debug, Clone, Default)]
pub struct CampaignFilter {
    pub status: Option<CampaignStatus>,
    pub disaster_type: Option<DisasterType>,
    /// Case-insensitive substring over title, location, and description.
    pub query: Option<String>,
}

/// Wire shape of `GET /api/campaigns`: one page of campaigns plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignList {
    pub campaigns: Vec<Campaign>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

impl From<Page<Campaign>> for CampaignList {
    fn from(page: Page<Campaign>) -> Self {
        Self {
            campaigns: page.items,
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        }
    }
}
