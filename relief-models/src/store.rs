//! In-memory store holding every collection the server exposes.
//!
//! The store is a cloneable handle over a single `RwLock`. Operations that
//! touch more than one collection (recording a donation also bumps the
//! campaign's `raised`) run under one write guard, so readers never observe
//! a donation without its effect on the campaign.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use relief_core::error::{ReliefError, ReliefResult};

use crate::models::campaign::{Campaign, CampaignFilter, CampaignStatus, NewCampaign};
use crate::models::donation::Donation;
use crate::models::page::{Page, PageRequest};
use crate::models::proof::{NewProof, Proof, ProofStatus};
use crate::models::stats::Stats;
use crate::models::user::User;

/// Raw collections plus id counters.
#[derive(Debug, Clone)]
pub struct StoreData {
    pub campaigns: Vec<Campaign>,
    pub donations: Vec<Donation>,
    pub proofs: Vec<Proof>,
    pub users: Vec<User>,
    next_campaign_id: u64,
    next_donation_id: u64,
    next_proof_id: u64,
}

/// A stored donation and the campaign as it stands afterwards.
#[derive(Debug, Clone)]
pub struct RecordedDonation {
    pub donation: Donation,
    pub campaign: Campaign,
    /// This donation is the one that carried the campaign to its goal.
    pub reached_goal: bool,
}

impl Default for StoreData {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }
}

impl StoreData {
    /// Assemble store data from pre-built collections.
    ///
    /// Id counters continue after the largest id already present.
    pub fn new(
        campaigns: Vec<Campaign>,
        donations: Vec<Donation>,
        proofs: Vec<Proof>,
        users: Vec<User>,
    ) -> Self {
        let next = |max: Option<u64>| max.map_or(1, |m| m + 1);
        Self {
            next_campaign_id: next(campaigns.iter().map(|c| c.id).max()),
            next_donation_id: next(donations.iter().map(|d| d.id).max()),
            next_proof_id: next(proofs.iter().map(|p| p.id).max()),
            campaigns,
            donations,
            proofs,
            users,
        }
    }

    fn campaign_mut(&mut self, id: u64) -> ReliefResult<&mut Campaign> {
        self.campaigns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ReliefError::not_found("campaign", id))
    }

    fn ensure_campaign(&self, id: u64) -> ReliefResult<()> {
        if self.campaigns.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(ReliefError::not_found("campaign", id))
        }
    }
}

/// Shared handle to the in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreData>>,
}

impl Store {
    /// Wrap pre-built data.
    pub fn new(data: StoreData) -> Self {
        info!(
            "store ready: {} campaigns, {} donations, {} proofs, {} users",
            data.campaigns.len(),
            data.donations.len(),
            data.proofs.len(),
            data.users.len()
        );
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    // ---- campaigns ----

    /// List campaigns matching `filter`, newest id first, paginated.
    pub async fn list_campaigns(&self, filter: &CampaignFilter, page: PageRequest) -> Page<Campaign> {
        let data = self.inner.read().await;
        let mut matching: Vec<Campaign> = data
            .campaigns
            .iter()
            .filter(|c| c.matches(filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));
        Page::from_slice(&matching, page)
    }

    /// Fetch one campaign.
    pub async fn campaign(&self, id: u64) -> ReliefResult<Campaign> {
        let data = self.inner.read().await;
        data.campaigns
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| ReliefError::not_found("campaign", id))
    }

    /// Validate and insert a new campaign, returning it with its assigned id.
    pub async fn insert_campaign(&self, new: NewCampaign) -> ReliefResult<Campaign> {
        new.validate()?;
        let mut data = self.inner.write().await;
        let id = data.next_campaign_id;
        data.next_campaign_id += 1;
        let campaign = new.into_campaign(id, Utc::now());
        data.campaigns.push(campaign.clone());
        debug!("inserted campaign {id}");
        Ok(campaign)
    }

    // ---- donations ----

    /// Donations recorded against a campaign, oldest first.
    pub async fn donations_for(&self, campaign_id: u64) -> ReliefResult<Vec<Donation>> {
        let data = self.inner.read().await;
        data.ensure_campaign(campaign_id)?;
        Ok(data
            .donations
            .iter()
            .filter(|d| d.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    /// Append a donation and add its amount to the campaign's `raised`.
    ///
    /// Paused campaigns refuse donations. An active campaign whose goal is
    /// reached becomes completed; completed campaigns keep accepting funds.
    pub async fn record_donation(
        &self,
        campaign_id: u64,
        donor: String,
        amount: f64,
        message: Option<String>,
        tx_id: String,
    ) -> ReliefResult<RecordedDonation> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(ReliefError::InvalidInput(format!(
                "amount must be a positive number, got {amount}"
            )));
        }

        let mut data = self.inner.write().await;
        let id = data.next_donation_id;

        let campaign = data.campaign_mut(campaign_id)?;
        if campaign.status == CampaignStatus::Paused {
            return Err(ReliefError::InvalidInput(format!(
                "campaign {campaign_id} is paused"
            )));
        }
        let had_reached = campaign.goal_reached();
        campaign.raised += amount;
        let reached_goal = !had_reached && campaign.goal_reached();
        if campaign.status == CampaignStatus::Active && campaign.goal_reached() {
            campaign.status = CampaignStatus::Completed;
            info!("campaign {campaign_id} reached its goal");
        }
        let campaign = campaign.clone();

        let donation = Donation {
            id,
            campaign_id,
            donor,
            amount,
            message,
            tx_id,
            created_at: Utc::now(),
        };
        data.next_donation_id += 1;
        data.donations.push(donation.clone());
        Ok(RecordedDonation {
            donation,
            campaign,
            reached_goal,
        })
    }

    // ---- proofs ----

    /// Proofs uploaded for a campaign, oldest first.
    pub async fn proofs_for(&self, campaign_id: u64) -> ReliefResult<Vec<Proof>> {
        let data = self.inner.read().await;
        data.ensure_campaign(campaign_id)?;
        Ok(data
            .proofs
            .iter()
            .filter(|p| p.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    /// Record proof metadata for an existing campaign.
    pub async fn insert_proof(&self, new: NewProof) -> ReliefResult<Proof> {
        let mut data = self.inner.write().await;
        data.ensure_campaign(new.campaign_id)?;
        let id = data.next_proof_id;
        data.next_proof_id += 1;
        let proof = new.into_proof(id, Utc::now());
        data.proofs.push(proof.clone());
        Ok(proof)
    }

    /// Change the review status of a proof.
    pub async fn set_proof_status(&self, proof_id: u64, status: ProofStatus) -> ReliefResult<Proof> {
        let mut data = self.inner.write().await;
        let proof = data
            .proofs
            .iter_mut()
            .find(|p| p.id == proof_id)
            .ok_or_else(|| ReliefError::not_found("proof", proof_id))?;
        proof.status = status;
        Ok(proof.clone())
    }

    // ---- users ----

    /// All users.
    pub async fn users(&self) -> Vec<User> {
        self.inner.read().await.users.clone()
    }

    /// Find a user by email, ignoring case and surrounding whitespace.
    pub async fn user_by_email(&self, email: &str) -> Option<User> {
        let wanted = email.trim().to_lowercase();
        let data = self.inner.read().await;
        data.users
            .iter()
            .find(|u| u.email.to_lowercase() == wanted)
            .cloned()
    }

    /// The first user, which the profile endpoint always reports.
    pub async fn first_user(&self) -> ReliefResult<User> {
        let data = self.inner.read().await;
        data.users
            .first()
            .cloned()
            .ok_or_else(|| ReliefError::not_found("user", 1))
    }

    // ---- aggregates ----

    /// Aggregate counts and sums over all collections.
    pub async fn stats(&self) -> Stats {
        let data = self.inner.read().await;

        let total_raised: f64 = data.campaigns.iter().map(|c| c.raised).sum();
        let donation_sum: f64 = data.donations.iter().map(|d| d.amount).sum();
        let donors: HashSet<String> = data
            .donations
            .iter()
            .map(|d| d.donor.to_lowercase())
            .collect();

        Stats {
            total_campaigns: data.campaigns.len(),
            active_campaigns: data
                .campaigns
                .iter()
                .filter(|c| c.status == CampaignStatus::Active)
                .count(),
            completed_campaigns: data
                .campaigns
                .iter()
                .filter(|c| c.status == CampaignStatus::Completed)
                .count(),
            total_raised,
            total_goal: data.campaigns.iter().map(|c| c.goal).sum(),
            total_donations: data.donations.len(),
            unique_donors: donors.len(),
            average_donation: if data.donations.is_empty() {
                0.0
            } else {
                donation_sum / data.donations.len() as f64
            },
            total_proofs: data.proofs.len(),
            verified_proofs: data
                .proofs
                .iter()
                .filter(|p| p.status == ProofStatus::Verified)
                .count(),
            total_users: data.users.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::campaign::DisasterType;

    async fn store_with_campaign(goal: f64) -> (Store, Campaign) {
        let store = Store::new(StoreData::default());
        let c = store
            .insert_campaign(NewCampaign {
                title: "Test".into(),
                goal: Some(goal),
                disaster_type: Some(DisasterType::Flood),
                ..Default::default()
            })
            .await
            .unwrap();
        (store, c)
    }

    #[tokio::test]
    async fn test_ids_start_at_one() {
        let (store, c) = store_with_campaign(100.0).await;
        assert_eq!(c.id, 1);
        let recorded = store
            .record_donation(1, "a".into(), 5.0, None, "TX".into())
            .await
            .unwrap();
        assert_eq!(recorded.donation.id, 1);
    }

    #[tokio::test]
    async fn test_donation_increments_raised() {
        let (store, c) = store_with_campaign(100.0).await;
        let recorded = store
            .record_donation(c.id, "Ana".into(), 30.0, None, "TX1".into())
            .await
            .unwrap();
        assert_eq!(recorded.campaign.raised, 30.0);
        assert!(!recorded.reached_goal);
        assert_eq!(store.campaign(c.id).await.unwrap().raised, 30.0);
        assert_eq!(store.donations_for(c.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_goal_completes_campaign() {
        let (store, c) = store_with_campaign(50.0).await;
        let first = store
            .record_donation(c.id, "Ana".into(), 50.0, None, "TX1".into())
            .await
            .unwrap();
        assert_eq!(first.campaign.status, CampaignStatus::Completed);
        assert!(first.reached_goal);

        // Still accepts donations once completed, without reaching the goal again.
        let again = store
            .record_donation(c.id, "Ben".into(), 5.0, None, "TX2".into())
            .await
            .unwrap();
        assert_eq!(again.campaign.raised, 55.0);
        assert!(!again.reached_goal);
    }

    #[tokio::test]
    async fn test_concurrent_donations_reach_goal_once() {
        let (store, c) = store_with_campaign(100.0).await;
        let id = c.id;
        let mut tasks = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .record_donation(id, format!("d{i}"), 60.0, None, format!("TX{i}"))
                    .await
                    .unwrap()
                    .reached_goal
            }));
        }
        let mut reached = 0;
        for task in tasks {
            if task.await.unwrap() {
                reached += 1;
            }
        }
        assert_eq!(reached, 1);
    }

    #[tokio::test]
    async fn test_paused_campaign_rejects_donation() {
        let store = Store::new(StoreData::default());
        let c = store
            .insert_campaign(NewCampaign {
                title: "Paused".into(),
                status: Some(CampaignStatus::Paused),
                ..Default::default()
            })
            .await
            .unwrap();
        let err = store
            .record_donation(c.id, "x".into(), 1.0, None, "TX".into())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(store.campaign(c.id).await.unwrap().raised, 0.0);
    }

    #[tokio::test]
    async fn test_unknown_campaign_is_not_found() {
        let store = Store::new(StoreData::default());
        assert_eq!(store.campaign(99).await.unwrap_err().status_code(), 404);
        assert_eq!(store.donations_for(99).await.unwrap_err().status_code(), 404);
        assert!(store
            .record_donation(99, "x".into(), 1.0, None, "TX".into())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_stats() {
        let (store, c) = store_with_campaign(100.0).await;
        store.record_donation(c.id, "Ana".into(), 10.0, None, "T1".into()).await.unwrap();
        store.record_donation(c.id, "ana".into(), 30.0, None, "T2".into()).await.unwrap();
        store.record_donation(c.id, "Ben".into(), 20.0, None, "T3".into()).await.unwrap();

        let stats = store.stats().await;
        assert_eq!(stats.total_campaigns, 1);
        assert_eq!(stats.total_donations, 3);
        assert_eq!(stats.unique_donors, 2);
        assert!((stats.total_raised - 60.0).abs() < 1e-9);
        assert!((stats.average_donation - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_list_newest_first_and_paginated() {
        let store = Store::new(StoreData::default());
        for i in 0..15 {
            store
                .insert_campaign(NewCampaign {
                    title: format!("C{i}"),
                    ..Default::default()
                })
                .await
                .unwrap();
        }
        let page = store
            .list_campaigns(&CampaignFilter::default(), PageRequest::new(1, 10))
            .await;
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].id, 15);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn test_proof_status_update() {
        let (store, c) = store_with_campaign(10.0).await;
        let proof = store
            .insert_proof(NewProof {
                campaign_id: c.id,
                file_name: "f".into(),
                original_name: "f".into(),
                mime_type: "image/png".into(),
                size: 1,
                description: None,
            })
            .await
            .unwrap();
        let updated = store.set_proof_status(proof.id, ProofStatus::Verified).await.unwrap();
        assert_eq!(updated.status, ProofStatus::Verified);
        assert!(store.set_proof_status(404, ProofStatus::Rejected).await.is_err());
    }
}
