//! Integration tests for the service layer.
//!
//! Covers campaign listing and creation, donations and goal tracking,
//! proof uploads to disk, mock login, stats, and registry lifecycle.

mod common;

use relief_core::error::ReliefError;
use relief_models::{Amount, CampaignFilter, CampaignStatus, NewCampaign, NewDonation, PageRequest, ProofStatus};
use relief_services::auth::AuthService;
use relief_services::event_bus::AppEvent;
use relief_services::registry::ServiceRegistry;
use relief_services::proof::Upload;
use relief_services::service::ServiceState;
use tempfile::TempDir;

fn donation(amount: Amount) -> NewDonation {
    NewDonation {
        amount,
        donor: Some("Test Donor".into()),
        message: None,
    }
}

fn pdf(bytes: usize) -> Upload {
    Upload {
        original_name: "field report.pdf".into(),
        mime_type: "application/pdf".into(),
        bytes: vec![b'%'; bytes],
        description: Some("Delivery receipt".into()),
    }
}

// ---- Campaigns ----

#[tokio::test]
async fn campaigns_list_newest_first_with_filters() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let page = registry
        .campaigns
        .list(&CampaignFilter::default(), PageRequest::new(1, 10))
        .await;
    assert_eq!(page.total, 3);
    let ids: Vec<u64> = page.items.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);

    let paused = CampaignFilter {
        status: Some(CampaignStatus::Paused),
        ..Default::default()
    };
    let page = registry.campaigns.list(&paused, PageRequest::new(1, 10)).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "On Hold");

    let search = CampaignFilter {
        query: Some("river".into()),
        ..Default::default()
    };
    assert_eq!(registry.campaigns.list(&search, PageRequest::new(1, 10)).await.total, 1);
}

#[tokio::test]
async fn campaign_create_emits_event_and_assigns_next_id() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let mut rx = registry.event_bus.subscribe();

    let created = registry
        .campaigns
        .create(NewCampaign {
            title: "  Quake Shelter  ".into(),
            goal: Some(2500.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 4);
    assert_eq!(created.title, "Quake Shelter");
    assert_eq!(created.raised, 0.0);
    assert_eq!(created.status, CampaignStatus::Active);

    match rx.recv().await.unwrap() {
        AppEvent::CampaignCreated { campaign_id, .. } => assert_eq!(campaign_id, 4),
        other => panic!("expected CampaignCreated, got {other:?}"),
    }
    assert_eq!(registry.campaigns.get(4).await.unwrap().goal, 2500.0);
}

#[tokio::test]
async fn campaign_create_rejects_blank_title_and_negative_goal() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let blank = registry
        .campaigns
        .create(NewCampaign {
            title: "   ".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(blank.status_code(), 400);

    let negative = registry
        .campaigns
        .create(NewCampaign {
            title: "Negative".into(),
            goal: Some(-5.0),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(negative, ReliefError::InvalidInput(_)));
}

#[tokio::test]
async fn campaign_get_unknown_is_not_found() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let err = registry.campaigns.get(999).await.unwrap_err();
    assert_eq!(err.status_code(), 404);
}

// ---- Donations ----

#[tokio::test]
async fn donation_increments_raised_and_records_tx() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let receipt = registry
        .donations
        .donate(1, donation(Amount::Text("250.50".into())))
        .await
        .unwrap();
    assert_eq!(receipt.donation.amount, 250.5);
    assert_eq!(receipt.donation.donor, "Test Donor");
    assert_eq!(receipt.donation.tx_id.len(), relief_core::ids::TX_ID_LEN);
    assert_eq!(receipt.campaign.raised, 250.5);

    let listed = registry.donations.list(1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, receipt.donation.id);
}

#[tokio::test]
async fn donation_reaching_goal_completes_campaign() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let mut rx = registry.event_bus.subscribe();

    let receipt = registry
        .donations
        .donate(2, donation(Amount::Number(10.0)))
        .await
        .unwrap();
    assert_eq!(receipt.campaign.status, CampaignStatus::Completed);

    match rx.recv().await.unwrap() {
        AppEvent::DonationReceived { goal_reached, .. } => assert!(goal_reached),
        other => panic!("expected DonationReceived, got {other:?}"),
    }

    // Completed campaigns keep accepting donations.
    let again = registry
        .donations
        .donate(2, donation(Amount::Number(5.0)))
        .await
        .unwrap();
    assert_eq!(again.campaign.raised, 105.0);
}

#[tokio::test]
async fn donation_rejections() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    for bad in [Amount::Number(0.0), Amount::Number(-4.0), Amount::Text("lots".into())] {
        let err = registry.donations.donate(1, donation(bad)).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    let paused = registry
        .donations
        .donate(3, donation(Amount::Number(10.0)))
        .await
        .unwrap_err();
    assert_eq!(paused.status_code(), 400);

    let missing = registry
        .donations
        .donate(42, donation(Amount::Number(10.0)))
        .await
        .unwrap_err();
    assert_eq!(missing.status_code(), 404);
    assert_eq!(registry.donations.list(42).await.unwrap_err().status_code(), 404);
}

// ---- Proofs ----

#[tokio::test]
async fn proof_upload_writes_sanitized_file() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    registry.init_all().await.unwrap();

    let proof = registry.proofs.store_upload(1, pdf(2048)).await.unwrap();
    assert_eq!(proof.status, ProofStatus::Pending);
    assert_eq!(proof.size, 2048);
    assert_eq!(proof.original_name, "field report.pdf");
    assert!(proof.file_name.ends_with("-field_report.pdf"));

    let on_disk = registry.proofs.upload_dir().join(&proof.file_name);
    assert_eq!(std::fs::metadata(&on_disk).unwrap().len(), 2048);

    let listed = registry.proofs.list(1).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn proof_upload_rejections() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let limit = registry.proofs.max_file_size() as usize;

    let too_big = registry.proofs.store_upload(1, pdf(limit + 1)).await.unwrap_err();
    assert_eq!(too_big.status_code(), 413);

    let mut exe = pdf(10);
    exe.mime_type = "application/x-msdownload".into();
    let wrong_type = registry.proofs.store_upload(1, exe).await.unwrap_err();
    assert!(matches!(wrong_type, ReliefError::Upload(_)));

    let empty = registry.proofs.store_upload(1, pdf(0)).await.unwrap_err();
    assert_eq!(empty.status_code(), 400);

    let missing = registry.proofs.store_upload(77, pdf(10)).await.unwrap_err();
    assert_eq!(missing.status_code(), 404);
}

#[tokio::test]
async fn proof_status_update() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let proof = registry.proofs.store_upload(2, pdf(16)).await.unwrap();

    let verified = registry
        .proofs
        .set_status(proof.id, ProofStatus::Verified)
        .await
        .unwrap();
    assert_eq!(verified.status, ProofStatus::Verified);
    assert_eq!(registry.stats.stats().await.verified_proofs, 1);

    let err = registry
        .proofs
        .set_status(999, ProofStatus::Rejected)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}

// ---- Auth ----

#[tokio::test]
async fn login_issues_token_that_validates() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let login = registry.auth.login("Admin@Relief.org", "admin123").await.unwrap();
    assert!(login.token.starts_with("mock-jwt-"));
    assert_eq!(login.user.id, 1);

    let user = registry.auth.validate(&login.token).await.unwrap();
    assert_eq!(user.email, "admin@relief.org");
    let bearer = registry.auth.validate(&format!("Bearer {}", login.token)).await.unwrap();
    assert_eq!(bearer.id, 1);

    assert_eq!(registry.auth.session_count().await, 1);
}

#[tokio::test]
async fn login_failures() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let wrong = registry.auth.login("admin@relief.org", "nope").await.unwrap_err();
    assert_eq!(wrong.status_code(), 401);
    let unknown = registry.auth.login("ghost@relief.org", "admin123").await.unwrap_err();
    assert_eq!(unknown.status_code(), 401);
    let blank = registry.auth.login("", "").await.unwrap_err();
    assert_eq!(blank.status_code(), 400);

    let bogus = registry.auth.validate("mock-jwt-forged").await.unwrap_err();
    assert!(matches!(bogus, ReliefError::AuthFailed(_)));
}

#[tokio::test]
async fn old_sessions_are_evicted() {
    let auth = AuthService::new(common::seed_test_store(), common::create_test_event_bus())
        .with_session_limit(2);

    let first = auth.login("admin@relief.org", "admin123").await.unwrap();
    let second = auth.login("donor@example.org", "password").await.unwrap();
    let third = auth.login("admin@relief.org", "admin123").await.unwrap();

    assert_eq!(auth.session_count().await, 2);
    assert!(matches!(
        auth.validate(&first.token).await.unwrap_err(),
        ReliefError::AuthFailed(_)
    ));
    assert_eq!(auth.validate(&second.token).await.unwrap().id, 2);
    assert_eq!(auth.validate(&third.token).await.unwrap().id, 1);
}

#[tokio::test]
async fn profile_is_first_user() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    // Logging in as someone else does not change the profile.
    registry.auth.login("donor@example.org", "password").await.unwrap();
    let profile = registry.auth.profile().await.unwrap();
    assert_eq!(profile.id, 1);
    assert_eq!(profile.name, "Relief Admin");
}

// ---- Stats ----

#[tokio::test]
async fn stats_track_donations() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);

    let before = registry.stats.stats().await;
    assert_eq!(before.total_campaigns, 3);
    assert_eq!(before.total_donations, 0);
    assert_eq!(before.total_raised, 90.0);

    registry.donations.donate(1, donation(Amount::Number(10.0))).await.unwrap();
    let after = registry.stats.stats().await;
    assert_eq!(after.total_donations, 1);
    assert_eq!(after.total_raised, 100.0);
    assert_eq!(after.unique_donors, 1);
    assert_eq!(after.total_users, 2);
}

// ---- Registry ----

#[tokio::test]
async fn registry_lifecycle() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    assert_eq!(registry.service_count(), 6);

    let health = registry.health_check().await;
    assert!(health.iter().all(|(_, state, _)| *state == ServiceState::Created));

    registry.init_all().await.unwrap();
    let health = registry.health_check().await;
    for (name, state, healthy) in &health {
        assert!(healthy, "service {name} is not healthy (state: {state})");
    }

    registry.shutdown_all().await.unwrap();
    let health = registry.health_check().await;
    assert!(health.iter().all(|(_, _, healthy)| !healthy));
}

// ---- Event log ----

#[tokio::test]
async fn event_logger_sees_donations() {
    let dir = TempDir::new().unwrap();
    let registry = common::create_test_registry(&dir);
    let logger = registry.spawn_event_logger();

    registry
        .donations
        .donate(2, donation(Amount::Number(10.0)))
        .await
        .unwrap();

    let tally = logger.stop().await;
    assert_eq!(tally.get("DonationReceived"), Some(&1));
}

#[tokio::test]
async fn event_logger_follows_the_ledger() {
    let dir = TempDir::new().unwrap();
    let registry = ServiceRegistry::from_config(common::create_test_config(&dir)).unwrap();
    let logger = registry.spawn_event_logger();

    registry.escrow.status().await.unwrap();

    let tally = logger.stop().await;
    assert_eq!(tally.get("escrow-deployed"), Some(&1));
    assert!(tally.get("account-created").copied().unwrap_or(0) >= 2);
}
