//! ApiClient against a live in-process server.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use relief_api::{CampaignQuery, ProofFile};
use relief_assess::{ImpactInput, InfrastructureDamage, RegionNeed, RiskInput, SupplyRequest};
use relief_core::error::ReliefError;
use relief_models::{Amount, CampaignStatus, NewCampaign, NewDonation, ProofStatus};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn server_error(err: ReliefError) -> (u16, String) {
    match err {
        ReliefError::ServerError { status, message } => (status, message),
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn health_and_stats() {
    let fx = common::start().await;
    let health = fx.client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.service, "relief-server");
    assert!(fx.client.health_check().await.is_ok());

    let stats = fx.client.stats().await.unwrap();
    assert_eq!(stats.total_campaigns, 2);
    assert_eq!(stats.total_users, 1);
}

#[tokio::test]
async fn campaign_round_trip() {
    let fx = common::start().await;

    let list = fx.client.campaigns(&CampaignQuery::default()).await.unwrap();
    assert_eq!(list.total, 2);

    let paused = fx
        .client
        .campaigns(&CampaignQuery {
            status: Some(CampaignStatus::Paused),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(paused.campaigns.len(), 1);
    assert_eq!(paused.campaigns[0].title, "Paused Drive");

    let created = fx
        .client
        .create_campaign(&NewCampaign {
            title: "Landslide Recovery".into(),
            goal: Some(750.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(fx.client.campaign(3).await.unwrap().goal, 750.0);

    let (status, message) = server_error(fx.client.campaign(99).await.unwrap_err());
    assert_eq!(status, 404);
    assert_eq!(message, "campaign not found: 99");
}

#[tokio::test]
async fn donate_then_list() {
    let fx = common::start().await;
    let receipt = fx
        .client
        .donate(
            1,
            &NewDonation {
                amount: Amount::Number(40.0),
                donor: Some("Kai".into()),
                message: Some("stay safe".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(receipt.campaign.raised, 40.0);

    let donations = fx.client.donations(1).await.unwrap();
    assert_eq!(donations.len(), 1);
    assert_eq!(donations[0].message.as_deref(), Some("stay safe"));

    let err = fx
        .client
        .donate(
            2,
            &NewDonation {
                amount: Amount::Number(5.0),
                donor: None,
                message: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(server_error(err).0, 400);
}

#[tokio::test]
async fn proof_upload_and_review() {
    let fx = common::start().await;
    let file = ProofFile {
        file_name: "handover.jpg".into(),
        mime_type: "image/jpeg".into(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    };
    let proof = fx.client.upload_proof(1, file, Some("Handover at school")).await.unwrap();
    assert_eq!(proof.size, 4);
    assert_eq!(proof.status, ProofStatus::Pending);

    assert_eq!(fx.client.proofs(1).await.unwrap().len(), 1);

    let reviewed = fx
        .client
        .set_proof_status(proof.id, ProofStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(reviewed.status, ProofStatus::Rejected);

    let bad = ProofFile {
        file_name: "tool.exe".into(),
        mime_type: "application/x-msdownload".into(),
        bytes: vec![1, 2, 3],
    };
    assert_eq!(server_error(fx.client.upload_proof(1, bad, None).await.unwrap_err()).0, 400);
}

#[tokio::test]
async fn login_profile_and_escrow() {
    let fx = common::start().await;

    let login = fx.client.login("admin@relief.org", "admin123").await.unwrap();
    assert!(login.token.starts_with("mock-jwt-"));
    let (status, _) = server_error(fx.client.login("admin@relief.org", "nope").await.unwrap_err());
    assert_eq!(status, 401);

    assert_eq!(fx.client.profile().await.unwrap().email, "admin@relief.org");

    let receipt = fx.client.quick_donate(3.0, Some("Kai"), Some(1)).await.unwrap();
    assert!(receipt.success);
    let escrow = fx.client.escrow_status().await.unwrap();
    assert_eq!(escrow.app_id, receipt.app_id);
    assert!((escrow.balance_algos - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn escrow_approvals_then_release() {
    let fx = common::start().await;
    fx.client.quick_donate(5.0, None, None).await.unwrap();

    let (status, _) = server_error(fx.client.release_escrow().await.unwrap_err());
    assert_eq!(status, 409);

    fx.client.approve_escrow("Red Cross Field Office").await.unwrap();
    let escrow = fx.client.approve_escrow("Local Government").await.unwrap();
    assert!(escrow.can_release);

    let release = fx.client.release_escrow().await.unwrap();
    assert_eq!(release.app_id, escrow.app_id);
    assert!((release.amount_algos - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn calculators_over_http() {
    let fx = common::start().await;

    let risk: RiskInput = serde_json::from_value(serde_json::json!({
        "hazard": "earthquake",
        "maxHistoricalMagnitude": 7.5,
        "faultDistanceKm": 10,
        "buildingCodeCompliance": 0.3,
        "soilLiquefaction": 0.6,
        "populationDensity": 8000
    }))
    .unwrap();
    let local = relief_assess::assess(&risk).unwrap();
    let remote = fx.client.assess_risk(&risk).await.unwrap();
    assert_eq!(remote.level, local.level);
    assert!((remote.score - local.score).abs() < 1e-9);

    let impact = fx
        .client
        .assess_impact(&ImpactInput {
            affected_population: 5000,
            deaths: 0,
            injured: 10,
            displaced: 400,
            buildings_damaged: 50,
            buildings_total: 500,
            infrastructure: InfrastructureDamage {
                roads: 0.7,
                ..Default::default()
            },
            economic_loss: 100_000.0,
            regional_gdp: 50_000_000.0,
        })
        .await
        .unwrap();
    assert_eq!(impact.priority_sectors.len(), 1);

    let supplies = fx
        .client
        .assess_supplies(
            &SupplyRequest {
                population: 500,
                days: 3,
                vulnerable_share: 0.2,
                household_size: 5.0,
            },
            Some(10_000.0),
        )
        .await
        .unwrap();
    assert_eq!(supplies.plan.households, 100);
    assert!(supplies.budget.is_some());

    let regions = vec![
        RegionNeed {
            name: "Hill".into(),
            population: 100,
            severity: 1.0,
            accessibility: 0.0,
        },
        RegionNeed {
            name: "Coast".into(),
            population: 100,
            severity: 1.0,
            accessibility: 1.0,
        },
    ];
    let allocations = fx.client.allocate(30, &regions).await.unwrap();
    assert_eq!(allocations[0].units, 20);
    assert_eq!(allocations[1].units, 10);
}

/// Serve `failures` 503 responses, then a health body, counting attempts.
async fn flaky_server(failures: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = attempts.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = if n < failures {
                let body = r#"{"error":"warming up"}"#;
                format!(
                    "HTTP/1.1 503 Service Unavailable\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                )
            } else {
                let body = r#"{"status":"ok","service":"stub","version":"0","uptimeSeconds":1}"#;
                format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                )
            };
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}"), attempts)
}

#[tokio::test]
async fn retries_gateway_errors_then_succeeds() {
    let (url, attempts) = flaky_server(2).await;
    let client = common::client_for(&url);
    let health = client.health().await.unwrap();
    assert_eq!(health.service, "stub");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn gives_up_after_three_attempts() {
    let (url, attempts) = flaky_server(10).await;
    let client = common::client_for(&url);
    let (status, message) = server_error(client.health().await.unwrap_err());
    assert_eq!(status, 503);
    assert_eq!(message, "warming up");
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn connection_refused_is_http_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = common::client_for(&format!("http://{addr}"));
    assert!(matches!(client.stats().await.unwrap_err(), ReliefError::Http(_)));
}
