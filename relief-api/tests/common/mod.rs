//! Shared fixtures: an in-process relief server and a client pointed at it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use relief_api::{ApiClient, RetryConfig};
use relief_chain::SimulatedChain;
use relief_core::config::{AppConfig, ClientConfig};
use relief_models::models::campaign::{Campaign, CampaignStatus, DisasterType};
use relief_models::models::user::User;
use relief_models::{Store, StoreData};
use relief_server::ServerHandle;
use relief_services::registry::ServiceRegistry;
use tempfile::TempDir;

fn campaign(id: u64, title: &str, goal: f64, status: CampaignStatus) -> Campaign {
    Campaign {
        id,
        title: title.to_string(),
        description: String::new(),
        goal,
        raised: 0.0,
        location: "Delta Region".to_string(),
        disaster_type: DisasterType::Flood,
        status,
        creator: "tests".to_string(),
        beneficiary_address: None,
        image_url: None,
        created_at: Utc::now(),
        end_date: None,
    }
}

/// Two campaigns (1 active, 2 paused) and the admin user.
fn seed_store() -> Store {
    let campaigns = vec![
        campaign(1, "Delta Flood", 1000.0, CampaignStatus::Active),
        campaign(2, "Paused Drive", 200.0, CampaignStatus::Paused),
    ];
    let users = vec![User {
        id: 1,
        name: "Relief Admin".into(),
        email: "admin@relief.org".into(),
        password: "admin123".into(),
        role: "admin".into(),
        wallet_address: None,
        created_at: Utc::now(),
    }];
    Store::new(StoreData::new(campaigns, Vec::new(), Vec::new(), users))
}

/// Client with fast retries so failure tests stay quick.
pub fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(&ClientConfig {
        base_url: base_url.to_string(),
        timeout_ms: 5000,
    })
    .expect("failed to build client")
    .with_retry_config(RetryConfig {
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(40),
        ..Default::default()
    })
}

pub struct Fixture {
    pub handle: ServerHandle,
    pub client: ApiClient,
    _dir: TempDir,
}

pub async fn start() -> Fixture {
    let dir = TempDir::new().expect("failed to create temp dir");
    let mut config = AppConfig::default();
    config.uploads.directory = dir.path().join("uploads").to_string_lossy().into_owned();
    config.chain.latency_ms = 0;

    let chain = Arc::new(SimulatedChain::new("testnet", Duration::ZERO).with_seed(5));
    let registry = Arc::new(
        ServiceRegistry::with_parts(config, seed_store(), chain).expect("failed to build registry"),
    );
    registry.init_all().await.expect("failed to init services");

    let handle = relief_server::start(registry, "127.0.0.1:0")
        .await
        .expect("failed to start server");
    let client = client_for(&handle.base_url());
    Fixture {
        handle,
        client,
        _dir: dir,
    }
}
