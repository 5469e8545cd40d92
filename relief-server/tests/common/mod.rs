//! Shared fixtures for server integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use relief_chain::SimulatedChain;
use relief_core::config::AppConfig;
use relief_models::models::campaign::{Campaign, CampaignStatus, DisasterType};
use relief_models::models::user::User;
use relief_models::{Store, StoreData};
use relief_server::ServerHandle;
use relief_services::registry::ServiceRegistry;
use tempfile::TempDir;

/// Test config: zero chain latency, uploads inside `dir`, small body limit.
pub fn create_test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.uploads.directory = dir.path().join("uploads").to_string_lossy().into_owned();
    config.uploads.max_file_size_bytes = 2048;
    config.server.max_body_bytes = 8 * 1024;
    config.chain.latency_ms = 0;
    config
}

fn campaign(id: u64, title: &str, goal: f64, raised: f64, status: CampaignStatus) -> Campaign {
    Campaign {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        goal,
        raised,
        location: "Test Valley".to_string(),
        disaster_type: if id == 2 { DisasterType::Earthquake } else { DisasterType::Flood },
        status,
        creator: "tests".to_string(),
        beneficiary_address: None,
        image_url: None,
        created_at: Utc::now(),
        end_date: None,
    }
}

/// Known data set: campaigns 1 "River Flood" (goal 1000), 2 "Almost There"
/// (earthquake, goal 100, raised 90), 3 "On Hold" (paused), and the users
/// admin@relief.org / admin123 and donor@example.org / password.
pub fn seed_test_store() -> Store {
    let campaigns = vec![
        campaign(1, "River Flood", 1000.0, 0.0, CampaignStatus::Active),
        campaign(2, "Almost There", 100.0, 90.0, CampaignStatus::Active),
        campaign(3, "On Hold", 500.0, 0.0, CampaignStatus::Paused),
    ];
    let user = |id: u64, name: &str, email: &str, password: &str, role: &str| User {
        id,
        name: name.into(),
        email: email.into(),
        password: password.into(),
        role: role.into(),
        wallet_address: None,
        created_at: Utc::now(),
    };
    let users = vec![
        user(1, "Relief Admin", "admin@relief.org", "admin123", "admin"),
        user(2, "Donor", "donor@example.org", "password", "donor"),
    ];
    Store::new(StoreData::new(campaigns, Vec::new(), Vec::new(), users))
}

/// A running server over the known data set.
pub struct TestServer {
    pub handle: ServerHandle,
    pub registry: Arc<ServiceRegistry>,
    pub client: reqwest::Client,
    _dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.handle.base_url())
    }
}

/// Start a server on an ephemeral port.
pub async fn start_test_server() -> TestServer {
    let dir = TempDir::new().expect("failed to create temp dir");
    let chain = Arc::new(SimulatedChain::new("testnet", Duration::ZERO).with_seed(11));
    let registry = ServiceRegistry::with_parts(create_test_config(&dir), seed_test_store(), chain)
        .expect("failed to build registry");
    let registry = Arc::new(registry);
    registry.init_all().await.expect("failed to init services");

    let handle = relief_server::start(registry.clone(), "127.0.0.1:0")
        .await
        .expect("failed to start server");
    TestServer {
        handle,
        registry,
        client: reqwest::Client::new(),
        _dir: dir,
    }
}
