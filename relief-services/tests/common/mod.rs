//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use relief_chain::SimulatedChain;
use relief_core::config::{AppConfig, ConfigHandle};
use relief_models::models::campaign::{Campaign, CampaignStatus, DisasterType};
use relief_models::models::user::User;
use relief_models::{Store, StoreData};
use relief_services::event_bus::EventBus;
use relief_services::registry::ServiceRegistry;
use tempfile::TempDir;

/// Default config with zero chain latency and uploads inside `dir`.
pub fn create_test_config(dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.uploads.directory = dir.path().join("uploads").to_string_lossy().into_owned();
    config.chain.latency_ms = 0;
    config.store.rng_seed = Some(7);
    config
}

/// Create a ConfigHandle wrapping a test config.
pub fn create_test_config_handle(dir: &TempDir) -> ConfigHandle {
    ConfigHandle::new(create_test_config(dir))
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// Zero-latency chain with reproducible ids.
pub fn create_test_chain() -> Arc<SimulatedChain> {
    Arc::new(SimulatedChain::new("testnet", Duration::ZERO).with_seed(99))
}

fn campaign(id: u64, title: &str, goal: f64, raised: f64, status: CampaignStatus) -> Campaign {
    Campaign {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        goal,
        raised,
        location: "Test Valley".to_string(),
        disaster_type: DisasterType::Flood,
        status,
        creator: "tests".to_string(),
        beneficiary_address: None,
        image_url: None,
        created_at: Utc::now(),
        end_date: None,
    }
}

/// A small, fully known data set.
///
/// Creates:
/// - campaign 1 "River Flood" (active, goal 1000, raised 0)
/// - campaign 2 "Almost There" (active, goal 100, raised 90)
/// - campaign 3 "On Hold" (paused, goal 500, raised 0)
/// - user 1 admin@relief.org / admin123, user 2 donor@example.org / password
pub fn seed_test_store() -> Store {
    let campaigns = vec![
        campaign(1, "River Flood", 1000.0, 0.0, CampaignStatus::Active),
        campaign(2, "Almost There", 100.0, 90.0, CampaignStatus::Active),
        campaign(3, "On Hold", 500.0, 0.0, CampaignStatus::Paused),
    ];
    let users = vec![
        User {
            id: 1,
            name: "Relief Admin".into(),
            email: "admin@relief.org".into(),
            password: "admin123".into(),
            role: "admin".into(),
            wallet_address: None,
            created_at: Utc::now(),
        },
        User {
            id: 2,
            name: "Donor".into(),
            email: "donor@example.org".into(),
            password: "password".into(),
            role: "donor".into(),
            wallet_address: None,
            created_at: Utc::now(),
        },
    ];
    Store::new(StoreData::new(campaigns, Vec::new(), Vec::new(), users))
}

/// Registry over the known data set and a zero-latency chain.
pub fn create_test_registry(dir: &TempDir) -> ServiceRegistry {
    ServiceRegistry::with_parts(create_test_config(dir), seed_test_store(), create_test_chain())
        .expect("failed to build registry")
}
