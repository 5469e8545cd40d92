//! Service registry for dependency injection and lifecycle management.
//!
//! The registry owns the shared infrastructure (config, store, event bus,
//! chain client), builds every service on top of it, initializes them in
//! order, and handles ordered shutdown.

use std::sync::Arc;

use tracing::{error, info};

use relief_chain::{ChainClient, ChainEventDispatcher, SimulatedChain};
use relief_core::config::{AppConfig, ConfigHandle};
use relief_core::constants::EVENT_BUS_CAPACITY;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::{seed, Store};

use crate::auth::AuthService;
use crate::campaign::CampaignService;
use crate::donation::DonationService;
use crate::escrow::EscrowService;
use crate::event_bus::EventBus;
use crate::event_log::EventLogger;
use crate::proof::ProofService;
use crate::service::{Service, ServiceState};
use crate::stats::StatsService;

/// Central service registry that manages all application services.
pub struct ServiceRegistry {
    /// Application configuration.
    pub config: ConfigHandle,
    /// In-memory data.
    pub store: Store,
    /// Application-level event bus.
    pub event_bus: EventBus,
    /// Ledger the escrow service talks to.
    pub chain: Arc<dyn ChainClient>,
    /// Ledger events, when the chain was built by the registry.
    pub chain_events: Option<ChainEventDispatcher>,

    pub campaigns: Arc<CampaignService>,
    pub donations: Arc<DonationService>,
    pub proofs: Arc<ProofService>,
    pub auth: Arc<AuthService>,
    pub stats: Arc<StatsService>,
    pub escrow: Arc<EscrowService>,

    /// Registered services in initialization order.
    services: Vec<Arc<dyn Service>>,
}

impl ServiceRegistry {
    /// Build the full stack from configuration: seeded store, simulated chain,
    /// and every service.
    pub fn from_config(config: AppConfig) -> ReliefResult<Self> {
        let store = Store::new(seed::populate(&config.store));
        let dispatcher = ChainEventDispatcher::new(EVENT_BUS_CAPACITY);
        let mut chain = SimulatedChain::from_config(&config.chain).with_dispatcher(dispatcher.clone());
        if let Some(seed) = config.store.rng_seed {
            chain = chain.with_seed(seed);
        }
        let mut registry = Self::with_parts(config, store, Arc::new(chain))?;
        registry.chain_events = Some(dispatcher);
        Ok(registry)
    }

    /// Build services over an existing store and chain client.
    pub fn with_parts(config: AppConfig, store: Store, chain: Arc<dyn ChainClient>) -> ReliefResult<Self> {
        let event_bus = EventBus::new(EVENT_BUS_CAPACITY);
        let upload_dir = config.effective_upload_dir()?;

        let campaigns = Arc::new(CampaignService::new(store.clone(), event_bus.clone()));
        let donations = Arc::new(DonationService::new(store.clone(), event_bus.clone()));
        let proofs = Arc::new(ProofService::new(
            store.clone(),
            event_bus.clone(),
            upload_dir,
            config.uploads.clone(),
        ));
        let auth = Arc::new(AuthService::new(store.clone(), event_bus.clone()));
        let stats = Arc::new(StatsService::new(store.clone()));
        let escrow = Arc::new(EscrowService::new(
            chain.clone(),
            config.chain.clone(),
            event_bus.clone(),
        ));

        let mut registry = Self {
            config: ConfigHandle::new(config),
            store,
            event_bus,
            chain,
            chain_events: None,
            campaigns: campaigns.clone(),
            donations: donations.clone(),
            proofs: proofs.clone(),
            auth: auth.clone(),
            stats: stats.clone(),
            escrow: escrow.clone(),
            services: Vec::new(),
        };

        // Initialization order: data services first, then the chain-backed one.
        registry.register(campaigns);
        registry.register(donations);
        registry.register(proofs);
        registry.register(auth);
        registry.register(stats);
        registry.register(escrow);
        info!("registered {} services", registry.services.len());
        Ok(registry)
    }

    /// Register a service. Services are initialized in registration order.
    pub fn register(&mut self, service: Arc<dyn Service>) {
        info!("registered service: {}", service.name());
        self.services.push(service);
    }

    /// Initialize all registered services in order.
    pub async fn init_all(&self) -> ReliefResult<()> {
        info!("initializing {} services", self.services.len());

        for service in &self.services {
            let name = service.name();
            info!("initializing service: {name}");
            if let Err(e) = service.init() {
                error!("failed to initialize service {name}: {e}");
                return Err(ReliefError::ServiceInit(format!("{name}: {e}")));
            }
        }

        info!("all services initialized");
        Ok(())
    }

    /// Shut down all services in reverse order.
    pub async fn shutdown_all(&self) -> ReliefResult<()> {
        info!("shutting down services");

        for service in self.services.iter().rev() {
            let name = service.name();
            info!("shutting down service: {name}");
            if let Err(e) = service.shutdown() {
                error!("error shutting down service {name}: {e}");
                // Continue shutting down other services
            }
        }

        info!("all services shut down");
        Ok(())
    }

    /// Get a reference to the event bus.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Start logging application events, plus ledger events when the
    /// registry built the chain.
    pub fn spawn_event_logger(&self) -> EventLogger {
        EventLogger::spawn(&self.event_bus, self.chain_events.as_ref())
    }

    /// Get the health status of all services.
    pub async fn health_check(&self) -> Vec<(String, ServiceState, bool)> {
        self.services
            .iter()
            .map(|s| (s.name().to_string(), s.state(), s.is_healthy()))
            .collect()
    }

    /// Get the number of registered services.
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}
