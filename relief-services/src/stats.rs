//! Platform-wide aggregates.

use relief_core::error::ReliefResult;
use relief_models::{Stats, Store};

use crate::service::{Service, ServiceState, StateCell};

pub struct StatsService {
    state: StateCell,
    store: Store,
}

impl StatsService {
    pub fn new(store: Store) -> Self {
        Self {
            state: StateCell::new(),
            store,
        }
    }

    pub async fn stats(&self) -> Stats {
        self.store.stats().await
    }
}

impl Service for StatsService {
    fn name(&self) -> &str {
        "stats"
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    fn init(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Running);
        Ok(())
    }

    fn shutdown(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}
