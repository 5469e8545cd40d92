//! Liveness and platform statistics.

use std::time::{Duration, Instant};

use relief_core::error::ReliefResult;
use relief_models::{HealthStatus, Stats};

use crate::client::ApiClient;

impl ApiClient {
    /// `GET /`.
    pub async fn health(&self) -> ReliefResult<HealthStatus> {
        self.get_json("/").await
    }

    /// Ping the server. Returns the round-trip latency.
    pub async fn health_check(&self) -> ReliefResult<Duration> {
        let start = Instant::now();
        self.health().await?;
        Ok(start.elapsed())
    }

    /// `GET /api/stats`.
    pub async fn stats(&self) -> ReliefResult<Stats> {
        self.get_json("/api/stats").await
    }
}
