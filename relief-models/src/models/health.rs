//! Liveness report returned by `GET /`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Always "ok" while the server answers.
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: u64,
}

impl HealthStatus {
    pub fn ok(service: &str, version: &str, uptime_seconds: u64) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            uptime_seconds,
        }
    }
}
