//! Application configuration management.
//!
//! Handles loading, saving, validating, and accessing application
//! configuration: HTTP server binding, seed data sizes, upload limits, the
//! chain simulator's oracle set, and the client's base URL. Configuration is
//! persisted as TOML on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, ReliefResult};
use crate::paths;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// In-memory store seeding.
    #[serde(default)]
    pub store: StoreConfig,

    /// Proof upload settings.
    #[serde(default)]
    pub uploads: UploadConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Chain simulator settings.
    #[serde(default)]
    pub chain: ChainConfig,

    /// REST client settings used by the CLI.
    #[serde(default)]
    pub client: ClientConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Value of the `access-control-allow-origin` header.
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,

    /// Largest accepted request body in bytes.
    #[serde(default = "default_max_body")]
    pub max_body_bytes: u64,
}

/// Seed data configuration for the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Number of campaigns generated at startup.
    #[serde(default = "default_seed_campaigns")]
    pub seed_campaigns: usize,

    /// Upper bound on generated donations per campaign.
    #[serde(default = "default_max_seed_donations")]
    pub max_seed_donations: usize,

    /// Number of users generated at startup (the demo admin is always first).
    #[serde(default = "default_seed_users")]
    pub seed_users: usize,

    /// Fixed RNG seed for reproducible data. Random when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

/// Proof upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded files are written to. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Maximum accepted file size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_file_size_bytes: u64,

    /// MIME type prefixes accepted for proofs.
    #[serde(default = "default_allowed_mime")]
    pub allowed_mime_prefixes: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses default location.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

/// A named approval source for escrow release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Display name.
    pub name: String,
    /// Relative voting weight.
    pub weight: f64,
}

/// Chain simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Network label reported in responses ("testnet", "mainnet", ...).
    #[serde(default = "default_network")]
    pub network: String,

    /// Artificial latency applied to every simulated call.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Fraction of total oracle weight required to release escrow funds.
    #[serde(default = "default_threshold")]
    pub approval_threshold: f64,

    /// Oracles allowed to approve releases.
    #[serde(default = "default_oracles")]
    pub oracles: Vec<OracleConfig>,
}

/// REST client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of a running relief server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in milliseconds.
    #[serde(default = "default_client_timeout")]
    pub timeout_ms: u64,
}

// Default value functions for serde

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_cors_origin() -> String {
    "*".to_string()
}

fn default_max_body() -> u64 {
    10 * 1024 * 1024
}

fn default_seed_campaigns() -> usize {
    12
}

fn default_max_seed_donations() -> usize {
    8
}

fn default_seed_users() -> usize {
    5
}

fn default_max_upload() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_mime() -> Vec<String> {
    vec!["image/".into(), "application/pdf".into(), "video/".into()]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_network() -> String {
    "testnet".to_string()
}

fn default_latency_ms() -> u64 {
    800
}

fn default_threshold() -> f64 {
    0.66
}

fn default_oracles() -> Vec<OracleConfig> {
    vec![
        OracleConfig { name: "Red Cross Field Office".into(), weight: 0.4 },
        OracleConfig { name: "Local Government".into(), weight: 0.35 },
        OracleConfig { name: "Satellite Imagery Feed".into(), weight: 0.25 },
    ]
}

fn default_base_url() -> String {
    "http://127.0.0.1:3001".to_string()
}

fn default_client_timeout() -> u64 {
    10_000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
            max_body_bytes: default_max_body(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_campaigns: default_seed_campaigns(),
            max_seed_donations: default_max_seed_donations(),
            seed_users: default_seed_users(),
            rng_seed: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: String::new(),
            max_file_size_bytes: default_max_upload(),
            allowed_mime_prefixes: default_allowed_mime(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            latency_ms: default_latency_ms(),
            approval_threshold: default_threshold(),
            oracles: default_oracles(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_client_timeout(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> ReliefResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path and validate it.
    pub fn load_from_file(path: &Path) -> ReliefResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> ReliefResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as pretty TOML.
    pub fn to_toml(&self) -> ReliefResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ReliefError::Config(format!("failed to serialize config: {e}")))
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> ReliefResult<PathBuf> {
        paths::default_config_file()
    }

    /// Get the effective upload directory, using the configured path or the default.
    pub fn effective_upload_dir(&self) -> ReliefResult<PathBuf> {
        if self.uploads.directory.is_empty() {
            paths::default_upload_dir()
        } else {
            Ok(PathBuf::from(&self.uploads.directory))
        }
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> ReliefResult<PathBuf> {
        if self.logging.directory.is_empty() {
            paths::default_log_dir()
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Socket address string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check that values are usable before anything starts.
    pub fn validate(&self) -> ReliefResult<()> {
        if self.server.port == 0 {
            return Err(ReliefError::Config("server.port must be non-zero".into()));
        }
        let threshold = self.chain.approval_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ReliefError::Config(format!(
                "chain.approval_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.chain.oracles.is_empty() {
            return Err(ReliefError::Config("chain.oracles must not be empty".into()));
        }
        if let Some(bad) = self
            .chain
            .oracles
            .iter()
            .find(|o| !(o.weight.is_finite() && o.weight > 0.0))
        {
            return Err(ReliefError::Config(format!(
                "oracle '{}' has non-positive weight {}",
                bad.name, bad.weight
            )));
        }
        Ok(())
    }
}

/// Thread-safe configuration holder for shared access across services.
#[derive(Clone)]
pub struct ConfigHandle {
    inner: Arc<RwLock<AppConfig>>,
}

impl ConfigHandle {
    /// Create a new configuration handle.
    pub fn new(config: AppConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Read the configuration.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.read().await
    }

    /// Write/update the configuration.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, AppConfig> {
        self.inner.write().await
    }

    /// Clone the current configuration out of the lock.
    pub async fn snapshot(&self) -> AppConfig {
        self.inner.read().await.clone()
    }
}
