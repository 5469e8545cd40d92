//! Global error types for the relief platform.
//!
//! All error categories across the workspace are unified into a single
//! `ReliefError` enum with conversions from underlying library errors and a
//! mapping onto HTTP status codes for the REST layer.

use thiserror::Error;

/// Convenience type alias for Results using ReliefError.
pub type ReliefResult<T> = Result<T, ReliefError>;

/// Unified error type covering all error categories in the platform.
#[derive(Error, Debug)]
pub enum ReliefError {
    // -- Configuration errors --
    /// Failed to load, parse, or validate application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Request errors --
    /// Caller supplied a value that cannot be used.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("campaign", "proof", ...).
        entity: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Credentials were rejected.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A file upload was rejected or could not be stored.
    #[error("upload rejected: {0}")]
    Upload(String),

    /// Request body exceeded the configured limit.
    #[error("payload too large: {size} bytes (limit {limit})")]
    PayloadTooLarge {
        /// Observed size.
        size: u64,
        /// Configured limit.
        limit: u64,
    },

    // -- Chain simulation errors --
    /// Simulated chain operation failed.
    #[error("chain error: {0}")]
    Chain(String),

    /// Escrow release attempted before enough oracle weight approved it.
    #[error("insufficient approvals: {have:.2} of required {need:.2}")]
    InsufficientApprovals {
        /// Approved weight fraction.
        have: f64,
        /// Required weight fraction.
        need: f64,
    },

    /// Account balance cannot cover an amount plus fee.
    #[error("insufficient funds: need {need} microalgos, available {available}")]
    InsufficientFunds {
        /// Amount required including fee.
        need: u64,
        /// Current balance.
        available: u64,
    },

    // -- Network errors --
    /// HTTP transport failed.
    #[error("http error: {0}")]
    Http(String),

    /// Server returned an error response.
    #[error("server error (status {status}): {message}")]
    ServerError {
        /// HTTP status code.
        status: u16,
        /// Error message from server.
        message: String,
    },

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service failed to initialize.
    #[error("service init error: {0}")]
    ServiceInit(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReliefError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// HTTP status code the REST layer reports for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::Upload(_) | Self::Serialization(_) => 400,
            Self::AuthFailed(_) => 401,
            Self::NotFound { .. } => 404,
            Self::Chain(_)
            | Self::InsufficientApprovals { .. }
            | Self::InsufficientFunds { .. } => 409,
            Self::PayloadTooLarge { .. } => 413,
            Self::ServerError { status, .. } => *status,
            _ => 500,
        }
    }

    /// Message safe to expose to API clients.
    ///
    /// Internal failures are reported generically; the detail goes to the log.
    pub fn public_message(&self) -> String {
        if self.status_code() >= 500 {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<serde_json::Error> for ReliefError {
    fn from(e: serde_json::Error) -> Self {
        ReliefError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for ReliefError {
    fn from(e: toml::de::Error) -> Self {
        ReliefError::Config(e.to_string())
    }
}
