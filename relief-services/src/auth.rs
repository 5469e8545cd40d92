//! Mock authentication.
//!
//! Credentials are compared against the in-memory users in plain text and a
//! successful login hands out an opaque random token. Tokens carry no claims
//! and are only meaningful to this process.

use std::collections::{HashMap, VecDeque};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use relief_core::constants::TOKEN_PREFIX;
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::{Store, UserProfile};

use crate::event_bus::{AppEvent, EventBus};
use crate::service::{Service, ServiceState, StateCell};

const TOKEN_BYTES: usize = 24;

/// Live tokens kept before the oldest is evicted.
pub const MAX_SESSIONS: usize = 1024;

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    format!("{TOKEN_PREFIX}{}", URL_SAFE_NO_PAD.encode(bytes))
}

/// Issued tokens, oldest first.
#[derive(Default)]
struct Sessions {
    users: HashMap<String, u64>,
    order: VecDeque<String>,
}

impl Sessions {
    fn insert(&mut self, token: String, user_id: u64, limit: usize) {
        while self.order.len() >= limit.max(1) {
            match self.order.pop_front() {
                Some(oldest) => {
                    self.users.remove(&oldest);
                }
                None => break,
            }
        }
        self.order.push_back(token.clone());
        self.users.insert(token, user_id);
    }

    fn clear(&mut self) {
        self.users.clear();
        self.order.clear();
    }
}

pub struct AuthService {
    state: StateCell,
    store: Store,
    event_bus: EventBus,
    sessions: RwLock<Sessions>,
    session_limit: usize,
}

impl AuthService {
    pub fn new(store: Store, event_bus: EventBus) -> Self {
        Self {
            state: StateCell::new(),
            store,
            event_bus,
            sessions: RwLock::new(Sessions::default()),
            session_limit: MAX_SESSIONS,
        }
    }

    /// Keep at most `limit` live tokens; older ones stop validating.
    pub fn with_session_limit(mut self, limit: usize) -> Self {
        self.session_limit = limit;
        self
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, email: &str, password: &str) -> ReliefResult<LoginResponse> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ReliefError::InvalidInput("email and password are required".into()));
        }
        let user = match self.store.user_by_email(email).await {
            Some(user) if user.password == password => user,
            _ => {
                warn!("failed login for {}", email.trim());
                return Err(ReliefError::AuthFailed("invalid email or password".into()));
            }
        };

        let token = new_token();
        self.sessions
            .write()
            .await
            .insert(token.clone(), user.id, self.session_limit);
        info!("user {} logged in", user.id);
        self.event_bus.emit(AppEvent::UserLoggedIn { user_id: user.id });

        Ok(LoginResponse {
            token,
            user: UserProfile::from(&user),
        })
    }

    /// Resolve a token issued by [`login`](Self::login) to its user.
    pub async fn validate(&self, token: &str) -> ReliefResult<UserProfile> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        let user_id = self
            .sessions
            .read()
            .await
            .users
            .get(token)
            .copied()
            .ok_or_else(|| ReliefError::AuthFailed("unknown or expired token".into()))?;
        self.store
            .users()
            .await
            .iter()
            .find(|u| u.id == user_id)
            .map(UserProfile::from)
            .ok_or_else(|| ReliefError::AuthFailed("token user no longer exists".into()))
    }

    /// The profile endpoint's user: always the first one in the store.
    pub async fn profile(&self) -> ReliefResult<UserProfile> {
        Ok(UserProfile::from(&self.store.first_user().await?))
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.users.len()
    }
}

impl Service for AuthService {
    fn name(&self) -> &str {
        "auth"
    }

    fn state(&self) -> ServiceState {
        self.state.get()
    }

    fn init(&self) -> ReliefResult<()> {
        self.state.set(ServiceState::Running);
        Ok(())
    }

    fn shutdown(&self) -> ReliefResult<()> {
        // Tokens do not outlive the process.
        if let Ok(mut sessions) = self.sessions.try_write() {
            sessions.clear();
        }
        self.state.set(ServiceState::Stopped);
        Ok(())
    }
}
