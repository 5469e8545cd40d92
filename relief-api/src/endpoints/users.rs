//! Login and profile endpoints.

use relief_core::error::ReliefResult;
use relief_models::UserProfile;
use relief_services::{LoginRequest, LoginResponse};

use crate::client::ApiClient;

impl ApiClient {
    /// `POST /api/auth/login`. Bad credentials come back as a 401 `ServerError`.
    pub async fn login(&self, email: &str, password: &str) -> ReliefResult<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/api/auth/login", &body).await
    }

    /// `GET /api/users/profile`.
    pub async fn profile(&self) -> ReliefResult<UserProfile> {
        self.get_json("/api/users/profile").await
    }
}
