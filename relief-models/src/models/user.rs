//! User accounts known to the mock login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A platform user. The password never leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub role: String,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Public projection of a user returned by the profile and login endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: String,
    pub wallet_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.clone(),
            wallet_address: u.wallet_address.clone(),
            created_at: u.created_at,
        }
    }
}
