// src/models/auth.rs

//! Account and token payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An account on the tracking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub remember_me: bool,
}

/// Registration form; `confirm_password` is checked locally and never sent.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

/// Login/registration answer.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Token refresh answer. The server may rotate the refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Availability {
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// A signed-in device as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserSession {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub login_time: String,
    #[serde(default)]
    pub last_active: String,
    #[serde(default)]
    pub is_current: bool,
}

/// Credentials and account data kept between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    /// Last time the server confirmed the access token
    #[serde(default)]
    pub last_validated: Option<DateTime<Utc>>,
}
