// src/services/auth.rs

//! Account endpoints that need an authorized client.
//!
//! Sign-in, registration, refresh and logout live on the session manager.

use std::sync::Arc;

use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Availability, UpdateProfile, User, UserSession};
use crate::services::client::ApiClient;
use crate::services::transport::ApiRequest;

pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch the signed-in user and refresh the cached copy.
    pub async fn profile(&self) -> Result<User> {
        let user: User = self.client.get("/api/auth/profile", "profile").await?;
        self.client.session().set_user(user.clone()).await?;
        Ok(user)
    }

    pub async fn update_profile(&self, update: &UpdateProfile) -> Result<User> {
        let user: User = self
            .client
            .put("/api/auth/profile", update, "profile update")
            .await?;
        self.client.session().set_user(user.clone()).await?;
        Ok(user)
    }

    /// Change the password. The server revokes existing tokens, so the local
    /// session is cleared on success.
    pub async fn change_password(&self, current: &str, new: &str) -> Result<()> {
        let request = ApiRequest::put("/api/auth/change-password").body(json!({
            "current_password": current,
            "new_password": new,
        }));
        self.client.execute(request).await?;
        log::info!("Password changed; signing out");
        self.client.session().clear().await
    }

    /// Ask the server whether the access token is still good.
    ///
    /// A rejection is `Ok(false)` and counts as a validation failure. Transport
    /// errors also count as a failure but are returned, so callers can fall
    /// back on [`SessionManager::is_recently_valid`](crate::services::SessionManager::is_recently_valid).
    pub async fn validate_token(&self) -> Result<bool> {
        let session = self.client.session();
        match self.client.execute(ApiRequest::get("/api/auth/validate")).await {
            Ok(_) => {
                session.mark_validated().await?;
                Ok(true)
            }
            Err(AppError::Unauthorized(_) | AppError::Rejected { .. } | AppError::Api { .. }) => {
                session.record_validation_failure();
                Ok(false)
            }
            Err(e) => {
                session.record_validation_failure();
                Err(e)
            }
        }
    }

    pub async fn check_username(&self, username: &str) -> Result<Availability> {
        let request = ApiRequest::get("/api/auth/check-username").query("username", username);
        self.client.execute(request).await?.into_data_or_default()
    }

    pub async fn check_email(&self, email: &str) -> Result<Availability> {
        let request = ApiRequest::get("/api/auth/check-email").query("email", email);
        self.client.execute(request).await?.into_data_or_default()
    }

    /// Devices currently signed in to the account.
    pub async fn sessions(&self) -> Result<Vec<UserSession>> {
        self.client
            .execute(ApiRequest::get("/api/auth/sessions"))
            .await?
            .into_data_or_default()
    }

    pub async fn terminate_session(&self, session_id: &str) -> Result<()> {
        self.client
            .delete(&format!("/api/auth/sessions/{session_id}"))
            .await?;
        log::info!("Terminated session {}", session_id);
        Ok(())
    }

    /// Whether the auth service answers. Any failure counts as down.
    pub async fn health_check(&self) -> bool {
        match self.client.execute(ApiRequest::get("/api/auth/health")).await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiConfig;
    use crate::services::fake::{FakeTransport, http_error, ok, session_manager};
    use reqwest::Method;

    async fn api() -> (AuthApi, Arc<ApiClient>, Arc<FakeTransport>) {
        let (session, transport, _) = session_manager(Some(("t", "r"))).await;
        let client = Arc::new(ApiClient::new(
            transport.clone(),
            Arc::new(session),
            &ApiConfig::default(),
        ));
        (AuthApi::new(client.clone()), client, transport)
    }

    #[tokio::test]
    async fn test_profile_updates_cached_user() {
        let (auth, client, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/auth/profile",
            ok(json!({ "id": 9, "username": "wang", "email": "w@example.com" })),
        );
        let user = auth.profile().await.unwrap();
        assert_eq!(user.id, 9);
        assert_eq!(client.session().current_user().await, Some(user));
    }

    #[tokio::test]
    async fn test_change_password_clears_session() {
        let (auth, client, transport) = api().await;
        transport.push(Method::PUT, "/api/auth/change-password", ok(json!(null)));
        auth.change_password("old", "new").await.unwrap();
        assert!(!client.session().is_authenticated().await);
    }

    #[tokio::test]
    async fn test_validate_token() {
        let (auth, client, transport) = api().await;
        transport.push(Method::GET, "/api/auth/validate", ok(json!({ "valid": true })));
        assert!(auth.validate_token().await.unwrap());
        assert!(client.session().is_recently_valid().await);

        transport.push(Method::GET, "/api/auth/validate", http_error(403, "nope"));
        assert!(!auth.validate_token().await.unwrap());
        assert_eq!(client.session().validation_failures(), 1);
        assert!(client.session().should_validate().await);
    }

    #[tokio::test]
    async fn test_check_username_query() {
        let (auth, _, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/auth/check-username",
            ok(json!({ "available": true })),
        );
        assert!(auth.check_username("li wei").await.unwrap().available);
        assert_eq!(
            transport.requests()[0].query,
            vec![("username".to_string(), "li wei".to_string())]
        );
    }

    #[tokio::test]
    async fn test_sessions_and_terminate() {
        let (auth, _, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/auth/sessions",
            ok(json!([
                { "id": "s1", "device": "laptop", "ip_address": "10.0.0.1", "is_current": true },
                { "id": "s2", "device": "phone" }
            ])),
        );
        transport.push(Method::DELETE, "/api/auth/sessions/s2", ok(json!(null)));

        let sessions = auth.sessions().await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions[0].is_current);
        auth.terminate_session("s2").await.unwrap();
        assert_eq!(transport.calls(&Method::DELETE, "/api/auth/sessions/s2"), 1);
    }

    #[tokio::test]
    async fn test_check_email_and_health() {
        let (auth, _, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/auth/check-email",
            ok(json!({ "available": false, "message": "邮箱已被注册" })),
        );
        transport.push(Method::GET, "/api/auth/health", ok(json!({ "status": "ok" })));
        transport.push(Method::GET, "/api/auth/health", http_error(503, "down"));

        let availability = auth.check_email("a@b.com").await.unwrap();
        assert!(!availability.available);
        assert_eq!(
            transport.requests()[0].query,
            vec![("email".to_string(), "a@b.com".to_string())]
        );
        assert!(auth.health_check().await);
        assert!(!auth.health_check().await);
    }
}
