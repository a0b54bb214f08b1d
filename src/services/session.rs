// src/services/session.rs

//! Session manager: token pair, refresh and validation state.
//!
//! One `SessionManager` is built per process and shared through `Arc`. Token
//! refresh is single-flight: callers that hit a 401 queue on one gate, and
//! whoever gets there after a successful refresh reuses the new token instead
//! of refreshing again.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};

use crate::error::{AppError, Result};
use crate::models::{
    AuthResponse, LoginCredentials, RegisterData, SessionConfig, StoredSession, TokenResponse,
    User,
};
use crate::services::client::decode_envelope;
use crate::services::transport::{ApiRequest, HttpTransport};
use crate::storage::SessionStorage;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct SessionManager {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
    state: RwLock<Option<StoredSession>>,
    refresh_gate: Mutex<()>,
    validation_failures: AtomicU32,
}

impl SessionManager {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
        storage: Arc<dyn SessionStorage>,
        config: SessionConfig,
    ) -> Self {
        Self {
            transport,
            clock,
            storage,
            config,
            state: RwLock::new(None),
            refresh_gate: Mutex::new(()),
            validation_failures: AtomicU32::new(0),
        }
    }

    /// Restore the persisted session. Returns whether one was found.
    pub async fn init(&self) -> Result<bool> {
        let restored = self.storage.load().await?;
        let found = restored.is_some();
        *self.state.write().await = restored;
        self.validation_failures.store(0, Ordering::SeqCst);
        if found {
            log::debug!("Restored persisted session");
        }
        Ok(found)
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        let request = ApiRequest::post("/api/auth/login").json(credentials)?;
        let auth: AuthResponse = decode_envelope(&self.transport.send(request).await?)?
            .into_data("login")?;
        log::info!("Signed in as {}", auth.user.username);
        self.establish(auth).await
    }

    /// Register a new account and sign in with it.
    pub async fn register(&self, data: &RegisterData) -> Result<User> {
        if data.password != data.confirm_password {
            return Err(AppError::validation("passwords do not match"));
        }
        let request = ApiRequest::post("/api/auth/register").json(data)?;
        let auth: AuthResponse = decode_envelope(&self.transport.send(request).await?)?
            .into_data("register")?;
        log::info!("Registered {}", auth.user.username);
        self.establish(auth).await
    }

    async fn establish(&self, auth: AuthResponse) -> Result<User> {
        let session = StoredSession {
            access_token: auth.token,
            refresh_token: Some(auth.refresh_token),
            user: Some(auth.user.clone()),
            last_validated: Some(self.clock.now()),
        };
        self.storage.save(&session).await?;
        *self.state.write().await = Some(session);
        self.validation_failures.store(0, Ordering::SeqCst);
        Ok(auth.user)
    }

    /// Sign out. The server call is best effort; local state is always cleared.
    pub async fn logout(&self) -> Result<()> {
        if let Some(token) = self.access_token().await {
            let request = ApiRequest::post("/api/auth/logout").bearer(Some(token));
            let outcome = match self.transport.send(request).await {
                Ok(response) => decode_envelope(&response).map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = outcome {
                log::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.clear().await
    }

    pub async fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.as_ref().and_then(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .await
            .as_ref()
            .is_some_and(|s| !s.access_token.is_empty())
    }

    /// Replace the cached user after a profile change.
    pub async fn set_user(&self, user: User) -> Result<()> {
        let snapshot = {
            let mut state = self.state.write().await;
            match state.as_mut() {
                Some(session) => {
                    session.user = Some(user);
                    session.clone()
                }
                None => return Ok(()),
            }
        };
        self.storage.save(&snapshot).await
    }

    /// Obtain a usable access token after a request failed with 401.
    ///
    /// `stale` is the token that request carried. If the session already holds
    /// a different token, that token is returned without a network call.
    pub async fn refresh_after_unauthorized(&self, stale: Option<&str>) -> Result<String> {
        let _gate = self.refresh_gate.lock().await;

        let session = self
            .state
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::unauthorized("not signed in"))?;

        if stale != Some(session.access_token.as_str()) {
            log::debug!("Token already refreshed by another request");
            return Ok(session.access_token);
        }

        let refresh_token = session
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized("no refresh token"))?;

        let request = ApiRequest::post("/api/auth/refresh")
            .body(json!({ "refresh_token": refresh_token }));
        let tokens: TokenResponse = decode_envelope(&self.transport.send(request).await?)?
            .into_data("token refresh")?;

        let snapshot = {
            let mut state = self.state.write().await;
            let current = state
                .as_mut()
                .ok_or_else(|| AppError::unauthorized("signed out during refresh"))?;
            current.access_token = tokens.token.clone();
            if let Some(rotated) = tokens.refresh_token.filter(|t| !t.is_empty()) {
                current.refresh_token = Some(rotated);
            }
            current.last_validated = Some(self.clock.now());
            current.clone()
        };
        self.storage.save(&snapshot).await?;
        self.validation_failures.store(0, Ordering::SeqCst);

        log::info!("Access token refreshed");
        Ok(tokens.token)
    }

    /// Drop all local session state.
    pub async fn clear(&self) -> Result<()> {
        *self.state.write().await = None;
        self.validation_failures.store(0, Ordering::SeqCst);
        self.storage.clear().await
    }

    /// Record that the server just confirmed the access token.
    pub async fn mark_validated(&self) -> Result<()> {
        self.validation_failures.store(0, Ordering::SeqCst);
        let snapshot = {
            let mut state = self.state.write().await;
            match state.as_mut() {
                Some(session) => {
                    session.last_validated = Some(self.clock.now());
                    session.clone()
                }
                None => return Ok(()),
            }
        };
        self.storage.save(&snapshot).await
    }

    pub fn record_validation_failure(&self) {
        let failures = self.validation_failures.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!("Token validation failures: {}", failures);
    }

    pub fn validation_failures(&self) -> u32 {
        self.validation_failures.load(Ordering::SeqCst)
    }

    /// Whether the access token is due for a server-side check.
    pub async fn should_validate(&self) -> bool {
        let state = self.state.read().await;
        let Some(session) = state.as_ref() else {
            return false;
        };
        if self.validation_failures() > 0 {
            return true;
        }
        match session.last_validated {
            Some(at) => self.age_secs(at) > self.config.validation_interval_secs as i64,
            None => true,
        }
    }

    /// Whether the token was confirmed recently enough to trust it offline.
    pub async fn is_recently_valid(&self) -> bool {
        if self.validation_failures() > 0 {
            return false;
        }
        self.state
            .read()
            .await
            .as_ref()
            .and_then(|s| s.last_validated)
            .is_some_and(|at| self.age_secs(at) <= self.config.grace_period_secs as i64)
    }

    fn age_secs(&self, at: DateTime<Utc>) -> i64 {
        (self.clock.now() - at).num_seconds()
    }
}
