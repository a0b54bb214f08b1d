// src/services/fake.rs

//! Scripted transport and clock for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Method;
use serde_json::{Value, json};

use crate::error::Result;
use crate::models::{SessionConfig, StoredSession};
use crate::services::session::{Clock, SessionManager};
use crate::services::transport::{ApiRequest, HttpTransport, RawResponse};
use crate::storage::MemoryStorage;

/// Replays queued responses per `(method, path)` and records every request.
///
/// Each `send` yields once before answering, so concurrent callers interleave.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<HashMap<(Method, String), VecDeque<RawResponse>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, method: Method, path: &str, response: RawResponse) {
        self.responses
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        let key = (request.method.clone(), request.path.clone());
        self.requests.lock().unwrap().push(request);

        tokio::task::yield_now().await;

        let scripted = self
            .responses
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        Ok(scripted.unwrap_or_else(|| http_error(404, "no scripted response")))
    }
}

pub(crate) fn raw(status: u16, body: Value) -> RawResponse {
    RawResponse {
        status,
        body: serde_json::to_vec(&body).unwrap(),
        ..RawResponse::default()
    }
}

/// HTTP 200 with a successful envelope around `data`.
pub(crate) fn ok(data: Value) -> RawResponse {
    raw(200, json!({ "code": 200, "message": "success", "data": data }))
}

pub(crate) fn http_error(status: u16, message: &str) -> RawResponse {
    raw(status, json!({ "code": status, "message": message }))
}

/// Clock that only moves when told to.
pub(crate) struct FixedClock(Mutex<DateTime<Utc>>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Mutex::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        ))
    }
}

impl FixedClock {
    pub(crate) fn advance_secs(&self, secs: i64) {
        *self.0.lock().unwrap() += chrono::Duration::seconds(secs);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Session manager over a fake transport, optionally signed in with
/// `(access_token, refresh_token)`.
pub(crate) async fn session_manager(
    tokens: Option<(&str, &str)>,
) -> (SessionManager, Arc<FakeTransport>, Arc<FixedClock>) {
    let transport = Arc::new(FakeTransport::new());
    let clock = Arc::new(FixedClock::default());
    let storage = match tokens {
        Some((access, refresh)) => MemoryStorage::with_session(StoredSession {
            access_token: access.to_string(),
            refresh_token: Some(refresh.to_string()),
            user: None,
            last_validated: None,
        }),
        None => MemoryStorage::new(),
    };

    let session = SessionManager::new(
        transport.clone(),
        clock.clone(),
        Arc::new(storage),
        SessionConfig::default(),
    );
    session.init().await.unwrap();
    (session, transport, clock)
}
