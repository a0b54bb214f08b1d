// src/services/client.rs

//! Authorized API client.
//!
//! Attaches the bearer token, decodes the `{ code, message, data }` envelope
//! and retries a request once after a 401 if the session manager can refresh.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{ApiConfig, ApiEnvelope};
use crate::services::session::SessionManager;
use crate::services::transport::{ApiRequest, HttpTransport, RawResponse};

/// Paths whose auth failures do not end the session.
const NON_CRITICAL_PATHS: [&str; 3] = ["/statistics", "/profile", "/validate"];

pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionManager>,
    slow_request: Duration,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionManager>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            transport,
            session,
            slow_request: config.slow_request_threshold(),
        }
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    /// Send a request and decode a successful envelope.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiEnvelope> {
        let response = self.send_authorized(request).await?;
        decode_envelope(&response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, context: &str) -> Result<T> {
        self.execute(ApiRequest::get(path)).await?.into_data(context)
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, context: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).json(body)?;
        self.execute(request).await?.into_data(context)
    }

    pub async fn put<B, T>(&self, path: &str, body: &B, context: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::put(path).json(body)?;
        self.execute(request).await?.into_data(context)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Fetch a binary body. Only the HTTP status is checked.
    pub async fn download(&self, request: ApiRequest) -> Result<RawResponse> {
        let response = self.send_authorized(request).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(http_error(&response))
        }
    }

    async fn send_authorized(&self, request: ApiRequest) -> Result<RawResponse> {
        let token = self.session.access_token().await;
        let response = self.send_timed(request.clone().bearer(token.clone())).await?;
        if response.status != 401 {
            return Ok(response);
        }

        match self.session.refresh_after_unauthorized(token.as_deref()).await {
            Ok(fresh) => self.send_timed(request.bearer(Some(fresh))).await,
            Err(e) => {
                log::warn!("Token refresh failed for {}: {}", request.path, e);
                if is_non_critical(&request.path) {
                    return Err(AppError::unauthorized("认证失败，请稍后重试"));
                }
                if let Err(clear_err) = self.session.clear().await {
                    log::warn!("Failed to clear session: {}", clear_err);
                }
                Err(e)
            }
        }
    }

    async fn send_timed(&self, request: ApiRequest) -> Result<RawResponse> {
        let started = Instant::now();
        let method = request.method.clone();
        let path = request.path.clone();

        let result = self.transport.send(request).await;

        let elapsed = started.elapsed();
        if elapsed > self.slow_request {
            log::warn!(
                "Slow request: {} {} took {}ms",
                method,
                path,
                elapsed.as_millis()
            );
        }
        match &result {
            Ok(response) => log::debug!("{} {} -> {}", method, path, response.status),
            Err(e) => log::debug!("{} {} failed: {}", method, path, e),
        }
        result
    }
}

fn is_non_critical(path: &str) -> bool {
    NON_CRITICAL_PATHS.iter().any(|p| path.contains(p))
}

/// Decode a response into a successful envelope.
pub(crate) fn decode_envelope(response: &RawResponse) -> Result<ApiEnvelope> {
    if !response.is_success() {
        return Err(http_error(response));
    }
    let envelope: ApiEnvelope = serde_json::from_slice(&response.body)?;
    envelope.into_success()
}

fn server_message(response: &RawResponse) -> Option<String> {
    serde_json::from_slice::<ApiEnvelope>(&response.body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
}

/// Map a non-2xx response to an error with a user-facing message.
fn http_error(response: &RawResponse) -> AppError {
    let server = server_message(response);
    let fixed = |text: &str| text.to_string();

    let message = match response.status {
        401 => return AppError::unauthorized(server.unwrap_or_else(|| fixed("登录已过期，请重新登录"))),
        400 => server.unwrap_or_else(|| fixed("请求参数错误")),
        409 => server.unwrap_or_else(|| fixed("资源冲突")),
        422 => server.unwrap_or_else(|| fixed("数据验证失败")),
        403 => fixed("权限不足，无法访问该资源"),
        404 => fixed("请求的资源不存在"),
        429 => fixed("请求过于频繁，请稍后重试"),
        500 => fixed("服务器内部错误，请稍后重试"),
        502 => fixed("网关错误，服务器暂时不可用"),
        503 => fixed("服务暂时不可用，请稍后重试"),
        504 => fixed("网关超时，请检查网络连接"),
        _ => server.unwrap_or_else(|| fixed("请求失败")),
    };
    AppError::api(response.status, message)
}
