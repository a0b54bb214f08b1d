// src/services/mod.rs

//! Network layer: transport, session, authorized client and typed endpoints.

pub mod applications;
pub mod auth;
pub mod client;
pub mod export;
pub mod resume;
pub mod session;
pub mod status_tracking;
pub mod transport;

#[cfg(test)]
pub(crate) mod fake;

pub use applications::ApplicationsApi;
pub use auth::AuthApi;
pub use client::ApiClient;
pub use export::ExportApi;
pub use resume::ResumeApi;
pub use session::{Clock, SessionManager, SystemClock};
pub use status_tracking::{HistoryPage, StatusTrackingApi};
pub use transport::{ApiRequest, FilePart, HttpTransport, RawResponse, ReqwestTransport};
