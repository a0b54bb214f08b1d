// src/services/status_tracking.rs

//! Status history, status updates and status analytics endpoints.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{
    BatchStatusUpdate, DateRange, StatusAnalytics, StatusHistory, TrendPoint, TrendWindow,
    UpdateStatusRequest,
};
use crate::pipeline::{aggregate_value, history_rows, normalize_value};
use crate::services::client::ApiClient;
use crate::services::transport::ApiRequest;

/// Most updates accepted in one batch.
pub const MAX_BATCH_UPDATES: usize = 100;

const BASE: &str = "/api/v1/job-applications";

/// Page selection for the status history endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryPage {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

pub struct StatusTrackingApi {
    client: Arc<ApiClient>,
}

impl StatusTrackingApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch and normalize the status history of one application.
    pub async fn status_history(&self, id: u64, page: HistoryPage) -> Result<StatusHistory> {
        let mut request = ApiRequest::get(format!("{BASE}/{id}/status-history"));
        if let Some(p) = page.page.filter(|p| *p > 0) {
            request = request.query("page", p);
        }
        if let Some(size) = page.page_size.filter(|s| *s > 0) {
            request = request.query("page_size", size);
        }

        let data = self
            .client
            .execute(request)
            .await?
            .into_value(&format!("status history of application {id}"))?;
        let history = normalize_value(history_rows(&data)?)?;

        log::debug!(
            "Application {}: {} timeline entries, current stage {}",
            id,
            history.entries.len(),
            history.summary.current_stage
        );
        Ok(history)
    }

    pub async fn update_status(&self, id: u64, request: &UpdateStatusRequest) -> Result<()> {
        let request = ApiRequest::post(format!("{BASE}/{id}/status")).json(request)?;
        self.client.execute(request).await.map(|_| ())
    }

    /// Apply several status updates at once. Oversized batches fail locally.
    pub async fn batch_update(&self, batch: &BatchStatusUpdate) -> Result<()> {
        if batch.updates.len() > MAX_BATCH_UPDATES {
            return Err(AppError::validation(format!(
                "batch update supports at most {} records, got {}",
                MAX_BATCH_UPDATES,
                batch.updates.len()
            )));
        }
        let request = ApiRequest::put(format!("{BASE}/status/batch")).json(batch)?;
        self.client.execute(request).await.map(|_| ())
    }

    /// Fetch daily status counts for the window and aggregate them per day.
    pub async fn status_trends<F>(&self, window: TrendWindow, is_success: F) -> Result<Vec<TrendPoint>>
    where
        F: Fn(&str) -> bool,
    {
        let request = ApiRequest::get(format!("{BASE}/status-trends")).query("days", window.days());
        let data = self
            .client
            .execute(request)
            .await?
            .into_value("status trends")?;
        aggregate_value(&data, is_success)
    }

    pub async fn status_analytics(&self, range: &DateRange) -> Result<StatusAnalytics> {
        let request =
            ApiRequest::get(format!("{BASE}/status-analytics")).query_pairs(range.query_pairs());
        self.client
            .execute(request)
            .await?
            .into_data("status analytics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApiConfig, ApplicationStatus, BatchStatusItem, is_success_label};
    use crate::services::fake::{FakeTransport, ok, session_manager};
    use reqwest::Method;
    use serde_json::json;

    async fn api() -> (StatusTrackingApi, Arc<FakeTransport>) {
        let (session, transport, _) = session_manager(Some(("t", "r"))).await;
        let client = ApiClient::new(transport.clone(), Arc::new(session), &ApiConfig::default());
        (StatusTrackingApi::new(Arc::new(client)), transport)
    }

    #[tokio::test]
    async fn test_status_history_normalized() {
        let (api, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/v1/job-applications/7/status-history",
            ok(json!({
                "history": [
                    { "new_status": "笔试中", "status_changed_at": "2024-01-02T00:00:00Z" },
                    { "new_status": "笔试中", "status_changed_at": "2024-01-01T00:00:00Z", "old_status": "简历筛选中" },
                    { "new_status": "一面中", "status_changed_at": "2024-01-03T00:00:00Z" }
                ],
                "total": 3
            })),
        );

        let history = api.status_history(7, HistoryPage::default()).await.unwrap();
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.summary.initial_status, "简历筛选中");
        assert_eq!(history.summary.current_stage, "一面中");
        assert!(transport.requests()[0].query.is_empty());
    }

    #[tokio::test]
    async fn test_status_history_without_data_fails() {
        let (api, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/v1/job-applications/7/status-history",
            ok(json!(null)),
        );
        let err = api.status_history(7, HistoryPage::default()).await.unwrap_err();
        assert!(matches!(err, AppError::MissingData(_)));
    }

    #[tokio::test]
    async fn test_batch_over_limit_is_local() {
        let (api, transport) = api().await;
        let batch = BatchStatusUpdate {
            updates: (0..101)
                .map(|i| BatchStatusItem {
                    application_id: i,
                    status: ApplicationStatus::Rejected,
                    note: None,
                })
                .collect(),
        };
        let err = api.batch_update(&batch).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_trends_use_days_and_aggregate() {
        let (api, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/v1/job-applications/status-trends",
            ok(json!({
                "days": 7,
                "trends": [
                    { "date": "2024-02-02", "status": "一面中", "count": 1 },
                    { "date": "2024-02-01", "status": "已收到offer", "count": 3 },
                    { "date": "2024-02-01", "status": "已拒绝", "count": 2 }
                ]
            })),
        );

        let points = api
            .status_trends(TrendWindow::Week, is_success_label)
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2024-02-01");
        assert!((points[0].success_rate - 0.6).abs() < 1e-9);
        assert_eq!(
            transport.requests()[0].query,
            vec![("days".to_string(), "7".to_string())]
        );
    }

    #[tokio::test]
    async fn test_analytics_date_range() {
        let (api, transport) = api().await;
        transport.push(
            Method::GET,
            "/api/v1/job-applications/status-analytics",
            ok(json!({ "total_applications": 4, "status_distribution": { "已投递": 4 } })),
        );
        let range = DateRange {
            start_date: Some("2024-01-01".into()),
            end_date: None,
        };
        let analytics = api.status_analytics(&range).await.unwrap();
        assert_eq!(analytics.total_applications, 4);
        assert_eq!(
            transport.requests()[0].query,
            vec![("start_date".to_string(), "2024-01-01".to_string())]
        );
    }
}
