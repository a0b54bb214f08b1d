// src/store/status_tracking.rs

//! Cached status histories and analytics.
//!
//! Histories are cached per application id and dropped whenever that
//! application's status changes. Trends are never cached; each window is
//! recomputed from a fresh query.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{
    BatchStatusUpdate, DateRange, StatusAnalytics, StatusHistory, TrendPoint, TrendWindow,
    UpdateStatusRequest, is_success_label,
};
use crate::pipeline::{TimelineItem, timeline_items};
use crate::services::{ApiClient, HistoryPage, StatusTrackingApi};

/// Classifier deciding which status labels count as a success.
pub type SuccessPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

pub struct StatusTrackingStore {
    api: StatusTrackingApi,
    histories: RwLock<HashMap<u64, StatusHistory>>,
    analytics: RwLock<Option<StatusAnalytics>>,
    is_success: SuccessPredicate,
    max_concurrent: usize,
}

impl StatusTrackingStore {
    /// Create a store that classifies success with the built-in vocabulary.
    pub fn new(client: Arc<ApiClient>, max_concurrent: usize) -> Self {
        Self::with_success_predicate(client, max_concurrent, Arc::new(is_success_label))
    }

    pub fn with_success_predicate(
        client: Arc<ApiClient>,
        max_concurrent: usize,
        is_success: SuccessPredicate,
    ) -> Self {
        Self {
            api: StatusTrackingApi::new(client),
            histories: RwLock::new(HashMap::new()),
            analytics: RwLock::new(None),
            is_success,
            max_concurrent: max_concurrent.max(1),
        }
    }

    pub async fn fetch_status_history(&self, id: u64, force_refresh: bool) -> Result<StatusHistory> {
        if !force_refresh {
            if let Some(history) = self.histories.read().await.get(&id) {
                return Ok(history.clone());
            }
        }

        let history = self.api.status_history(id, HistoryPage::default()).await?;
        self.histories.write().await.insert(id, history.clone());
        Ok(history)
    }

    pub async fn cached_history(&self, id: u64) -> Option<StatusHistory> {
        self.histories.read().await.get(&id).cloned()
    }

    /// Change one application's status and return its refetched history.
    pub async fn update_application_status(
        &self,
        id: u64,
        request: &UpdateStatusRequest,
    ) -> Result<StatusHistory> {
        self.api.update_status(id, request).await?;
        self.histories.write().await.remove(&id);
        log::info!("Application {} moved to {}", id, request.status);

        let history = self.fetch_status_history(id, true).await?;
        self.refresh_analytics_if_cached().await?;
        Ok(history)
    }

    pub async fn batch_update_statuses(&self, batch: &BatchStatusUpdate) -> Result<()> {
        self.api.batch_update(batch).await?;
        {
            let mut histories = self.histories.write().await;
            for update in &batch.updates {
                histories.remove(&update.application_id);
            }
        }
        log::info!("Updated {} application statuses", batch.updates.len());
        self.refresh_analytics_if_cached().await
    }

    pub async fn fetch_analytics(
        &self,
        force_refresh: bool,
        range: &DateRange,
    ) -> Result<StatusAnalytics> {
        if !force_refresh {
            if let Some(analytics) = self.analytics.read().await.as_ref() {
                return Ok(analytics.clone());
            }
        }

        let analytics = self.api.status_analytics(range).await?;
        *self.analytics.write().await = Some(analytics.clone());
        Ok(analytics)
    }

    async fn refresh_analytics_if_cached(&self) -> Result<()> {
        if self.analytics.read().await.is_some() {
            self.fetch_analytics(true, &DateRange::default()).await?;
        }
        Ok(())
    }

    pub async fn fetch_status_trends(&self, window: TrendWindow) -> Result<Vec<TrendPoint>> {
        let is_success = Arc::clone(&self.is_success);
        self.api
            .status_trends(window, move |status| is_success(status))
            .await
    }

    /// Warm the history cache for many applications.
    ///
    /// Returns the ids that failed together with their errors.
    pub async fn prefetch_histories(&self, ids: &[u64]) -> Vec<(u64, AppError)> {
        let mut failures = Vec::new();
        let mut results = stream::iter(ids.iter().copied())
            .map(|id| async move { (id, self.fetch_status_history(id, false).await) })
            .buffer_unordered(self.max_concurrent);

        while let Some((id, result)) = results.next().await {
            if let Err(error) = result {
                log::warn!("Failed to fetch status history of {}: {}", id, error);
                failures.push((id, error));
            }
        }

        failures.sort_by_key(|(id, _)| *id);
        failures
    }

    /// Timeline rows for one application, fetching its history if needed.
    pub async fn timeline(&self, id: u64) -> Result<Vec<TimelineItem>> {
        let history = self.fetch_status_history(id, false).await?;
        Ok(timeline_items(&history))
    }

    pub async fn clear_cache(&self) {
        self.histories.write().await.clear();
        *self.analytics.write().await = None;
    }
}
