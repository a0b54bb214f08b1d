// src/services/export.rs

//! Export job endpoints.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{
    CleanupResult, ExportFile, ExportHistory, ExportRequest, ExportTask, ExportableFields,
    SupportedFormats,
};
use crate::services::client::ApiClient;
use crate::services::transport::ApiRequest;
use crate::utils::content_disposition_filename;

const BASE: &str = "/api/v1/export";

/// Filename used when the server does not name the download.
pub const DEFAULT_EXPORT_FILENAME: &str = "求职投递记录.xlsx";

pub struct ExportApi {
    client: Arc<ApiClient>,
}

impl ExportApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Start an export job.
    pub async fn start(&self, request: &ExportRequest) -> Result<ExportTask> {
        self.client
            .post(&format!("{BASE}/applications"), request, "export task")
            .await
    }

    pub async fn status(&self, task_id: &str) -> Result<ExportTask> {
        self.client
            .get(&format!("{BASE}/status/{task_id}"), "export status")
            .await
    }

    /// Poll a job every `interval` until it stops making progress.
    ///
    /// Fails with `Timeout` once `max_wait` has passed without a terminal state.
    pub async fn wait_for(
        &self,
        task: ExportTask,
        interval: Duration,
        max_wait: Duration,
    ) -> Result<ExportTask> {
        let deadline = Instant::now() + max_wait;
        let mut task = task;
        while !task.status.is_terminal() {
            if Instant::now() >= deadline {
                return Err(AppError::timeout(format!(
                    "export task {} still {:?} after {}s",
                    task.task_id,
                    task.status,
                    max_wait.as_secs()
                )));
            }
            tokio::time::sleep(interval).await;
            task = self.status(&task.task_id).await?;
            log::debug!("Export {}: {}%", task.task_id, task.progress);
        }
        Ok(task)
    }

    pub async fn cancel(&self, task_id: &str) -> Result<()> {
        self.client.delete(&format!("{BASE}/cancel/{task_id}")).await
    }

    pub async fn history(&self, page: u32, limit: u32) -> Result<ExportHistory> {
        let request = ApiRequest::get(format!("{BASE}/history"))
            .query("page", page)
            .query("limit", limit);
        self.client.execute(request).await?.into_data_or_default()
    }

    pub async fn supported_formats(&self) -> Result<SupportedFormats> {
        self.client
            .execute(ApiRequest::get(format!("{BASE}/formats")))
            .await?
            .into_data_or_default()
    }

    pub async fn exportable_fields(&self) -> Result<ExportableFields> {
        self.client
            .execute(ApiRequest::get(format!("{BASE}/fields")))
            .await?
            .into_data_or_default()
    }

    /// Ask the server to delete expired export files.
    pub async fn cleanup_expired(&self) -> Result<CleanupResult> {
        let result: CleanupResult = self
            .client
            .execute(ApiRequest::post(format!("{BASE}/cleanup")))
            .await?
            .into_data_or_default()?;
        log::info!("Removed {} expired export files", result.cleaned);
        Ok(result)
    }

    /// Download the finished file of a job.
    ///
    /// The server-supplied name is reduced to its final path component.
    pub async fn download(&self, task_id: &str) -> Result<ExportFile> {
        let response = self
            .client
            .download(ApiRequest::get(format!("{BASE}/download/{task_id}")))
            .await?;

        let filename = response
            .header("content-disposition")
            .and_then(content_disposition_filename)
            .and_then(|name| bare_filename(&name))
            .unwrap_or_else(|| DEFAULT_EXPORT_FILENAME.to_string());

        log::info!("Downloaded {} ({} bytes)", filename, response.body.len());
        Ok(ExportFile {
            filename,
            bytes: response.body,
        })
    }
}

/// Last path component of `name`, `None` if nothing usable is left.
fn bare_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}
