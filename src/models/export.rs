// src/models/export.rs

//! Export job payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// File format produced by an export job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// Body for starting an export job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTaskStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl ExportTaskStatus {
    /// Whether the job will make no further progress.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Processing)
    }
}

/// State of an export job.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportTask {
    pub task_id: String,
    pub status: ExportTaskStatus,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub processed_records: Option<u64>,
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub file_size: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportHistory {
    #[serde(default, alias = "items")]
    pub tasks: Vec<ExportTask>,
    #[serde(default)]
    pub total: u64,
}

/// One format offered by the export endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportFormatInfo {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SupportedFormats {
    #[serde(default)]
    pub formats: Vec<ExportFormatInfo>,
    #[serde(default, rename = "defaultFormat")]
    pub default_format: Option<String>,
}

/// A column that can be included in an export.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportField {
    pub value: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExportableFields {
    #[serde(default)]
    pub fields: Vec<ExportField>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CleanupResult {
    #[serde(default)]
    pub cleaned: u64,
}

/// A downloaded export file.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_task_status() {
        let status: ExportTaskStatus = serde_json::from_str("\"archived\"").unwrap();
        assert_eq!(status, ExportTaskStatus::Unknown);
        assert!(status.is_terminal());
        assert!(!ExportTaskStatus::Processing.is_terminal());
    }
}
