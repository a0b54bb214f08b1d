// src/models/history.rs

//! Status change records and the timeline derived from them.
//!
//! The server has shipped several shapes for a status change over time.
//! [`RawStatusRecord`] accepts all of them and [`RawStatusRecord::canonicalize`]
//! is the single place where key aliases are resolved:
//!
//! | canonical field        | read from, in order                                   |
//! |------------------------|-------------------------------------------------------|
//! | `new_status`           | `new_status`, `status` (first non-empty)              |
//! | `note`                 | `note`, `metadata.note`                               |
//! | `interview_scheduled`  | `metadata.interview_time`, `metadata.interview_scheduled` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;

/// Stage label shown when a history has no entries.
pub const UNKNOWN_STAGE: &str = "未知阶段";

/// Initial status assumed when the server omits the first `old_status`.
pub const DEFAULT_INITIAL_STATUS: &str = "已投递";

/// What caused a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTrigger {
    Manual,
    Auto,
    System,
}

/// A status change record as it arrives on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatusRecord {
    #[serde(default, deserialize_with = "lenient::optional")]
    pub new_status: Option<String>,

    /// Legacy key for `new_status`
    #[serde(default, deserialize_with = "lenient::optional")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub old_status: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub status_changed_at: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional_i64")]
    pub duration_minutes: Option<i64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub note: Option<String>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub trigger: Option<StatusTrigger>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub user_id: Option<u64>,

    #[serde(default, deserialize_with = "lenient::optional")]
    pub metadata: Option<Map<String, Value>>,
}

impl RawStatusRecord {
    /// Resolve legacy aliases into the canonical record.
    pub fn canonicalize(self) -> StatusChangeRecord {
        let new_status = self
            .new_status
            .filter(|s| !s.is_empty())
            .or(self.status)
            .unwrap_or_default();

        let note = self.note.or_else(|| {
            self.metadata
                .as_ref()
                .and_then(|m| m.get("note"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        StatusChangeRecord {
            new_status,
            old_status: self.old_status,
            status_changed_at: self.status_changed_at,
            duration_minutes: self.duration_minutes,
            note,
            trigger: self.trigger,
            user_id: self.user_id,
            metadata: self.metadata,
        }
    }
}

/// A status change with every alias resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusChangeRecord {
    /// New status label, empty when the server sent none
    pub new_status: String,
    pub old_status: Option<String>,
    /// Timestamp text exactly as sent
    pub status_changed_at: Option<String>,
    pub duration_minutes: Option<i64>,
    pub note: Option<String>,
    pub trigger: Option<StatusTrigger>,
    pub user_id: Option<u64>,
    pub metadata: Option<Map<String, Value>>,
}

impl StatusChangeRecord {
    /// Create a record with just a status and a timestamp.
    pub fn new(new_status: impl Into<String>, status_changed_at: impl Into<String>) -> Self {
        Self {
            new_status: new_status.into(),
            status_changed_at: Some(status_changed_at.into()),
            ..Self::default()
        }
    }

    /// Scheduled interview time carried in metadata, if any.
    pub fn interview_scheduled(&self) -> Option<String> {
        let metadata = self.metadata.as_ref()?;
        ["interview_time", "interview_scheduled"]
            .iter()
            .filter_map(|key| metadata.get(*key).and_then(Value::as_str))
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// One step of a normalized timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<StatusTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_scheduled: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl From<StatusChangeRecord> for TimelineEntry {
    fn from(record: StatusChangeRecord) -> Self {
        let interview_scheduled = record.interview_scheduled();
        Self {
            status: record.new_status,
            timestamp: record.status_changed_at.unwrap_or_default(),
            duration: record.duration_minutes,
            note: record.note,
            trigger: record.trigger,
            user_id: record.user_id,
            interview_scheduled,
            metadata: record.metadata,
        }
    }
}

/// Summary metadata derived from a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Sum of entry durations in minutes
    pub total_duration: i64,
    pub status_count: usize,
    /// Timestamp of the final entry, empty when there are none
    pub last_updated: String,
    pub current_stage: String,
    pub initial_status: String,
}

impl Default for HistorySummary {
    fn default() -> Self {
        Self {
            total_duration: 0,
            status_count: 0,
            last_updated: String::new(),
            current_stage: UNKNOWN_STAGE.to_string(),
            initial_status: DEFAULT_INITIAL_STATUS.to_string(),
        }
    }
}

/// Normalized status history of one application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusHistory {
    pub entries: Vec<TimelineEntry>,
    pub summary: HistorySummary,
}
