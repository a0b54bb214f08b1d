// src/models/application.rs

//! Job application records and the request bodies that modify them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::lenient;
use crate::models::status::ApplicationStatus;

/// A tracked job application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: u64,
    pub company_name: String,
    pub position_title: String,
    #[serde(default)]
    pub application_date: String,

    /// Status label; kept as text so unknown labels survive a round trip
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub work_location: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub interview_time: Option<String>,
    #[serde(default)]
    pub reminder_time: Option<String>,
    #[serde(default)]
    pub reminder_enabled: Option<bool>,
    #[serde(default)]
    pub follow_up_date: Option<String>,
    #[serde(default)]
    pub hr_name: Option<String>,
    #[serde(default)]
    pub hr_phone: Option<String>,
    #[serde(default)]
    pub hr_email: Option<String>,
    #[serde(default)]
    pub interview_location: Option<String>,
    #[serde(default)]
    pub interview_type: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl JobApplication {
    /// Parsed status, `None` if the label is outside the vocabulary.
    pub fn parsed_status(&self) -> Option<ApplicationStatus> {
        ApplicationStatus::from_label(&self.status)
    }
}

/// Body for creating an application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateApplication {
    pub company_name: String,
    pub position_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hr_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<String>,
}

/// Partial update of an application. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_type: Option<String>,
}

/// One page of the application listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationPage {
    #[serde(default)]
    pub data: Vec<JobApplication>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

/// Aggregate counters over all applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStatistics {
    #[serde(default)]
    pub total_applications: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub passed: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub pass_rate: String,
    #[serde(default)]
    pub status_breakdown: BTreeMap<String, u64>,
}

/// Request to move one application to a new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    /// Optimistic-lock version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

impl UpdateStatusRequest {
    pub fn new(status: ApplicationStatus) -> Self {
        Self {
            status,
            note: None,
            metadata: None,
            version: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// One item of a batch status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatusItem {
    pub application_id: u64,
    pub status: ApplicationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Batch status update body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStatusUpdate {
    pub updates: Vec<BatchStatusItem>,
}
