// src/models/mod.rs

//! Domain models for the tracker client.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod analytics;
mod application;
mod auth;
mod config;
mod envelope;
mod export;
mod history;
mod lenient;
mod resume;
mod status;
mod trends;

// Re-export all public types
pub use analytics::{DateRange, StatusAnalytics};
pub use application::{
    ApplicationPage, ApplicationStatistics, BatchStatusItem, BatchStatusUpdate,
    CreateApplication, JobApplication, UpdateApplication, UpdateStatusRequest,
};
pub use auth::{
    AuthResponse, Availability, LoginCredentials, RegisterData, StoredSession, TokenResponse,
    UpdateProfile, User, UserSession,
};
pub use config::{ApiConfig, Config, LoggingConfig, SessionConfig, TrendsConfig};
pub use envelope::ApiEnvelope;
pub use export::{
    CleanupResult, ExportField, ExportFile, ExportFormat, ExportFormatInfo, ExportHistory,
    ExportRequest, ExportTask, ExportTaskStatus, ExportableFields, SupportedFormats,
};
pub use history::{
    DEFAULT_INITIAL_STATUS, HistorySummary, RawStatusRecord, StatusChangeRecord, StatusHistory,
    StatusTrigger, TimelineEntry, UNKNOWN_STAGE,
};
pub use resume::{
    Resume, ResumeAggregate, ResumeAttachment, ResumeSection, ResumeSummary, SectionType,
    UpdateResumeMeta, UploadedAttachment,
};
pub use status::{
    ApplicationStatus, StatusCategory, classify, is_failed_label, is_in_progress_label,
    is_success_label, status_color,
};
pub use trends::{DailyStatusCount, TrendPoint, TrendWindow};
