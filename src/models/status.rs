// src/models/status.rs

//! Application status vocabulary and its classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stage of a job application, serialized as the label the server uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    #[serde(rename = "已投递")]
    Applied,
    #[serde(rename = "简历筛选中")]
    ResumeScreening,
    #[serde(rename = "简历筛选未通过")]
    ResumeScreeningFail,
    #[serde(rename = "笔试中")]
    WrittenTest,
    #[serde(rename = "笔试通过")]
    WrittenTestPass,
    #[serde(rename = "笔试未通过")]
    WrittenTestFail,
    #[serde(rename = "一面中")]
    FirstInterview,
    #[serde(rename = "一面通过")]
    FirstPass,
    #[serde(rename = "一面未通过")]
    FirstFail,
    #[serde(rename = "二面中")]
    SecondInterview,
    #[serde(rename = "二面通过")]
    SecondPass,
    #[serde(rename = "二面未通过")]
    SecondFail,
    #[serde(rename = "三面中")]
    ThirdInterview,
    #[serde(rename = "三面通过")]
    ThirdPass,
    #[serde(rename = "三面未通过")]
    ThirdFail,
    #[serde(rename = "HR面中")]
    HrInterview,
    #[serde(rename = "HR面通过")]
    HrPass,
    #[serde(rename = "HR面未通过")]
    HrFail,
    #[serde(rename = "待发offer")]
    OfferWaiting,
    #[serde(rename = "已拒绝")]
    Rejected,
    #[serde(rename = "已收到offer")]
    OfferReceived,
    #[serde(rename = "已接受offer")]
    OfferAccepted,
    #[serde(rename = "流程结束")]
    ProcessFinished,
}

/// Coarse grouping of statuses used for colors and success rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCategory {
    InProgress,
    Passed,
    Failed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 23] = [
        Self::Applied,
        Self::ResumeScreening,
        Self::ResumeScreeningFail,
        Self::WrittenTest,
        Self::WrittenTestPass,
        Self::WrittenTestFail,
        Self::FirstInterview,
        Self::FirstPass,
        Self::FirstFail,
        Self::SecondInterview,
        Self::SecondPass,
        Self::SecondFail,
        Self::ThirdInterview,
        Self::ThirdPass,
        Self::ThirdFail,
        Self::HrInterview,
        Self::HrPass,
        Self::HrFail,
        Self::OfferWaiting,
        Self::Rejected,
        Self::OfferReceived,
        Self::OfferAccepted,
        Self::ProcessFinished,
    ];

    /// Wire label of the status.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Applied => "已投递",
            Self::ResumeScreening => "简历筛选中",
            Self::ResumeScreeningFail => "简历筛选未通过",
            Self::WrittenTest => "笔试中",
            Self::WrittenTestPass => "笔试通过",
            Self::WrittenTestFail => "笔试未通过",
            Self::FirstInterview => "一面中",
            Self::FirstPass => "一面通过",
            Self::FirstFail => "一面未通过",
            Self::SecondInterview => "二面中",
            Self::SecondPass => "二面通过",
            Self::SecondFail => "二面未通过",
            Self::ThirdInterview => "三面中",
            Self::ThirdPass => "三面通过",
            Self::ThirdFail => "三面未通过",
            Self::HrInterview => "HR面中",
            Self::HrPass => "HR面通过",
            Self::HrFail => "HR面未通过",
            Self::OfferWaiting => "待发offer",
            Self::Rejected => "已拒绝",
            Self::OfferReceived => "已收到offer",
            Self::OfferAccepted => "已接受offer",
            Self::ProcessFinished => "流程结束",
        }
    }

    /// Look a status up by its wire label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.label() == label)
    }

    pub fn category(&self) -> StatusCategory {
        match self {
            Self::ResumeScreeningFail
            | Self::WrittenTestFail
            | Self::FirstFail
            | Self::SecondFail
            | Self::ThirdFail
            | Self::HrFail
            | Self::Rejected => StatusCategory::Failed,

            Self::Applied
            | Self::ResumeScreening
            | Self::WrittenTest
            | Self::FirstInterview
            | Self::SecondInterview
            | Self::ThirdInterview
            | Self::HrInterview => StatusCategory::InProgress,

            Self::WrittenTestPass
            | Self::FirstPass
            | Self::SecondPass
            | Self::ThirdPass
            | Self::HrPass
            | Self::OfferWaiting
            | Self::OfferReceived
            | Self::OfferAccepted
            | Self::ProcessFinished => StatusCategory::Passed,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s.trim()).ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Category of a status label, `None` for labels outside the vocabulary.
pub fn classify(label: &str) -> Option<StatusCategory> {
    ApplicationStatus::from_label(label).map(|s| s.category())
}

/// Default success predicate for trend aggregation: passed statuses.
pub fn is_success_label(label: &str) -> bool {
    classify(label) == Some(StatusCategory::Passed)
}

pub fn is_failed_label(label: &str) -> bool {
    classify(label) == Some(StatusCategory::Failed)
}

pub fn is_in_progress_label(label: &str) -> bool {
    classify(label) == Some(StatusCategory::InProgress)
}

/// Display color for a status label.
pub fn status_color(label: &str) -> &'static str {
    match classify(label) {
        Some(StatusCategory::Failed) => "red",
        Some(StatusCategory::InProgress) => "blue",
        Some(StatusCategory::Passed) => "green",
        None => "default",
    }
}
