// src/models/resume.rs

//! Resume documents, their typed sections and uploaded attachments.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of a resume section. Each resume holds at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Base,
    Intent,
    Edu,
    Exp,
    Project,
    Skill,
    Cert,
    Honor,
    Summary,
    Links,
}

impl SectionType {
    pub const ALL: [SectionType; 10] = [
        Self::Base,
        Self::Intent,
        Self::Edu,
        Self::Exp,
        Self::Project,
        Self::Skill,
        Self::Cert,
        Self::Honor,
        Self::Summary,
        Self::Links,
    ];

    /// Wire name used in paths and payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Intent => "intent",
            Self::Edu => "edu",
            Self::Exp => "exp",
            Self::Project => "project",
            Self::Skill => "skill",
            Self::Cert => "cert",
            Self::Honor => "honor",
            Self::Summary => "summary",
            Self::Links => "links",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| format!("unknown resume section '{s}'"))
    }
}

/// Resume metadata. Section content is fetched separately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resume {
    pub id: u64,
    #[serde(default)]
    pub user_id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub privacy: String,
    #[serde(default)]
    pub current_version: u32,
    #[serde(default)]
    pub is_completed: bool,

    /// Percentage in `0..=100`, computed by the server
    #[serde(default)]
    pub completeness: u8,

    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// The signed-in user's resume plus which sections exist.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResumeSummary {
    pub resume: Resume,
    #[serde(default, rename = "sections")]
    pub section_types: Vec<String>,
    #[serde(default)]
    pub missing_required: Vec<String>,
}

/// A resume with every section's content keyed by section type.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResumeAggregate {
    pub resume: Resume,
    #[serde(default)]
    pub sections: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSection {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub resume_id: u64,
    #[serde(rename = "type")]
    pub section_type: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeAttachment {
    pub id: u64,
    #[serde(default)]
    pub resume_id: u64,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub etag: Option<String>,
    #[serde(default)]
    pub created_at: String,

    /// Public download URL
    #[serde(default)]
    pub url: Option<String>,
}

/// Response to an attachment upload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UploadedAttachment {
    pub attachment: ResumeAttachment,
    #[serde(default)]
    pub url: String,
}

impl UploadedAttachment {
    /// The attachment with the returned URL filled in.
    pub fn into_attachment(self) -> ResumeAttachment {
        let mut attachment = self.attachment;
        if !self.url.is_empty() {
            attachment.url = Some(self.url);
        }
        attachment
    }
}

/// Body for updating resume metadata; unset fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateResumeMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<String>,
}
