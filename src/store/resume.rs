// src/store/resume.rs

//! The signed-in user's resume, its section contents and attachments.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::models::{Resume, ResumeAttachment, SectionType};
use crate::services::{ApiClient, ResumeApi};

#[derive(Debug, Default)]
struct ResumeState {
    resume: Option<Resume>,
    /// Section content keyed by wire name
    sections: BTreeMap<String, Value>,
    /// Newest first after an upload
    attachments: Vec<ResumeAttachment>,
    last_saved_at: Option<DateTime<Utc>>,
}

pub struct ResumeStore {
    api: ResumeApi,
    state: RwLock<ResumeState>,
}

impl ResumeStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            api: ResumeApi::new(client),
            state: RwLock::new(ResumeState::default()),
        }
    }

    /// Load the resume, then its sections and attachments concurrently.
    pub async fn fetch_my_resume(&self) -> Result<Resume> {
        let summary = self.api.my_resume().await?;
        self.state.write().await.resume = Some(summary.resume.clone());
        futures::try_join!(self.fetch_sections(), self.fetch_attachments())?;
        Ok(summary.resume)
    }

    pub async fn fetch_sections(&self) -> Result<()> {
        let id = self.current_id().await?;
        let sections = self
            .api
            .list_sections(id)
            .await?
            .into_iter()
            .map(|s| (s.section_type, s.content))
            .collect();
        self.state.write().await.sections = sections;
        Ok(())
    }

    pub async fn fetch_attachments(&self) -> Result<()> {
        let id = self.current_id().await?;
        let attachments = self.api.list_attachments(id).await?;
        self.state.write().await.attachments = attachments;
        Ok(())
    }

    /// Save one section, then refresh the server-computed completeness.
    pub async fn upsert_section(&self, section: SectionType, content: Value) -> Result<()> {
        let id = self.current_id().await?;
        if let Err(e) = self.api.upsert_section(id, section, &content).await {
            log::warn!("Saving section {} of resume {} failed: {}", section, id, e);
            return Err(e);
        }
        self.state
            .write()
            .await
            .sections
            .insert(section.as_str().to_string(), content);

        self.refresh_resume_meta().await;
        self.state.write().await.last_saved_at = Some(Utc::now());
        Ok(())
    }

    /// Upload a file and put it at the head of the attachment list.
    pub async fn upload_attachment(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<ResumeAttachment> {
        let id = self.current_id().await?;
        let attachment = self
            .api
            .upload_attachment(id, filename, content_type, bytes)
            .await?
            .into_attachment();
        self.state
            .write()
            .await
            .attachments
            .insert(0, attachment.clone());
        log::info!("Uploaded {} to resume {}", attachment.file_name, id);

        self.refresh_resume_meta().await;
        Ok(attachment)
    }

    /// Reload resume metadata. A failure keeps the old metadata.
    pub async fn refresh_resume_meta(&self) {
        match self.api.my_resume().await {
            Ok(summary) => self.state.write().await.resume = Some(summary.resume),
            Err(e) => log::warn!("Failed to refresh resume metadata: {}", e),
        }
    }

    pub async fn resume(&self) -> Option<Resume> {
        self.state.read().await.resume.clone()
    }

    pub async fn section(&self, section: SectionType) -> Option<Value> {
        self.state.read().await.sections.get(section.as_str()).cloned()
    }

    pub async fn sections(&self) -> BTreeMap<String, Value> {
        self.state.read().await.sections.clone()
    }

    pub async fn attachments(&self) -> Vec<ResumeAttachment> {
        self.state.read().await.attachments.clone()
    }

    pub async fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_saved_at
    }

    async fn current_id(&self) -> Result<u64> {
        self.state
            .read()
            .await
            .resume
            .as_ref()
            .map(|r| r.id)
            .ok_or_else(|| AppError::validation("no resume loaded; fetch it first"))
    }
}
