// src/services/resume.rs

//! Resume endpoints.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::models::{
    Resume, ResumeAggregate, ResumeAttachment, ResumeSection, ResumeSummary, SectionType,
    UpdateResumeMeta, UploadedAttachment,
};
use crate::services::client::ApiClient;
use crate::services::transport::{ApiRequest, FilePart};

const BASE: &str = "/api/v1/resumes";

pub struct ResumeApi {
    client: Arc<ApiClient>,
}

impl ResumeApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The signed-in user's resume. The server creates an empty one on first use.
    pub async fn my_resume(&self) -> Result<ResumeSummary> {
        self.client.get(&format!("{BASE}/me"), "resume").await
    }

    pub async fn get(&self, id: u64) -> Result<ResumeAggregate> {
        self.client.get(&format!("{BASE}/{id}"), "resume").await
    }

    pub async fn create(&self) -> Result<Resume> {
        self.client
            .execute(ApiRequest::post(BASE))
            .await?
            .into_data("created resume")
    }

    pub async fn update_meta(&self, id: u64, update: &UpdateResumeMeta) -> Result<Resume> {
        self.client
            .put(&format!("{BASE}/{id}"), update, "updated resume")
            .await
    }

    pub async fn list_sections(&self, id: u64) -> Result<Vec<ResumeSection>> {
        self.client
            .execute(ApiRequest::get(format!("{BASE}/{id}/sections")))
            .await?
            .into_data_or_default()
    }

    /// Replace the content of one section, creating it if absent.
    pub async fn upsert_section(&self, id: u64, section: SectionType, content: &Value) -> Result<()> {
        let request = ApiRequest::put(format!("{BASE}/{id}/sections/{section}")).body(content.clone());
        self.client.execute(request).await?;
        log::debug!("Saved section {} of resume {}", section, id);
        Ok(())
    }

    /// Upload a file as the multipart field `file`.
    pub async fn upload_attachment(
        &self,
        id: u64,
        filename: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<UploadedAttachment> {
        let mut part = FilePart::new("file", filename, bytes);
        if let Some(mime) = content_type {
            part = part.content_type(mime);
        }
        let request = ApiRequest::post(format!("{BASE}/{id}/attachments")).file(part);
        self.client
            .execute(request)
            .await?
            .into_data("uploaded attachment")
    }

    /// Attachments of a resume. Anything other than an array reads as none.
    pub async fn list_attachments(&self, id: u64) -> Result<Vec<ResumeAttachment>> {
        let data: Value = self
            .client
            .execute(ApiRequest::get(format!("{BASE}/{id}/attachments")))
            .await?
            .into_data_or_default()?;
        match data {
            Value::Array(_) => Ok(serde_json::from_value(data)?),
            other => {
                log::debug!("Attachment list of resume {} was not an array: {}", id, other);
                Ok(Vec::new())
            }
        }
    }
}
