// src/services/applications.rs

//! Job application CRUD endpoints.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::models::{
    ApplicationPage, ApplicationStatistics, CreateApplication, JobApplication, UpdateApplication,
};
use crate::services::client::ApiClient;
use crate::services::transport::ApiRequest;

/// Largest page the server accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched by [`ApplicationsApi::list_all`].
const MAX_PAGES: u32 = 100;

const BASE: &str = "/api/v1/applications";

pub struct ApplicationsApi {
    client: Arc<ApiClient>,
}

impl ApplicationsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Fetch one page. A bare array payload is treated as a single last page.
    pub async fn list_page(&self, page: u32, page_size: u32) -> Result<ApplicationPage> {
        let request = ApiRequest::get(BASE)
            .query("page", page)
            .query("page_size", page_size.min(MAX_PAGE_SIZE));
        let data: Value = self
            .client
            .execute(request)
            .await?
            .into_data_or_default()?;

        match data {
            Value::Array(_) => {
                let items: Vec<JobApplication> = serde_json::from_value(data)?;
                Ok(ApplicationPage {
                    total: items.len() as u64,
                    page,
                    page_size,
                    total_pages: 1,
                    has_next: false,
                    has_prev: false,
                    data: items,
                })
            }
            Value::Null => Ok(ApplicationPage::default()),
            other => Ok(serde_json::from_value(other)?),
        }
    }

    /// Fetch every application by following `has_next`.
    pub async fn list_all(&self) -> Result<Vec<JobApplication>> {
        let mut all = Vec::new();

        for page in 1..=MAX_PAGES {
            let batch = self.list_page(page, MAX_PAGE_SIZE).await?;
            all.extend(batch.data);
            if !batch.has_next {
                return Ok(all);
            }
        }

        log::warn!(
            "Stopped listing applications after {} pages ({} records)",
            MAX_PAGES,
            all.len()
        );
        Ok(all)
    }

    pub async fn get(&self, id: u64) -> Result<JobApplication> {
        self.client
            .get(&format!("{BASE}/{id}"), &format!("application {id}"))
            .await
    }

    pub async fn create(&self, data: &CreateApplication) -> Result<JobApplication> {
        self.client.post(BASE, data, "created application").await
    }

    pub async fn update(&self, id: u64, data: &UpdateApplication) -> Result<JobApplication> {
        self.client
            .put(&format!("{BASE}/{id}"), data, &format!("application {id}"))
            .await
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&format!("{BASE}/{id}")).await
    }

    pub async fn statistics(&self) -> Result<ApplicationStatistics> {
        self.client
            .get(&format!("{BASE}/statistics"), "application statistics")
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ApiConfig;
    use crate::services::fake::{FakeTransport, ok, session_manager};
    use reqwest::Method;
    use serde_json::json;

    async fn api() -> (ApplicationsApi, Arc<FakeTransport>) {
        let (session, transport, _) = session_manager(Some(("t", "r"))).await;
        let client = ApiClient::new(transport.clone(), Arc::new(session), &ApiConfig::default());
        (ApplicationsApi::new(Arc::new(client)), transport)
    }

    fn app(id: u64) -> Value {
        json!({ "id": id, "company_name": "Acme", "position_title": "SRE", "status": "已投递" })
    }

    #[tokio::test]
    async fn test_list_all_follows_has_next() {
        let (api, transport) = api().await;
        transport.push(
            Method::GET,
            BASE,
            ok(json!({ "data": [app(1), app(2)], "total": 3, "page": 1, "has_next": true })),
        );
        transport.push(
            Method::GET,
            BASE,
            ok(json!({ "data": [app(3)], "total": 3, "page": 2, "has_next": false })),
        );

        let all = api.list_all().await.unwrap();
        let ids: Vec<u64> = all.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let pages: Vec<_> = transport
            .requests()
            .iter()
            .map(|r| r.query[0].1.clone())
            .collect();
        assert_eq!(pages, vec!["1", "2"]);
        assert_eq!(transport.requests()[0].query[1].1, "100");
    }

    #[tokio::test]
    async fn test_list_all_accepts_bare_array() {
        let (api, transport) = api().await;
        transport.push(Method::GET, BASE, ok(json!([app(5)])));
        let all = api.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(transport.calls(&Method::GET, BASE), 1);
    }

    #[tokio::test]
    async fn test_get_missing_data() {
        let (api, transport) = api().await;
        transport.push(Method::GET, "/api/v1/applications/4", ok(Value::Null));
        let err = api.get(4).await.unwrap_err();
        assert!(matches!(err, AppError::MissingData(_)));
    }

    #[tokio::test]
    async fn test_create_sends_body() {
        let (api, transport) = api().await;
        transport.push(Method::POST, BASE, ok(app(11)));
        let created = api
            .create(&CreateApplication {
                company_name: "Acme".into(),
                position_title: "SRE".into(),
                ..CreateApplication::default()
            })
            .await
            .unwrap();
        assert_eq!(created.id, 11);
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({ "company_name": "Acme", "position_title": "SRE" }))
        );
    }
}
