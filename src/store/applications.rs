// src/store/applications.rs

//! Cached application list.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{
    ApplicationStatistics, CreateApplication, JobApplication, UpdateApplication,
};
use crate::services::{ApiClient, ApplicationsApi};
use crate::utils::parse_timestamp;

/// Criteria for narrowing the cached list. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct ApplicationFilter {
    /// Exact status label
    pub status: Option<String>,
    /// Case-insensitive substring of the company name
    pub company: Option<String>,
    /// Inclusive `(start, end)` bounds on `application_date`
    pub date_range: Option<(String, String)>,
}

impl ApplicationFilter {
    fn matches(&self, app: &JobApplication) -> bool {
        if let Some(status) = &self.status {
            if &app.status != status {
                return false;
            }
        }
        if let Some(company) = &self.company {
            if !app
                .company_name
                .to_lowercase()
                .contains(&company.to_lowercase())
            {
                return false;
            }
        }
        if let Some((start, end)) = &self.date_range {
            let (Some(date), Some(start), Some(end)) = (
                parse_timestamp(&app.application_date),
                parse_timestamp(start),
                parse_timestamp(end),
            ) else {
                return false;
            };
            if date < start || date > end {
                return false;
            }
        }
        true
    }
}

pub struct ApplicationStore {
    api: ApplicationsApi,
    /// `None` until the first full fetch
    applications: RwLock<Option<Vec<JobApplication>>>,
}

impl ApplicationStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            api: ApplicationsApi::new(client),
            applications: RwLock::new(None),
        }
    }

    /// All applications, from cache unless `force_refresh`.
    pub async fn fetch_all(&self, force_refresh: bool) -> Result<Vec<JobApplication>> {
        if !force_refresh {
            if let Some(cached) = self.applications.read().await.as_ref() {
                return Ok(cached.clone());
            }
        }

        let fetched = self.api.list_all().await?;
        log::info!("Fetched {} applications", fetched.len());
        *self.applications.write().await = Some(fetched.clone());
        Ok(fetched)
    }

    pub async fn get(&self, id: u64) -> Result<JobApplication> {
        let cached = self
            .applications
            .read()
            .await
            .as_ref()
            .and_then(|apps| apps.iter().find(|a| a.id == id).cloned());
        match cached {
            Some(app) => Ok(app),
            None => self.api.get(id).await,
        }
    }

    /// Create an application and put it at the front of the cached list.
    pub async fn create(&self, data: &CreateApplication) -> Result<JobApplication> {
        let created = self.api.create(data).await?;
        if let Some(apps) = self.applications.write().await.as_mut() {
            apps.insert(0, created.clone());
        }
        Ok(created)
    }

    pub async fn update(&self, id: u64, data: &UpdateApplication) -> Result<JobApplication> {
        let updated = self.api.update(id, data).await?;
        if let Some(apps) = self.applications.write().await.as_mut() {
            if let Some(slot) = apps.iter_mut().find(|a| a.id == id) {
                *slot = updated.clone();
            }
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.api.delete(id).await?;
        if let Some(apps) = self.applications.write().await.as_mut() {
            apps.retain(|a| a.id != id);
        }
        Ok(())
    }

    pub async fn statistics(&self) -> Result<ApplicationStatistics> {
        self.api.statistics().await
    }

    /// Cached applications matching `filter`. Empty before the first fetch.
    pub async fn filtered(&self, filter: &ApplicationFilter) -> Vec<JobApplication> {
        self.applications
            .read()
            .await
            .iter()
            .flatten()
            .filter(|app| filter.matches(app))
            .cloned()
            .collect()
    }

    /// Number of cached applications per status label.
    pub async fn status_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for app in self.applications.read().await.iter().flatten() {
            *counts.entry(app.status.clone()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiConfig;
    use crate::services::fake::{FakeTransport, ok, session_manager};
    use reqwest::Method;
    use serde_json::{Value, json};

    const BASE: &str = "/api/v1/applications";

    fn app(id: u64, company: &str, status: &str, date: &str) -> Value {
        json!({
            "id": id,
            "company_name": company,
            "position_title": "Engineer",
            "status": status,
            "application_date": date
        })
    }

    async fn loaded_store() -> (ApplicationStore, Arc<FakeTransport>) {
        let (session, transport, _) = session_manager(Some(("t", "r"))).await;
        let client = ApiClient::new(transport.clone(), Arc::new(session), &ApiConfig::default());
        let store = ApplicationStore::new(Arc::new(client));
        transport.push(
            Method::GET,
            BASE,
            ok(json!({
                "data": [
                    app(1, "Acme", "一面中", "2024-01-05"),
                    app(2, "Globex", "已拒绝", "2024-02-10"),
                    app(3, "acme labs", "一面中", "2024-03-01")
                ],
                "has_next": false
            })),
        );
        store.fetch_all(false).await.unwrap();
        (store, transport)
    }

    #[tokio::test]
    async fn test_fetch_all_uses_cache() {
        let (store, transport) = loaded_store().await;
        assert_eq!(store.fetch_all(false).await.unwrap().len(), 3);
        assert_eq!(transport.calls(&Method::GET, BASE), 1);
    }

    #[tokio::test]
    async fn test_create_update_delete_keep_cache_in_sync() {
        let (store, transport) = loaded_store().await;

        transport.push(Method::POST, BASE, ok(app(4, "Initech", "已投递", "2024-03-02")));
        store
            .create(&CreateApplication {
                company_name: "Initech".into(),
                position_title: "Engineer".into(),
                ..CreateApplication::default()
            })
            .await
            .unwrap();

        transport.push(
            Method::PUT,
            "/api/v1/applications/2",
            ok(app(2, "Globex", "已收到offer", "2024-02-10")),
        );
        store
            .update(2, &UpdateApplication::default())
            .await
            .unwrap();

        transport.push(Method::DELETE, "/api/v1/applications/1", ok(Value::Null));
        store.delete(1).await.unwrap();

        let apps = store.fetch_all(false).await.unwrap();
        let ids: Vec<u64> = apps.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![4, 2, 3]);
        assert_eq!(apps[1].status, "已收到offer");
    }

    #[tokio::test]
    async fn test_filter_and_counts() {
        let (store, _) = loaded_store().await;

        let by_company = store
            .filtered(&ApplicationFilter {
                company: Some("ACME".into()),
                ..ApplicationFilter::default()
            })
            .await;
        assert_eq!(by_company.len(), 2);

        let by_range = store
            .filtered(&ApplicationFilter {
                status: Some("一面中".into()),
                date_range: Some(("2024-02-01".into(), "2024-03-31".into())),
                ..ApplicationFilter::default()
            })
            .await;
        assert_eq!(by_range.len(), 1);
        assert_eq!(by_range[0].id, 3);

        let counts = store.status_counts().await;
        assert_eq!(counts.get("一面中"), Some(&2));
        assert_eq!(counts.get("已拒绝"), Some(&1));
    }
}
