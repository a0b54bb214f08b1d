// src/models/analytics.rs

//! Server-side status analytics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Aggregate analytics over the user's applications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusAnalytics {
    #[serde(default)]
    pub total_applications: u64,

    /// Current count per status label
    #[serde(default)]
    pub status_distribution: BTreeMap<String, u64>,

    #[serde(default)]
    pub success_rate: f64,

    /// Average minutes spent in each status
    #[serde(default)]
    pub average_durations: BTreeMap<String, f64>,

    #[serde(default)]
    pub insights: Vec<Value>,
}

/// Optional date bounds for analytics queries (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(start) = &self.start_date {
            pairs.push(("start_date".to_string(), start.clone()));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("end_date".to_string(), end.clone()));
        }
        pairs
    }
}
