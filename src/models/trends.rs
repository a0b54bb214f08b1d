// src/models/trends.rs

//! Daily status counts and the trend series built from them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::lenient;

/// Count of status changes to one status on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatusCount {
    /// ISO calendar date (`YYYY-MM-DD`)
    #[serde(default, deserialize_with = "lenient::or_default")]
    pub date: String,

    #[serde(default, deserialize_with = "lenient::or_default")]
    pub status: String,

    #[serde(default, deserialize_with = "lenient::count")]
    pub count: u64,
}

impl DailyStatusCount {
    pub fn new(date: impl Into<String>, status: impl Into<String>, count: u64) -> Self {
        Self {
            date: date.into(),
            status: status.into(),
            count,
        }
    }
}

/// Aggregated figures for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub total_applications: u64,
    /// Fraction in `[0, 1]`
    pub success_rate: f64,
    pub status_distribution: BTreeMap<String, u64>,
}

/// Aggregation horizon for trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendWindow {
    Week,
    #[default]
    Month,
    Quarter,
}

impl TrendWindow {
    /// Number of days the window covers.
    pub fn days(&self) -> u32 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
        }
    }
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
        };
        f.write_str(name)
    }
}

impl FromStr for TrendWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "7" => Ok(Self::Week),
            "month" | "30" => Ok(Self::Month),
            "quarter" | "90" => Ok(Self::Quarter),
            other => Err(format!(
                "unknown trend window '{other}' (expected week, month or quarter)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_window_days() {
        assert_eq!(TrendWindow::Week.days(), 7);
        assert_eq!(TrendWindow::Month.days(), 30);
        assert_eq!(TrendWindow::Quarter.days(), 90);
        assert_eq!(TrendWindow::default(), TrendWindow::Month);
    }

    #[test]
    fn test_window_parse() {
        assert_eq!("Week".parse::<TrendWindow>(), Ok(TrendWindow::Week));
        assert_eq!("90".parse::<TrendWindow>(), Ok(TrendWindow::Quarter));
        assert!("year".parse::<TrendWindow>().is_err());
    }

    #[test]
    fn test_daily_count_lenient() {
        let row: DailyStatusCount =
            serde_json::from_value(json!({ "date": "2024-02-01", "status": "已拒绝", "count": -1 }))
                .unwrap();
        assert_eq!(row.count, 0);

        let row: DailyStatusCount = serde_json::from_value(json!({ "date": "2024-02-01" })).unwrap();
        assert_eq!(row.status, "");
        assert_eq!(row.count, 0);
    }
}
