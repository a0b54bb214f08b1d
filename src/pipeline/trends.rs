// src/pipeline/trends.rs

//! Daily trend aggregation.
//!
//! Folds per-day, per-status counts into one [`TrendPoint`] per date. What
//! counts as a success is decided by the caller, so the same fold works for
//! any status vocabulary.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{DailyStatusCount, TrendPoint};
use crate::pipeline::json_kind;

#[derive(Default)]
struct DayTotals {
    total: u64,
    success: u64,
    distribution: BTreeMap<String, u64>,
}

/// Aggregate daily status counts into a date-ordered trend series.
///
/// Dates are ISO strings, so ordering the keys lexicographically orders
/// them chronologically. A panicking predicate is not caught.
pub fn aggregate<'a, I, F>(rows: I, is_success: F) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a DailyStatusCount>,
    F: Fn(&str) -> bool,
{
    let mut days: BTreeMap<&str, DayTotals> = BTreeMap::new();

    for row in rows {
        let day = days.entry(row.date.as_str()).or_default();
        day.total = day.total.saturating_add(row.count);
        let slot = day.distribution.entry(row.status.clone()).or_insert(0);
        *slot = slot.saturating_add(row.count);
        if is_success(&row.status) {
            day.success = day.success.saturating_add(row.count);
        }
    }

    days.into_iter()
        .map(|(date, day)| TrendPoint {
            date: date.to_string(),
            total_applications: day.total,
            success_rate: if day.total > 0 {
                day.success as f64 / day.total as f64
            } else {
                0.0
            },
            status_distribution: day.distribution,
        })
        .collect()
}

/// Aggregate the raw `data` payload of a trends response.
///
/// Accepts a bare array or `{ "trends": [...] }`. A missing or `null` list is
/// empty. Rows that are not objects, or have no date, are skipped.
pub fn aggregate_value<F>(data: &Value, is_success: F) -> Result<Vec<TrendPoint>>
where
    F: Fn(&str) -> bool,
{
    let rows: &[Value] = match data {
        Value::Array(items) => items.as_slice(),
        Value::Null => &[],
        Value::Object(map) => match map.get("trends") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items.as_slice(),
            Some(other) => {
                return Err(AppError::invalid_shape(
                    "status trends must be an array",
                    json_kind(other),
                ));
            }
        },
        other => {
            return Err(AppError::invalid_shape(
                "status trends payload must be an object or array",
                json_kind(other),
            ));
        }
    };

    let counts: Vec<DailyStatusCount> = rows
        .iter()
        .filter(|row| row.is_object())
        .filter_map(|row| DailyStatusCount::deserialize(row).ok())
        .filter(|row| !row.date.is_empty())
        .collect();

    if counts.len() < rows.len() {
        log::debug!(
            "Skipped {} malformed trend rows",
            rows.len() - counts.len()
        );
    }

    Ok(aggregate(&counts, is_success))
}
