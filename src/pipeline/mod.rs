// src/pipeline/mod.rs

//! Pure transformations over server data.
//!
//! - `history`: normalize a status-change log into a timeline
//! - `trends`: fold daily status counts into per-day trend points
//! - `timeline`: display items and duration formatting for a timeline
//! - `analytics`: dashboard figures derived from status analytics

pub mod analytics;
pub mod history;
pub mod timeline;
pub mod trends;

use serde_json::Value;

pub use analytics::{AnalyticsOverview, DistributionSlice, distribution_slices, overview};
pub use history::{history_rows, normalize, normalize_value};
pub use timeline::{TimelineItem, format_duration, minutes_between, timeline_items};
pub use trends::{aggregate, aggregate_value};

/// JSON type name for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
