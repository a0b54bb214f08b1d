// src/pipeline/timeline.rs

//! Display projection of a normalized timeline.

use serde::Serialize;

use crate::models::{StatusHistory, is_failed_label, is_success_label, status_color};
use crate::utils::parse_timestamp;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// One row of a rendered timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineItem {
    /// `"{timestamp}_{status}"`
    pub id: String,
    pub status: String,
    pub timestamp: String,
    pub duration: Option<i64>,
    pub note: Option<String>,
    pub is_current: bool,
    pub is_failed: bool,
    pub is_passed: bool,
    pub color: &'static str,
    pub interview_scheduled: Option<String>,
}

/// Project history entries into timeline rows. The last row is current.
pub fn timeline_items(history: &StatusHistory) -> Vec<TimelineItem> {
    let last = history.entries.len().saturating_sub(1);

    history
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| TimelineItem {
            id: format!("{}_{}", entry.timestamp, entry.status),
            status: entry.status.clone(),
            timestamp: entry.timestamp.clone(),
            duration: entry.duration,
            note: entry.note.clone().filter(|n| !n.is_empty()),
            is_current: index == last,
            is_failed: is_failed_label(&entry.status),
            is_passed: is_success_label(&entry.status),
            color: status_color(&entry.status),
            interview_scheduled: entry.interview_scheduled.clone().filter(|s| !s.is_empty()),
        })
        .collect()
}

/// Render a duration in minutes, e.g. `2天3小时`, `1小时5分钟`, `40分钟`.
///
/// The largest unit decides the shape: days show hours, hours show minutes.
/// Zero sub-units are omitted. Absent and non-positive values are `0分钟`.
pub fn format_duration(minutes: Option<i64>) -> String {
    let minutes = match minutes {
        Some(m) if m > 0 => m,
        _ => return "0分钟".to_string(),
    };

    let days = minutes / MINUTES_PER_DAY;
    let hours = (minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let mins = minutes % MINUTES_PER_HOUR;

    if days > 0 {
        if hours > 0 {
            format!("{days}天{hours}小时")
        } else {
            format!("{days}天")
        }
    } else if hours > 0 {
        if mins > 0 {
            format!("{hours}小时{mins}分钟")
        } else {
            format!("{hours}小时")
        }
    } else {
        format!("{mins}分钟")
    }
}

/// Whole minutes from `start` to `end`, `None` if either fails to parse.
pub fn minutes_between(start: &str, end: &str) -> Option<i64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    Some((end - start).num_minutes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatusChangeRecord;
    use crate::pipeline::normalize;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "0分钟");
        assert_eq!(format_duration(Some(0)), "0分钟");
        assert_eq!(format_duration(Some(-5)), "0分钟");
        assert_eq!(format_duration(Some(45)), "45分钟");
        assert_eq!(format_duration(Some(60)), "1小时");
        assert_eq!(format_duration(Some(65)), "1小时5分钟");
        assert_eq!(format_duration(Some(1440)), "1天");
        assert_eq!(format_duration(Some(2 * 1440 + 3 * 60 + 59)), "2天3小时");
    }

    #[test]
    fn test_minutes_between() {
        assert_eq!(
            minutes_between("2024-01-01T00:00:00Z", "2024-01-01T01:30:59Z"),
            Some(90)
        );
        assert_eq!(
            minutes_between("2024-01-02T00:00:00Z", "2024-01-01T00:00:00Z"),
            Some(-1440)
        );
        assert_eq!(minutes_between("bad", "2024-01-01T00:00:00Z"), None);
    }

    #[test]
    fn test_timeline_items() {
        let history = normalize(vec![
            StatusChangeRecord::new("简历筛选中", "2024-01-01T00:00:00Z"),
            StatusChangeRecord::new("笔试未通过", "2024-01-03T00:00:00Z"),
        ]);
        let items = timeline_items(&history);

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, "2024-01-01T00:00:00Z_简历筛选中");
        assert!(!items[0].is_current);
        assert_eq!(items[0].color, "blue");
        assert!(items[1].is_current);
        assert!(items[1].is_failed);
        assert!(!items[1].is_passed);
        assert_eq!(items[1].color, "red");
    }

    #[test]
    fn test_timeline_items_empty() {
        assert!(timeline_items(&StatusHistory::default()).is_empty());
    }
}
