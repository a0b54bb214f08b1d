// src/pipeline/history.rs

//! Status history normalization.
//!
//! Turns the raw status-change log of one application into an ordered,
//! deduplicated timeline plus summary metadata:
//!
//! 1. drop absent records
//! 2. stable sort by `status_changed_at`
//! 3. drop a record whose status equals the previously kept one
//! 4. summarize the kept entries

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{
    DEFAULT_INITIAL_STATUS, HistorySummary, RawStatusRecord, StatusChangeRecord, StatusHistory,
    TimelineEntry, UNKNOWN_STAGE,
};
use crate::pipeline::json_kind;
use crate::utils::parse_timestamp;

static EMPTY_HISTORY: Value = Value::Null;

/// Normalize a status-change log.
///
/// Records whose timestamp is missing or unparseable sort before all others,
/// keeping their relative order.
pub fn normalize<I>(records: I) -> StatusHistory
where
    I: IntoIterator,
    I::Item: Into<Option<StatusChangeRecord>>,
{
    let mut keyed: Vec<_> = records
        .into_iter()
        .filter_map(Into::<Option<StatusChangeRecord>>::into)
        .map(|record| {
            let key = record.status_changed_at.as_deref().and_then(parse_timestamp);
            (key, record)
        })
        .collect();

    // `sort_by` is stable: ties keep their input order.
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let compressed = compress(keyed.into_iter().map(|(_, record)| record));

    let initial_status = compressed
        .first()
        .and_then(|r| r.old_status.as_deref())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_INITIAL_STATUS)
        .to_string();

    let entries: Vec<TimelineEntry> = compressed.into_iter().map(TimelineEntry::from).collect();
    let summary = summarize(&entries, initial_status);

    StatusHistory { entries, summary }
}

/// Normalize the raw `history` array of a server payload.
///
/// `null` is an empty history. Elements that are not objects are dropped.
/// Anything other than an array or `null` is a contract violation.
pub fn normalize_value(rows: &Value) -> Result<StatusHistory> {
    match rows {
        Value::Null => Ok(normalize(Vec::<StatusChangeRecord>::new())),
        Value::Array(items) => Ok(normalize(items.iter().map(decode_record))),
        other => Err(AppError::invalid_shape(
            "status history must be an array",
            json_kind(other),
        )),
    }
}

/// Locate the history rows inside a `data` payload.
///
/// Accepts `{ "history": [...] }` or a bare array.
pub fn history_rows(data: &Value) -> Result<&Value> {
    match data {
        Value::Array(_) => Ok(data),
        Value::Object(map) => Ok(map.get("history").unwrap_or(&EMPTY_HISTORY)),
        other => Err(AppError::invalid_shape(
            "status history payload must be an object or array",
            json_kind(other),
        )),
    }
}

fn decode_record(row: &Value) -> Option<StatusChangeRecord> {
    match row {
        Value::Object(_) => RawStatusRecord::deserialize(row)
            .map(RawStatusRecord::canonicalize)
            .ok(),
        Value::Null => None,
        other => {
            log::debug!("Dropping status history row of type {}", json_kind(other));
            None
        }
    }
}

/// Drop records that repeat the status of the previously kept record.
fn compress(records: impl Iterator<Item = StatusChangeRecord>) -> Vec<StatusChangeRecord> {
    let mut kept: Vec<StatusChangeRecord> = Vec::new();
    let mut previous: Option<String> = None;

    for record in records {
        let status = record.new_status.as_str();
        if !status.is_empty() && previous.as_deref() == Some(status) {
            log::debug!(
                "Skipping duplicate status '{}' at {:?}",
                status,
                record.status_changed_at
            );
            continue;
        }
        previous = Some(record.new_status.clone());
        kept.push(record);
    }

    kept
}

fn summarize(entries: &[TimelineEntry], initial_status: String) -> HistorySummary {
    let total_duration = entries.iter().map(|e| e.duration.unwrap_or(0)).sum();
    let last = entries.last();

    HistorySummary {
        total_duration,
        status_count: entries.len(),
        last_updated: last.map(|e| e.timestamp.clone()).unwrap_or_default(),
        current_stage: last
            .map(|e| e.status.clone())
            .unwrap_or_else(|| UNKNOWN_STAGE.to_string()),
        initial_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(status: &str, at: &str) -> StatusChangeRecord {
        StatusChangeRecord::new(status, at)
    }

    fn with_note(mut r: StatusChangeRecord, note: &str) -> StatusChangeRecord {
        r.note = Some(note.to_string());
        r
    }

    fn with_duration(mut r: StatusChangeRecord, minutes: i64) -> StatusChangeRecord {
        r.duration_minutes = Some(minutes);
        r
    }

    fn assert_invariants(history: &StatusHistory) {
        let stamps: Vec<_> = history
            .entries
            .iter()
            .map(|e| parse_timestamp(&e.timestamp))
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]), "not sorted");
        assert!(
            history
                .entries
                .windows(2)
                .all(|w| w[0].status.is_empty() || w[0].status != w[1].status),
            "adjacent duplicate"
        );
        assert_eq!(history.summary.status_count, history.entries.len());
        let total: i64 = history.entries.iter().map(|e| e.duration.unwrap_or(0)).sum();
        assert_eq!(history.summary.total_duration, total);
    }

    #[test]
    fn test_sort_then_dedup() {
        let history = normalize(vec![
            record("A", "2024-01-02T00:00:00Z"),
            record("A", "2024-01-01T00:00:00Z"),
            record("B", "2024-01-03T00:00:00Z"),
        ]);

        assert_invariants(&history);
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.entries[0].status, "A");
        assert_eq!(history.entries[0].timestamp, "2024-01-01T00:00:00Z");
        assert_eq!(history.entries[1].status, "B");
        assert_eq!(history.entries[1].timestamp, "2024-01-03T00:00:00Z");
        assert_eq!(history.summary.status_count, 2);
        assert_eq!(history.summary.current_stage, "B");
        assert_eq!(history.summary.last_updated, "2024-01-03T00:00:00Z");
    }

    #[test]
    fn test_empty_input() {
        let history = normalize(Vec::<StatusChangeRecord>::new());
        assert!(history.entries.is_empty());
        assert_eq!(history.summary.total_duration, 0);
        assert_eq!(history.summary.status_count, 0);
        assert_eq!(history.summary.last_updated, "");
        assert_eq!(history.summary.current_stage, "未知阶段");
        assert_eq!(history.summary.initial_status, "已投递");
    }

    #[test]
    fn test_all_duplicates_keep_first() {
        let history = normalize(vec![
            with_note(record("笔试中", "2024-01-01T00:00:00Z"), "first"),
            with_note(record("笔试中", "2024-01-02T00:00:00Z"), "second"),
            with_note(record("笔试中", "2024-01-03T00:00:00Z"), "third"),
        ]);
        assert_eq!(history.entries.len(), 1);
        assert_eq!(history.entries[0].note.as_deref(), Some("first"));
    }

    #[test]
    fn test_exact_tie_merges_in_input_order() {
        let history = normalize(vec![
            with_note(record("一面中", "2024-01-05T09:00:00Z"), "first"),
            with_note(record("一面中", "2024-01-05T09:00:00Z"), "second"),
        ]);
        assert_eq!(history.entries.len(), 1);
        assert_eq!(history.entries[0].note.as_deref(), Some("first"));
    }

    #[test]
    fn test_tie_break_is_stable() {
        // A and B share a timestamp; stable sort keeps A, B, A, so nothing is adjacent.
        let history = normalize(vec![
            with_note(record("A", "2024-01-05T09:00:00Z"), "a1"),
            with_note(record("B", "2024-01-05T09:00:00Z"), "b"),
            with_note(record("A", "2024-01-05T09:00:00Z"), "a2"),
        ]);
        let notes: Vec<_> = history
            .entries
            .iter()
            .map(|e| e.note.clone().unwrap_or_default())
            .collect();
        assert_eq!(notes, vec!["a1", "b", "a2"]);
    }

    #[test]
    fn test_non_adjacent_repeat_is_kept() {
        let history = normalize(vec![
            record("A", "2024-01-01T00:00:00Z"),
            record("B", "2024-01-02T00:00:00Z"),
            record("A", "2024-01-03T00:00:00Z"),
        ]);
        assert_invariants(&history);
        assert_eq!(history.entries.len(), 3);
    }

    #[test]
    fn test_absent_records_are_dropped() {
        let history = normalize(vec![
            None,
            Some(record("A", "2024-01-01T00:00:00Z")),
            None,
        ]);
        assert_eq!(history.entries.len(), 1);
    }

    #[test]
    fn test_empty_status_never_merges() {
        let history = normalize(vec![
            record("", "2024-01-01T00:00:00Z"),
            record("", "2024-01-02T00:00:00Z"),
        ]);
        assert_eq!(history.entries.len(), 2);
    }

    #[test]
    fn test_total_duration_treats_absent_as_zero() {
        let history = normalize(vec![
            with_duration(record("A", "2024-01-01T00:00:00Z"), 90),
            record("B", "2024-01-02T00:00:00Z"),
            with_duration(record("C", "2024-01-03T00:00:00Z"), 30),
        ]);
        assert_invariants(&history);
        assert_eq!(history.summary.total_duration, 120);
    }

    #[test]
    fn test_duplicate_duration_not_counted() {
        let history = normalize(vec![
            with_duration(record("A", "2024-01-01T00:00:00Z"), 10),
            with_duration(record("A", "2024-01-02T00:00:00Z"), 999),
        ]);
        assert_eq!(history.summary.total_duration, 10);
    }

    #[test]
    fn test_initial_status_from_first_kept_record() {
        let mut first = record("笔试中", "2024-01-01T00:00:00Z");
        first.old_status = Some("简历筛选中".to_string());
        let history = normalize(vec![record("一面中", "2024-01-02T00:00:00Z"), first]);
        assert_eq!(history.summary.initial_status, "简历筛选中");

        let mut blank = record("笔试中", "2024-01-01T00:00:00Z");
        blank.old_status = Some(String::new());
        let history = normalize(vec![blank]);
        assert_eq!(history.summary.initial_status, "已投递");
    }

    #[test]
    fn test_unparseable_timestamps_sort_first() {
        let history = normalize(vec![
            record("B", "2024-01-02T00:00:00Z"),
            record("X", "not a time"),
            StatusChangeRecord {
                new_status: "Y".to_string(),
                ..StatusChangeRecord::default()
            },
        ]);
        let statuses: Vec<_> = history.entries.iter().map(|e| e.status.as_str()).collect();
        assert_eq!(statuses, vec!["X", "Y", "B"]);
        assert_eq!(history.entries[1].timestamp, "");
    }

    #[test]
    fn test_mixed_offsets_compare_as_instants() {
        let history = normalize(vec![
            record("B", "2024-01-01T09:00:00+08:00"), // 01:00Z
            record("A", "2024-01-01T00:30:00Z"),
        ]);
        assert_eq!(history.entries[0].status, "A");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize(vec![
            with_duration(record("A", "2024-01-03T00:00:00Z"), 5),
            record("A", "2024-01-01T00:00:00Z"),
            record("B", "2024-01-02T00:00:00Z"),
            record("C", "2024-01-04T00:00:00Z"),
        ]);

        let replay: Vec<StatusChangeRecord> = once
            .entries
            .iter()
            .map(|e| StatusChangeRecord {
                new_status: e.status.clone(),
                status_changed_at: Some(e.timestamp.clone()),
                duration_minutes: e.duration,
                note: e.note.clone(),
                trigger: e.trigger,
                user_id: e.user_id,
                metadata: e.metadata.clone(),
                ..StatusChangeRecord::default()
            })
            .collect();
        let twice = normalize(replay);

        assert_eq!(once.entries, twice.entries);
        assert_eq!(once.summary, twice.summary);
    }

    #[test]
    fn test_normalize_value_from_server_rows() {
        let rows = json!([
            null,
            {
                "new_status": "一面中",
                "old_status": "笔试通过",
                "status_changed_at": "2024-03-02T10:00:00Z",
                "duration_minutes": 60,
                "trigger": "manual",
                "user_id": 3,
                "metadata": { "interview_time": "2024-03-05T14:00:00Z", "note": "HR called" }
            },
            "garbage",
            { "status": "笔试通过", "status_changed_at": "2024-03-01T10:00:00Z" }
        ]);

        let history = normalize_value(&rows).unwrap();
        assert_eq!(history.entries.len(), 2);
        assert_eq!(history.entries[0].status, "笔试通过");
        let interview = &history.entries[1];
        assert_eq!(interview.note.as_deref(), Some("HR called"));
        assert_eq!(
            interview.interview_scheduled.as_deref(),
            Some("2024-03-05T14:00:00Z")
        );
        assert_eq!(history.summary.initial_status, "已投递");
        assert_eq!(history.summary.total_duration, 60);
    }

    #[test]
    fn test_normalize_value_rejects_non_array() {
        assert!(normalize_value(&Value::Null).unwrap().entries.is_empty());
        let err = normalize_value(&json!({ "history": [] })).unwrap_err();
        assert!(matches!(err, AppError::InvalidShape(_)));
        assert!(normalize_value(&json!(42)).is_err());
    }

    #[test]
    fn test_history_rows_shapes() {
        let wrapped = json!({ "history": [{ "new_status": "A" }], "total": 1 });
        assert!(history_rows(&wrapped).unwrap().is_array());

        let bare = json!([{ "new_status": "A" }]);
        assert!(history_rows(&bare).unwrap().is_array());

        let missing = json!({ "total": 0 });
        assert!(history_rows(&missing).unwrap().is_null());

        assert!(history_rows(&json!("x")).is_err());
    }
}
