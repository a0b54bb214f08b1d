// src/pipeline/analytics.rs

//! Dashboard figures derived from [`StatusAnalytics`].

use serde::Serialize;

use crate::models::{StatusAnalytics, is_in_progress_label, status_color};

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsOverview {
    pub total: u64,
    /// Applications currently in an in-progress status
    pub active: u64,
    pub success_rate: f64,
    /// Sum of average per-status durations, in whole days rounded up
    pub average_cycle_days: u64,
}

/// One slice of the status distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionSlice {
    pub status: String,
    pub count: u64,
    /// Share of the distribution total, in percent with two decimals
    pub percentage: f64,
    pub color: &'static str,
}

pub fn overview(analytics: &StatusAnalytics) -> AnalyticsOverview {
    let active = analytics
        .status_distribution
        .iter()
        .filter(|(status, _)| is_in_progress_label(status))
        .map(|(_, count)| *count)
        .sum();

    let cycle_minutes: f64 = analytics
        .average_durations
        .values()
        .filter(|m| m.is_finite())
        .sum();
    let average_cycle_days = if cycle_minutes > 0.0 {
        (cycle_minutes / MINUTES_PER_DAY).ceil() as u64
    } else {
        0
    };

    AnalyticsOverview {
        total: analytics.total_applications,
        active,
        success_rate: analytics.success_rate,
        average_cycle_days,
    }
}

/// Distribution slices in label order.
pub fn distribution_slices(analytics: &StatusAnalytics) -> Vec<DistributionSlice> {
    let total: u64 = analytics.status_distribution.values().sum();
    let denominator = if total == 0 { 1.0 } else { total as f64 };

    analytics
        .status_distribution
        .iter()
        .map(|(status, &count)| DistributionSlice {
            status: status.clone(),
            count,
            percentage: round2(count as f64 / denominator * 100.0),
            color: status_color(status),
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
