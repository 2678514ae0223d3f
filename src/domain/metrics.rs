//! Metrics domain types for analytics.
//!
//! Provides the rolling-window selector and the per-model summary.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Time range for analytics queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimeRange {
    /// Last 24 hours.
    #[default]
    Last24h,
    /// Last 7 days.
    Last7d,
    /// Last 30 days.
    Last30d,
    /// Last 90 days.
    Last90d,
}

impl TimeRange {
    /// Get the number of hours for this time range.
    pub fn hours(&self) -> i64 {
        match self {
            TimeRange::Last24h => 24,
            TimeRange::Last7d => 24 * 7,
            TimeRange::Last30d => 24 * 30,
            TimeRange::Last90d => 24 * 90,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.hours())
    }

    /// Earliest timestamp inside the window ending at `now`.
    pub fn start_time(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "24h" | "last24h" => Ok(TimeRange::Last24h),
            "7d" | "last7d" => Ok(TimeRange::Last7d),
            "30d" | "last30d" => Ok(TimeRange::Last30d),
            "90d" | "last90d" => Ok(TimeRange::Last90d),
            _ => Err(format!("Invalid time range: {}. Use 24h, 7d, 30d, or 90d", s)),
        }
    }
}

/// Rolling-window statistics for one model.
///
/// Each mean excludes records where that metric is null. A metric with no
/// contributing records reports 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AnalyticsSummary {
    /// Model name.
    pub model: String,
    /// Records in the window for this model.
    pub count: usize,
    pub correctness: f64,
    pub toxicity: f64,
    pub hallucination: f64,
    pub readability: f64,
    pub length: f64,
}
