//! Analytics store: the append-only evaluation log and its rolling-window summaries.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::domain::{AnalyticsSummary, EvaluationRecord, MetricScores, NewEvaluation, TimeRange};
use crate::error::{JudgeError, JudgeResult};

/// Running sum and sample count for one metric.
#[derive(Debug, Default, Clone, Copy)]
struct Mean {
    sum: f64,
    samples: usize,
}

impl Mean {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.samples += 1;
        }
    }

    fn value(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / self.samples as f64
        }
    }
}

/// Per-model accumulator used while summarizing.
#[derive(Debug, Default)]
struct SummaryBuilder {
    count: usize,
    correctness: Mean,
    toxicity: Mean,
    hallucination: Mean,
    readability: Mean,
    length: Mean,
}

impl SummaryBuilder {
    fn add(&mut self, scores: &MetricScores) {
        self.count += 1;
        self.correctness.add(scores.correctness);
        self.toxicity.add(scores.toxicity);
        self.hallucination.add(scores.hallucination);
        self.readability.add(scores.readability);
        self.length.add(scores.length);
    }

    fn build(self, model: String) -> AnalyticsSummary {
        AnalyticsSummary {
            model,
            count: self.count,
            correctness: self.correctness.value(),
            toxicity: self.toxicity.value(),
            hallucination: self.hallucination.value(),
            readability: self.readability.value(),
            length: self.length.value(),
        }
    }
}

/// Append-only log of evaluation records.
///
/// Records are never removed; windows are applied at read time.
#[derive(Debug, Default)]
pub struct AnalyticsStore {
    records: RwLock<Vec<EvaluationRecord>>,
}

impl AnalyticsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp `new` with the current time and append it.
    pub fn append(&self, new: NewEvaluation) -> JudgeResult<EvaluationRecord> {
        self.append_at(new, Utc::now())
    }

    /// Append `new` stamped with `timestamp`.
    pub fn append_at(
        &self,
        new: NewEvaluation,
        timestamp: DateTime<Utc>,
    ) -> JudgeResult<EvaluationRecord> {
        if new.model.trim().is_empty() {
            return Err(JudgeError::BadRequest(
                "evaluation record requires a model".to_string(),
            ));
        }

        let record = EvaluationRecord::stamp(new, timestamp);
        self.records
            .write()
            .map_err(|e| JudgeError::Storage(format!("evaluation log unavailable: {}", e)))?
            .push(record.clone());

        tracing::debug!(
            record_id = %record.id,
            model = %record.model,
            "Evaluation appended"
        );

        Ok(record)
    }

    /// Number of records in the log.
    pub fn record_count(&self) -> JudgeResult<usize> {
        Ok(self.read()?.len())
    }

    /// Per-model summaries over the window ending now.
    pub fn summarize(&self, window: TimeRange) -> JudgeResult<BTreeMap<String, AnalyticsSummary>> {
        self.summarize_at(window, Utc::now())
    }

    /// Per-model summaries over the window ending at `now`.
    pub fn summarize_at(
        &self,
        window: TimeRange,
        now: DateTime<Utc>,
    ) -> JudgeResult<BTreeMap<String, AnalyticsSummary>> {
        let cutoff = window.start_time(now);
        let mut builders: BTreeMap<String, SummaryBuilder> = BTreeMap::new();

        for record in self.read()?.iter().filter(|r| r.timestamp >= cutoff) {
            builders
                .entry(record.model.clone())
                .or_default()
                .add(&record.scores);
        }

        Ok(builders
            .into_iter()
            .map(|(model, builder)| (model.clone(), builder.build(model)))
            .collect())
    }

    /// Summary for one model, or `None` if it has no records in the window.
    pub fn summarize_one(
        &self,
        model: &str,
        window: TimeRange,
    ) -> JudgeResult<Option<AnalyticsSummary>> {
        self.summarize_one_at(model, window, Utc::now())
    }

    pub fn summarize_one_at(
        &self,
        model: &str,
        window: TimeRange,
        now: DateTime<Utc>,
    ) -> JudgeResult<Option<AnalyticsSummary>> {
        let cutoff = window.start_time(now);
        let mut builder = SummaryBuilder::default();

        for record in self
            .read()?
            .iter()
            .filter(|r| r.model == model && r.timestamp >= cutoff)
        {
            builder.add(&record.scores);
        }

        Ok((builder.count > 0).then(|| builder.build(model.to_string())))
    }

    fn read(&self) -> JudgeResult<std::sync::RwLockReadGuard<'_, Vec<EvaluationRecord>>> {
        self.records
            .read()
            .map_err(|e| JudgeError::Storage(format!("evaluation log unavailable: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn scores(correctness: Option<f64>, toxicity: Option<f64>) -> MetricScores {
        MetricScores {
            correctness,
            toxicity,
            ..Default::default()
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_rolling_mean_over_window() {
        let store = AnalyticsStore::new();
        let t0 = Utc::now();
        store
            .append_at(NewEvaluation::new("A", scores(Some(0.9), Some(0.1))), t0)
            .unwrap();
        store
            .append_at(
                NewEvaluation::new("A", scores(Some(0.5), Some(0.3))),
                t0 + Duration::hours(1),
            )
            .unwrap();

        let summaries = store
            .summarize_at(TimeRange::Last24h, t0 + Duration::hours(2))
            .unwrap();
        let summary = &summaries["A"];

        assert_eq!(summary.count, 2);
        assert!(close(summary.correctness, 0.7));
        assert!(close(summary.toxicity, 0.2));
        assert_eq!(summary.hallucination, 0.0);
        assert_eq!(summary.readability, 0.0);
    }

    #[test]
    fn test_old_records_excluded() {
        let store = AnalyticsStore::new();
        let now = Utc::now();
        store
            .append_at(
                NewEvaluation::new("A", scores(Some(0.1), None)),
                now - Duration::hours(25),
            )
            .unwrap();
        store
            .append_at(NewEvaluation::new("A", scores(Some(0.8), None)), now)
            .unwrap();

        let summaries = store.summarize_at(TimeRange::Last24h, now).unwrap();
        assert_eq!(summaries["A"].count, 1);
        assert!(close(summaries["A"].correctness, 0.8));

        // The window is a read-time filter: a wider window still sees it.
        let wide = store.summarize_at(TimeRange::Last7d, now).unwrap();
        assert_eq!(wide["A"].count, 2);
        assert_eq!(store.record_count().unwrap(), 2);
    }

    #[test]
    fn test_nulls_excluded_from_mean() {
        let store = AnalyticsStore::new();
        store
            .append(NewEvaluation::new("A", scores(Some(0.6), Some(0.2))))
            .unwrap();
        store
            .append(NewEvaluation::new("A", scores(None, Some(0.4))))
            .unwrap();

        let summary = store.summarize_one("A", TimeRange::Last24h).unwrap().unwrap();
        assert_eq!(summary.count, 2);
        assert!(close(summary.correctness, 0.6));
        assert!(close(summary.toxicity, 0.3));
    }

    #[test]
    fn test_empty_log_summaries() {
        let store = AnalyticsStore::new();
        assert!(store.summarize(TimeRange::Last24h).unwrap().is_empty());
        assert_eq!(store.summarize_one("fresh", TimeRange::Last24h).unwrap(), None);
    }

    #[test]
    fn test_models_grouped_separately() {
        let store = AnalyticsStore::new();
        store
            .append(NewEvaluation::new("A", scores(Some(1.0), None)))
            .unwrap();
        store
            .append(NewEvaluation::new("B", scores(Some(0.0), None)))
            .unwrap();

        let summaries = store.summarize(TimeRange::Last24h).unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries["A"].correctness, 1.0);
        assert_eq!(summaries["B"].correctness, 0.0);
        assert_eq!(summaries["B"].model, "B");
    }

    #[test]
    fn test_append_requires_model() {
        let store = AnalyticsStore::new();
        let result = store.append(NewEvaluation::new("  ", MetricScores::default()));
        assert!(matches!(result, Err(JudgeError::BadRequest(_))));
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_timestamp_assigned_by_store() {
        let store = AnalyticsStore::new();
        let before = Utc::now();
        let record = store
            .append(NewEvaluation::new("A", MetricScores::default()))
            .unwrap();
        assert!(record.timestamp >= before);
        assert!(record.timestamp <= Utc::now());
    }

    #[test]
    fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(AnalyticsStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .append(NewEvaluation::new(
                                format!("model-{}", i % 2),
                                scores(Some(0.5), None),
                            ))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.record_count().unwrap(), 400);
        let summaries = store.summarize(TimeRange::Last24h).unwrap();
        assert_eq!(summaries["model-0"].count, 200);
        assert_eq!(summaries["model-1"].count, 200);
    }
}
