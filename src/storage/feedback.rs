//! Feedback store: human ratings and comments, kept per model in append order.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::domain::{FeedbackEntry, FeedbackSubmission};
use crate::error::{JudgeError, JudgeResult};

#[derive(Debug, Default)]
pub struct FeedbackStore {
    entries: RwLock<HashMap<String, Vec<FeedbackEntry>>>,
}

impl FeedbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission.
    ///
    /// Submissions without a model or a non-zero rating are dropped without
    /// error; the returned entry is `None` in that case.
    pub fn record(&self, submission: FeedbackSubmission) -> JudgeResult<Option<FeedbackEntry>> {
        let Some(entry) = submission.into_entry(Utc::now()) else {
            tracing::debug!("Feedback dropped: missing model or rating");
            return Ok(None);
        };

        self.entries
            .write()
            .map_err(|e| JudgeError::Storage(format!("feedback log unavailable: {}", e)))?
            .entry(entry.model.clone())
            .or_default()
            .push(entry.clone());

        tracing::debug!(model = %entry.model, rating = entry.rating, "Feedback stored");
        Ok(Some(entry))
    }

    /// Every entry for `model`, oldest first.
    pub fn list(&self, model: &str) -> JudgeResult<Vec<FeedbackEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|e| JudgeError::Storage(format!("feedback log unavailable: {}", e)))?;
        Ok(entries.get(model).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submit(model: Option<&str>, rating: Option<f64>, comment: Option<&str>) -> FeedbackSubmission {
        FeedbackSubmission {
            model: model.map(str::to_string),
            rating,
            comment: comment.map(str::to_string),
        }
    }

    #[test]
    fn test_record_then_list() {
        let store = FeedbackStore::new();
        store.record(submit(Some("A"), Some(5.0), None)).unwrap();

        let entries = store.list("A").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rating, 5.0);
        assert_eq!(entries[0].comment, "");
    }

    #[test]
    fn test_missing_rating_leaves_list_unchanged() {
        let store = FeedbackStore::new();
        store.record(submit(Some("A"), Some(4.0), None)).unwrap();

        let stored = store.record(submit(Some("A"), None, Some("no stars"))).unwrap();
        assert!(stored.is_none());
        assert_eq!(store.list("A").unwrap().len(), 1);
    }

    #[test]
    fn test_list_preserves_append_order() {
        let store = FeedbackStore::new();
        for (rating, comment) in [(1.0, "first"), (3.0, "second"), (5.0, "third")] {
            store
                .record(submit(Some("A"), Some(rating), Some(comment)))
                .unwrap();
        }
        store.record(submit(Some("B"), Some(2.0), None)).unwrap();

        let comments: Vec<_> = store
            .list("A")
            .unwrap()
            .into_iter()
            .map(|e| e.comment)
            .collect();
        assert_eq!(comments, vec!["first", "second", "third"]);
        assert_eq!(store.list("B").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_model_lists_nothing() {
        let store = FeedbackStore::new();
        assert!(store.list("nobody").unwrap().is_empty());
    }
}
