//! Storage layer for Judge Core.
//!
//! Process-lifetime, in-memory logs. Each store owns its own lock and is
//! shared with handlers through `AppState`.

mod analytics;
mod feedback;

pub use analytics::AnalyticsStore;
pub use feedback::FeedbackStore;
