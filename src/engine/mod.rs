//! Evaluation engine for Judge Core.
//!
//! This module contains the generation and scoring pipeline:
//! - Backends: hosted LLMs queried with the user's prompt
//! - Orchestrator: concurrent fan-out with per-backend failure isolation
//! - Metric sources: embedding encoder and toxicity classifier
//! - Readability: built-in reading-ease scorer
//! - Evaluator: turns responses into normalized metric scores

mod backend;
mod evaluator;
mod http;
mod orchestrator;
mod readability;
mod sources;

pub use backend::*;
pub use evaluator::*;
pub use http::*;
pub use orchestrator::*;
pub use readability::*;
pub use sources::*;
