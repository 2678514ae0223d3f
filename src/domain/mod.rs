//! Domain types for Judge Core.
//!
//! This module contains the core entities and value objects.

mod evaluation;
mod feedback;
mod generation;
mod metrics;

pub use evaluation::*;
pub use feedback::*;
pub use generation::*;
pub use metrics::*;
