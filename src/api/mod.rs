//! HTTP API layer for Judge Core.
//!
//! Provides REST endpoints for generation, evaluation, analytics and feedback.

pub mod handlers;
mod routes;
mod types;

pub use routes::build_router;
