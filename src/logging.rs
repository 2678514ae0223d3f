//! Logging and tracing setup for Judge Core.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset. HTTP client internals are capped at warn.
pub const DEFAULT_FILTER: &str = "judge_core=info,tower_http=info,reqwest=warn,hyper_util=warn";

/// Initialize the tracing subscriber with flattened JSON events.
///
/// Event fields (`model`, `elapsed_ms`, `marker`, ...) land at the top level
/// of each line instead of under a nested `fields` object.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_target(true),
        )
        .init();
}

/// Human-readable output captured by the test harness.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("judge_core=debug")
        .try_init();
}
