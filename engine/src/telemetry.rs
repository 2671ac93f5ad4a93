//! Telemetry and observability
//!
//! Sets up `tracing-subscriber` for structured logging. The `RUST_LOG`
//! environment variable wins over any explicit level; in debug builds output
//! is pretty-printed for terminals, in release builds it is JSON for the CI
//! log collector.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Priority: `RUST_LOG` env var > `level` argument > default "info".
pub fn init(level: Option<&str>) {
    let level = level.unwrap_or("info");
    let default_filter = format!("{level},reviewbot_engine={level}");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty().with_target(false))
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}
