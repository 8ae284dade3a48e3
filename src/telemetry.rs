//! Tracing setup for hosts and examples.
//!
//! The library itself only emits spans and events; installing a subscriber
//! is the host's choice. [`init_tracing`] is the one-call default for
//! binaries and integration tests that just want readable output.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a fmt subscriber filtered by `RUST_LOG`, defaulting to
/// `error,botflow=info` when the variable is unset or malformed.
///
/// Safe to call more than once; only the first call installs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("error,botflow=info"))
        .unwrap_or_default();

    let fmt_layer = fmt::layer().with_target(true);

    // try_init so a second call (parallel tests) is a no-op.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
