//! Tracing initialization for binaries embedding the library.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, defaulting to debug
/// output for the library's own crates. Call once at process start.
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "arkivo=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
