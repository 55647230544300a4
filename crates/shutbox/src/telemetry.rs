//! Tracing setup for binaries embedding Shutbox.
//!
//! The library crates only emit `tracing` events; nothing is printed until
//! an application installs a subscriber.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a formatted subscriber filtered by `RUST_LOG`, defaulting to
/// `info`.
pub fn init() {
    init_with("info");
}

/// Like [`init`], with `default_filter` used when `RUST_LOG` is unset.
///
/// Calling it again after a subscriber is installed does nothing.
pub fn init_with(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
