//! Tracing subscriber setup for hosts and tests.
//!
//! Installs a compact fmt subscriber filtered through `RUST_LOG`, guarded so
//! repeated calls (every test, every demo run) initialize at most once.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to "off" when unset.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("off"))
            .unwrap();

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(true).compact().with_target(true))
            .init();
    });
}
