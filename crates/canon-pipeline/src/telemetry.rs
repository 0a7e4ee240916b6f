//! Tracing setup for hosts embedding the pipeline

use tracing_subscriber::{fmt, EnvFilter};

/// Install a stderr fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_directive` (for example `"canon=info"`) when
/// `RUST_LOG` is unset or invalid. Returns false if a global subscriber was
/// already installed; calling this more than once is harmless.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
