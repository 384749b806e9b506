//! Diagnostic tracing for gw.
//!
//! Diagnostics go to stderr so JSON on stdout stays machine-readable. They
//! are separate from the audit trail in `audit`, which is always written
//! (when enabled) regardless of `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`. Defaults to `warn`, or `debug` with `--verbose`.
///
/// ```bash
/// RUST_LOG=gw=trace gw git status
/// ```
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Filter used when `RUST_LOG` is unset
fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}
