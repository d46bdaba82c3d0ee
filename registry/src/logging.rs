//! Diagnostic tracing for the registry.
//!
//! # Separation of Concerns
//!
//! - **Tracing (this module)**: Diagnostics via `RUST_LOG`, output to stderr.
//!   Not persisted, never part of command output.
//!
//! - **Offense audit log (`io/offense_log`)**: Product artifact in
//!   `demerits.txt`. Always written, unaffected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset or unparseable. Rejections and
/// accepted operations log at `info`, so they stay quiet by default.
pub const DEFAULT_FILTER: &str = "warn";

fn registry_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the stderr subscriber. Call once, from the binary.
///
/// ```bash
/// RUST_LOG=registry=info registry demerit 23AB$%12XY --date 01-01-2026 --points 3
/// ```
pub fn init() {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    tracing_subscriber::registry()
        .with(registry_filter())
        .with(layer)
        .init();
}
