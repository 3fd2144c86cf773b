//! Logging bootstrap.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages everywhere
//! - `RUST_LOG=waybill_engine=trace` - Trace the engine only
//! - Default: `info,waybill=debug,sqlx=warn`

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "info,waybill=debug,sqlx=warn";

/// Installs the global `fmt` subscriber, honouring `RUST_LOG`.
///
/// Returns `false` when a subscriber was already installed (e.g. by the
/// host application), in which case nothing changes.
pub fn init_tracing() -> bool {
    init_tracing_with(DEFAULT_FILTER)
}

/// Like [`init_tracing`] with a caller-chosen fallback filter.
pub fn init_tracing_with(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
