use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global tracing subscriber. Filter comes from `RUST_LOG`,
/// defaulting to `info`. Later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init();

    if result.is_ok() {
        tracing::debug!("Logging initialized");
    }
}
