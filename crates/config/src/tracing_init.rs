use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// The filter comes from `RUST_LOG`, then `LOG_LEVEL`, then the given
/// default. Safe to call once per process.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env("RUST_LOG")
        .or_else(|_| EnvFilter::try_from_env("LOG_LEVEL"))
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt().with_env_filter(filter).init();
}
