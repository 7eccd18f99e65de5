//! Logging initialization

/// Install a stderr fmt subscriber
///
/// `RUST_LOG` wins over `default_filter`. Calling this twice is harmless;
/// the second subscriber is simply not installed.
pub fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
