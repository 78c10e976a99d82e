use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber. `RUST_LOG` wins over the default level, which is
/// `debug` in development mode and `info` otherwise. Later calls are no-ops.
pub fn init_logging(development: bool) {
    let default_level = if development { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(development)
        .try_init();
}
