use tracing_subscriber::EnvFilter;

/// Installs the stderr subscriber. Stdout belongs to the bridge protocol, so nothing
/// log-shaped may ever go there.
pub fn init(log_level: &str) {
    // RUST_LOG wins over --log-level when both are present.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
