//! Tracing setup.

/// Initialize the tracing subscriber with environment filter support.
///
/// Logs at INFO and above by default; control the level with `RUST_LOG`
/// (e.g. `RUST_LOG=tourncal_core::sync=debug`). Output goes to stderr so
/// the summary reports on stdout stay clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
