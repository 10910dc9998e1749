use tracing_subscriber::EnvFilter;

/// Log filter env var; falls back to `RUST_LOG`.
const LOG_ENV: &str = "OPENQA_SERIAL_LOG";

/// Diagnostics go to stderr so they never mix with the rendered transcript.
pub fn init() {
    // OPENQA_SERIAL_LOG=oqs_transcript=trace
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();
}
