// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Sets up the logging framework using tracing_subscriber.
/// `RUST_LOG` wins when set; otherwise `level` (the `--log-level` flag) is used.
pub fn setup_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive_for(level)));

    fmt().with_env_filter(filter).with_target(true).init();

    tracing::debug!("Logging setup complete.");
}

/// Maps the operator-facing level names (DEBUG, INFO, WARNING, ERROR) onto
/// tracing directives. Unknown names fall back to "info".
fn directive_for(level: &str) -> &'static str {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" => "trace",
        "DEBUG" => "debug",
        "WARNING" | "WARN" => "warn",
        "ERROR" | "CRITICAL" => "error",
        _ => "info",
    }
}
