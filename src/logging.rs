use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize structured JSON logging with tracing.
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging() {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .json() // JSON output for structured logging
        );

    if tracing::subscriber::set_global_default(subscriber).is_ok() {
        tracing::info!("Structured logging initialized");
    }
}

/// Human-readable logging on stderr for the interactive CLI.
/// Defaults to `warn` so log lines don't interleave with the hints.
pub fn init_logging_pretty() {
    let subscriber = tracing_subscriber::registry()
        .with(env_filter("warn"))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr));

    let _ = tracing::subscriber::set_global_default(subscriber);
}
