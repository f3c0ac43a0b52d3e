//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. Logs go to stderr so they
//! never interleave with rendered output on stdout.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter used when `RUST_LOG` is unset.
pub fn default_filter(log_level: &str) -> String {
    format!("guestbook_client={log_level},guestbook={log_level},warn")
}

/// Initialize the global tracing subscriber. Safe to call once per process.
pub fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialized: {}", e);
    }
}
