//! Logging initialization.
//!
//! Diagnostics go to stderr so command output on stdout stays clean. The
//! filter comes from `RUST_LOG` and defaults to `info`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber: JSON lines when `json` is set, otherwise
/// human-readable and coloured output. A second call is a no-op.
pub fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
