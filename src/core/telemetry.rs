//! Log setup
//!
//! Installs a `tracing-subscriber` formatter for the binary.
//! Priority: `RUST_LOG` env var > `level` argument > "info".

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with the given default level.
///
/// Logs go to stderr so the transcript on stdout stays readable.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_telemetry(level: &str) {
    let default_filter = format!("warn,worldsmith={}", level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()
        .ok();
}
