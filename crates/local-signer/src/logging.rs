use tracing::level_filters::LevelFilter;
use tracing_subscriber::{Layer, filter::EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives, e.g. `notation_local_signer=debug`.
pub const LOG_ENV: &str = "NOTATION_PLUGIN_LOG";
/// `json` selects JSON lines; anything else the compact format.
pub const LOG_FORMAT_ENV: &str = "NOTATION_PLUGIN_LOG_FORMAT";

/// Installs the global subscriber, writing to stderr.
///
/// Off unless [`LOG_ENV`] is set: the host parses stderr as an error
/// document when the plugin fails.
pub fn init() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_default();

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .without_time()
            .with_writer(std::io::stderr)
            .with_filter(env_filter)
            .boxed(),
    };

    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::registry().with(log_layer).try_init();
}
