//! Tracing setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::EngineConfig;

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins over the configured level. Does nothing if a subscriber
/// is already installed.
pub fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let json = config.log_json.then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let text = (!config.log_json).then(|| tracing_subscriber::fmt::layer().with_target(true));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .try_init();
}
