//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, LogFormat};

/// Filter directive for the configured level and `-v` verbosity.
///
/// Verbosity follows the klog convention: debug details are logged at
/// `-v 3`, so 3 and 4 mean `debug` and 5 or more means `trace`.
pub fn filter_directive(log_level: &str, verbosity: u8) -> String {
    match verbosity {
        0..=2 => log_level.to_string(),
        3..=4 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence when set.
pub fn init(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter_directive(&config.log_level, config.verbosity).into());

    match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}
