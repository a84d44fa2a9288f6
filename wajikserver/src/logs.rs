// logs.rs
use tracing::Level;
use tracing_subscriber::{
    Registry, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};
use wajikconfig::Config;

/// Logging options
#[derive(Debug, Clone)]
pub struct LoggingOptions {
    /// Events below this level are dropped
    pub min_level: Level,
    /// Write events to stderr
    pub enable_console: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            min_level: Level::INFO,
            enable_console: true,
        }
    }
}

impl LoggingOptions {
    /// Reads `host.logger.*` from the configuration
    pub fn from_config(config: &Config) -> Self {
        let min_level = config
            .get_log_min_level()
            .ok()
            .and_then(|l| string_to_level(&l))
            .unwrap_or(Level::INFO);

        let enable_console = config.get_log_enable_console().unwrap_or(true);

        Self {
            min_level,
            enable_console,
        }
    }
}

/// Installs the global `tracing` subscriber
///
/// Must be called once, before the first event is emitted.
///
/// ```rust,no_run
/// use wajikserver::logs::{init_logging, LoggingOptions};
///
/// init_logging(LoggingOptions {
///     min_level: tracing::Level::DEBUG,
///     enable_console: true,
/// });
/// ```
pub fn init_logging(options: LoggingOptions) {
    let subscriber = Registry::default().with(LevelFilter::from_level(options.min_level));

    if options.enable_console {
        subscriber
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true),
            )
            .init();
    } else {
        subscriber.init();
    }
}

pub fn string_to_level(s: &str) -> Option<Level> {
    match s.trim().to_uppercase().as_str() {
        "ERROR" => Some(Level::ERROR),
        "WARN" => Some(Level::WARN),
        "INFO" => Some(Level::INFO),
        "DEBUG" => Some(Level::DEBUG),
        "TRACE" => Some(Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_to_level() {
        assert_eq!(string_to_level("debug"), Some(Level::DEBUG));
        assert_eq!(string_to_level(" WARN "), Some(Level::WARN));
        assert_eq!(string_to_level("verbose"), None);
    }

    #[test]
    fn test_options_default_to_info_on_console() {
        let options = LoggingOptions::default();
        assert_eq!(options.min_level, Level::INFO);
        assert!(options.enable_console);
    }
}
