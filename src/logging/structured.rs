//! Structured logging setup using tracing
//!
//! Console output is always on; when file logging is enabled a second
//! JSON layer writes rotated log files under the configured directory.
//! Both layers honor `RUST_LOG` when set.
//!
//! # Example
//!
//! ```no_run
//! use courier::logging::init_logging;
//! use courier::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{CourierError, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Keeps the file-appender worker alive; dropping it flushes buffered logs
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the logging system
///
/// Returns a [`LoggingGuard`] the caller must hold for the life of the
/// process so file logs are flushed on exit.
///
/// # Errors
///
/// Fails when `log_level_str` is not a known level or the log directory
/// cannot be created.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("courier={}", log_level)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(env_filter.clone());
    let mut layers = vec![console_layer.boxed()];

    let file_guard = if config.local_enabled {
        let (layer, guard) = file_layer(config, env_filter)?;
        layers.push(layer);
        Some(guard)
    } else {
        None
    };

    tracing_subscriber::registry().with(layers).init();

    tracing::info!(
        local_enabled = config.local_enabled,
        local_path = %config.local_path,
        "Logging initialized"
    );

    Ok(LoggingGuard { _file_guard: file_guard })
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

fn file_layer(config: &LoggingConfig, filter: EnvFilter) -> Result<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(&config.local_path).map_err(|e| {
        CourierError::Configuration(format!(
            "Failed to create log directory {}: {}",
            config.local_path, e
        ))
    })?;

    let appender = RollingFileAppender::new(
        rotation_from(&config.local_rotation),
        &config.local_path,
        "courier.log",
    );
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_thread_ids(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();
    Ok((layer, guard))
}

// Both accepted strategies rotate daily: the appender has no size-based
// rotation, so "size" degrades to the daily bound.
fn rotation_from(_name: &str) -> Rotation {
    Rotation::DAILY
}

fn parse_log_level(level_str: &str) -> Result<Level> {
    level_str.to_lowercase().parse().map_err(|_| {
        CourierError::Configuration(format!(
            "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
            level_str
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("Error").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_parse_log_level_invalid() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn test_rotation_from() {
        assert_eq!(rotation_from("daily"), Rotation::DAILY);
        assert_eq!(rotation_from("size"), Rotation::DAILY);
    }

    #[test]
    fn test_file_layer_creates_log_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config = LoggingConfig {
            local_enabled: true,
            local_path: temp_dir
                .path()
                .join("logs")
                .to_string_lossy()
                .to_string(),
            local_rotation: "daily".to_string(),
            local_max_size_mb: 100,
        };

        let (_layer, _guard) = file_layer(&config, EnvFilter::new("courier=info")).unwrap();
        assert!(temp_dir.path().join("logs").is_dir());
    }
}
