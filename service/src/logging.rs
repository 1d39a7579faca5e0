//! Log output for the service binary.
//!
//! Records go to stderr, or to a file when one is configured. The
//! `RUST_LOG` environment variable takes precedence over the configured
//! level:
//!
//! ```bash
//! RUST_LOG=dirmail_notifier=debug,info dirmail --config config.toml
//! ```

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;
use crate::error::{Result, ServiceError};

/// Install the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and closes the log file.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let (file_layer, guard) = match &config.file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let file_name = path.file_name().ok_or_else(|| {
                ServiceError::Configuration(format!("log file has no name: {}", path.display()))
            })?;

            std::fs::create_dir_all(directory).map_err(|e| {
                ServiceError::Configuration(format!(
                    "cannot create log directory {}: {e}",
                    directory.display()
                ))
            })?;

            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = file_layer
        .is_none()
        .then(|| fmt::layer().with_writer(std::io::stderr).with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ServiceError::Configuration(format!("logging already initialized: {e}")))?;

    Ok(guard)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        return Ok(EnvFilter::from_default_env());
    }

    EnvFilter::try_new(&config.level).map_err(|e| {
        ServiceError::Configuration(format!("invalid log level {:?}: {e}", config.level))
    })
}
