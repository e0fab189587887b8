//! Structured logging setup for the bot binary.

use crate::error::{BotError, BotResult};
use foodbot_config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// File name prefix of the rolling log files.
pub const LOG_FILE_PREFIX: &str = "foodbot.log";

/// Builds the level filter, letting `RUST_LOG` take precedence.
pub fn env_filter(level: &str) -> BotResult<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| BotError::Logging(format!("invalid log filter {level:?}: {e}")))
}

/// Initialize the global tracing subscriber.
///
/// With `directory` set, output goes to a daily-rolling file through a
/// background writer; the returned guard must stay alive until shutdown or
/// buffered lines are lost.
pub fn init_logging(config: &LoggingConfig) -> BotResult<Option<WorkerGuard>> {
    let filter = env_filter(&config.level)?;

    let (writer, guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory)?;
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(non_blocking), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stdout), None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_writer(writer),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.directory.is_none())
                    .with_writer(writer),
            )
            .try_init()
    };
    result.map_err(|e| BotError::Logging(e.to_string()))?;

    Ok(guard)
}
