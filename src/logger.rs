use std::sync::Arc;
use std::time::Duration;

use spdlog::sink::{RotatingFileSink, RotationPolicy, Sink, StdStream, StdStreamSink};
use spdlog::{Level, LevelFilter, Logger};

use crate::config::{Log, LogLevel};

impl From<LogLevel> for Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Critical => Level::Critical,
            LogLevel::Error => Level::Error,
            LogLevel::Warn => Level::Warn,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
            LogLevel::Trace => Level::Trace,
        }
    }
}

fn console_sinks() -> spdlog::Result<Vec<Arc<dyn Sink>>> {
    // Everything below Warn goes to stdout, Warn and up to stderr
    let stdout = StdStreamSink::builder()
        .std_stream(StdStream::Stdout)
        .level_filter(LevelFilter::MoreVerbose(Level::Warn))
        .build()?;

    let stderr = StdStreamSink::builder()
        .std_stream(StdStream::Stderr)
        .level_filter(LevelFilter::MoreSevereEqual(Level::Warn))
        .build()?;

    Ok(vec![Arc::new(stdout), Arc::new(stderr)])
}

/// Installs the default logger: a daily rotating file plus, when enabled,
/// the console pair. No-op when the `[log]` table is absent.
pub fn configure_logger(log: &Log) -> spdlog::Result<()> {
    let mut sinks: Vec<Arc<dyn Sink>> = vec![];

    let file_sink = RotatingFileSink::builder()
        .base_path(log.location.as_ref().unwrap())
        .rotation_policy(RotationPolicy::Daily { hour: 0, minute: 0 })
        .max_files(60)
        .rotate_on_open(false)
        .build()?;
    sinks.push(Arc::new(file_sink));

    if log.log_to_console {
        sinks.extend(console_sinks()?);
    }

    let logger = Arc::new(Logger::builder().sinks(sinks).build()?);
    logger.set_level_filter(LevelFilter::MoreSevereEqual(log.level.into()));
    logger.set_flush_level_filter(LevelFilter::MoreSevereEqual(Level::Info));
    logger.set_flush_period(Some(Duration::from_secs(2)));

    spdlog::set_default_logger(logger);

    Ok(())
}
