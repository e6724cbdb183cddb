//! `tracing` setup for the exporter binaries.
//!
//! One call to [`init_logger`] installs the global subscriber: an
//! `EnvFilter` built from the configured level directive plus a fmt layer
//! in either human-readable text or JSON, both stamped with RFC 3339
//! timestamps in the local offset when it can be determined.

use std::str::FromStr;

use thiserror::Error;
use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(LogError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// An `EnvFilter` directive, e.g. `info` or `barman_collect=debug`.
    pub level: String,
    pub with_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            with_targets: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("invalid log format: {0} (expected text|json)")]
    InvalidFormat(String),
    #[error("invalid log level directive: {0}")]
    InvalidLevel(String),
    #[error("failed to initialize logger: {0}")]
    Init(String),
}

/// Install the global subscriber. Fails if one is already set.
pub fn init_logger(cfg: &LogConfig) -> Result<(), LogError> {
    let filter =
        EnvFilter::try_new(&cfg.level).map_err(|_| LogError::InvalidLevel(cfg.level.clone()))?;
    let timer = OffsetTime::new(
        UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        Rfc3339,
    );

    match cfg.format {
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_target(cfg.with_targets)
                .with_timer(timer);
            init_with(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(timer);
            init_with(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

fn init_with<S>(subscriber: S) -> Result<(), LogError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))
}
