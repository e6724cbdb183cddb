use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use barman_observe::LogFormat;

const DEFAULT_LISTEN: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 61092);
const DEFAULT_TELEMETRY_PATH: &str = "/metrics";
const DEFAULT_BACKUP_LOG: &str = "/var/log/barman/backup.log";
const DEFAULT_WAL_LOG: &str = "/var/log/barman/wal.log";
const DEFAULT_TAIL_BYTES: u64 = 8192;
const DEFAULT_WAL_FAILURE_WINDOW_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Daemon configuration, populated from `BARMAN_EXPORTER_*` environment
/// variables. Defaults: port 61092, `/metrics`, one-hour WAL failure
/// window.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    pub listen_addr: SocketAddr,
    pub telemetry_path: String,
    pub backup_log: PathBuf,
    pub wal_log: PathBuf,
    pub tail_bytes: u64,
    pub wal_failure_window: Duration,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN,
            telemetry_path: DEFAULT_TELEMETRY_PATH.to_string(),
            backup_log: PathBuf::from(DEFAULT_BACKUP_LOG),
            wal_log: PathBuf::from(DEFAULT_WAL_LOG),
            tail_bytes: DEFAULT_TAIL_BYTES,
            wal_failure_window: Duration::from_secs(DEFAULT_WAL_FAILURE_WINDOW_SECS),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl ExporterConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from an arbitrary variable lookup. Lets tests feed
    /// values without touching the process environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();

        if let Some(value) = lookup("BARMAN_EXPORTER_LISTEN") {
            cfg.listen_addr = parse(&value, "BARMAN_EXPORTER_LISTEN")?;
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_TELEMETRY_PATH") {
            if !value.starts_with('/') {
                return Err(ConfigError::Invalid {
                    key: "BARMAN_EXPORTER_TELEMETRY_PATH",
                    value,
                });
            }
            cfg.telemetry_path = value;
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_BACKUP_LOG") {
            cfg.backup_log = PathBuf::from(value);
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_WAL_LOG") {
            cfg.wal_log = PathBuf::from(value);
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_TAIL_BYTES") {
            cfg.tail_bytes = parse(&value, "BARMAN_EXPORTER_TAIL_BYTES")?;
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_WAL_FAILURE_WINDOW_SECS") {
            let secs: u64 = parse(&value, "BARMAN_EXPORTER_WAL_FAILURE_WINDOW_SECS")?;
            cfg.wal_failure_window = Duration::from_secs(secs);
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_LOG_LEVEL") {
            cfg.log_level = value;
        }
        if let Some(value) = lookup("BARMAN_EXPORTER_LOG_FORMAT") {
            cfg.log_format = value.parse().map_err(|_| ConfigError::Invalid {
                key: "BARMAN_EXPORTER_LOG_FORMAT",
                value,
            })?;
        }

        Ok(cfg)
    }
}

fn parse<T: std::str::FromStr>(value: &str, key: &'static str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<ExporterConfig, ConfigError> {
        ExporterConfig::from_lookup(|key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
    }

    #[test]
    fn defaults_match_the_original_exporter() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.listen_addr.port(), 61092);
        assert_eq!(cfg.listen_addr.ip(), IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(cfg.telemetry_path, "/metrics");
        assert_eq!(cfg.wal_failure_window, Duration::from_secs(3600));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = from_pairs(&[
            ("BARMAN_EXPORTER_LISTEN", "127.0.0.1:9999"),
            ("BARMAN_EXPORTER_BACKUP_LOG", "/tmp/backup.log"),
            ("BARMAN_EXPORTER_TAIL_BYTES", "4096"),
            ("BARMAN_EXPORTER_WAL_FAILURE_WINDOW_SECS", "1800"),
            ("BARMAN_EXPORTER_LOG_FORMAT", "json"),
        ])
        .unwrap();
        assert_eq!(cfg.listen_addr.port(), 9999);
        assert_eq!(cfg.backup_log, PathBuf::from("/tmp/backup.log"));
        assert_eq!(cfg.tail_bytes, 4096);
        assert_eq!(cfg.wal_failure_window, Duration::from_secs(1800));
        assert_eq!(cfg.log_format, barman_observe::LogFormat::Json);
    }

    #[test]
    fn bad_number_is_a_typed_error() {
        let err = from_pairs(&[("BARMAN_EXPORTER_TAIL_BYTES", "lots")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "BARMAN_EXPORTER_TAIL_BYTES",
                ..
            }
        ));
    }

    #[test]
    fn telemetry_path_must_be_absolute() {
        let err = from_pairs(&[("BARMAN_EXPORTER_TELEMETRY_PATH", "metrics")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
