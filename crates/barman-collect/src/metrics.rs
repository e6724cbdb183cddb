//! The exporter's metric descriptor table.
//!
//! One immutable set of (name, help, label names) entries, built at compile
//! time and consulted by sink backends when they register their series.
//! Scrapers refer to metrics through the name constants so a typo fails at
//! the sink with an [`UnknownMetric`](crate::sink::SinkError::UnknownMetric)
//! error rather than silently creating a new series.

/// Describes one exported metric. All exporter metrics are gauges.
#[derive(Debug, Clone, Copy)]
pub struct Descriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

pub const BACKUP_LATEST_BYTES: &str = "barman_cloud_backup_latest_bytes";
pub const BACKUP_LATEST_TIMESTAMP: &str = "barman_cloud_backup_latest_timestamp_seconds";
pub const BACKUP_LATEST_DURATION: &str = "barman_cloud_backup_latest_processed_duration";
pub const BACKUP_LATEST_SUCCESS: &str = "barman_cloud_backup_latest_success";

pub const WAL_LATEST_BYTES: &str = "barman_cloud_wal_latest_bytes";
pub const WAL_LATEST_TIMESTAMP: &str = "barman_cloud_wal_latest_timestamp_seconds";
pub const WAL_LATEST_DURATION: &str = "barman_cloud_wal_latest_processed_duration";
pub const WAL_FAILED_WINDOW: &str = "barman_cloud_wal_failed_last_hour_total";

pub const UP: &str = "barman_cloud_up";
pub const SCRAPE_DURATION: &str = "barman_cloud_scrape_duration_seconds";

pub const LABEL_BUCKET: &str = "bucket_name";
pub const LABEL_BACKUP_ID: &str = "backup_id";

const BACKUP_LABELS: &[&str] = &[LABEL_BUCKET, LABEL_BACKUP_ID];
const WAL_LABELS: &[&str] = &[LABEL_BUCKET];
const NO_LABELS: &[&str] = &[];

static DESCRIPTORS: [Descriptor; 10] = [
    Descriptor {
        name: BACKUP_LATEST_BYTES,
        help: "Latest backup size in bytes",
        labels: BACKUP_LABELS,
    },
    Descriptor {
        name: BACKUP_LATEST_TIMESTAMP,
        help: "Latest backup performed at timestamp",
        labels: BACKUP_LABELS,
    },
    Descriptor {
        name: BACKUP_LATEST_DURATION,
        help: "Latest backup duration in seconds",
        labels: BACKUP_LABELS,
    },
    Descriptor {
        name: BACKUP_LATEST_SUCCESS,
        help: "Latest backup successful (1) or not (0)",
        labels: BACKUP_LABELS,
    },
    Descriptor {
        name: WAL_LATEST_BYTES,
        help: "Latest WAL size in bytes",
        labels: WAL_LABELS,
    },
    Descriptor {
        name: WAL_LATEST_TIMESTAMP,
        help: "Latest WAL processed at timestamp",
        labels: WAL_LABELS,
    },
    Descriptor {
        name: WAL_LATEST_DURATION,
        help: "Latest WAL process duration in seconds",
        labels: WAL_LABELS,
    },
    Descriptor {
        name: WAL_FAILED_WINDOW,
        help: "Number of WAL archives that failed within the trailing failure window",
        labels: WAL_LABELS,
    },
    Descriptor {
        name: UP,
        help: "Whether the last collection completed without any source failing",
        labels: NO_LABELS,
    },
    Descriptor {
        name: SCRAPE_DURATION,
        help: "Duration of the last collection in seconds",
        labels: NO_LABELS,
    },
];

/// The full descriptor set, in registration order.
pub fn descriptors() -> &'static [Descriptor] {
    &DESCRIPTORS
}
