use std::path::PathBuf;

use async_trait::async_trait;

use crate::{
    error::CollectError,
    metrics,
    record::{BackupRecord, validate_backups},
    scrape::Scraper,
    sink::{MetricsSink, Sample},
    tail::read_tail,
    tsv::parse_records,
};

/// Scrapes the backup result log and emits latest-state samples keyed by
/// `(bucket_name, backup_id)`.
pub struct BackupScraper {
    log_file: PathBuf,
    tail_bytes: u64,
}

impl BackupScraper {
    pub fn new(log_file: impl Into<PathBuf>, tail_bytes: u64) -> Self {
        Self {
            log_file: log_file.into(),
            tail_bytes,
        }
    }
}

#[async_trait]
impl Scraper for BackupScraper {
    fn name(&self) -> &'static str {
        "barman_cloud_backup"
    }

    async fn scrape(&self, sink: &dyn MetricsSink) -> Result<(), CollectError> {
        let buf = read_tail(&self.log_file, self.tail_bytes).await?;
        let records = validate_backups(&parse_records(&buf));

        // Latest means the last record that survived validation, not the
        // last line in the file: a malformed trailing line must not shadow
        // the last good record.
        let latest = records.last().ok_or_else(|| CollectError::NoRecords {
            path: self.log_file.clone(),
        })?;

        emit_latest(latest, sink)
    }
}

fn emit_latest(latest: &BackupRecord, sink: &dyn MetricsSink) -> Result<(), CollectError> {
    let labeled = |name: &'static str, value: f64| {
        Sample::new(name, value)
            .with_label(metrics::LABEL_BUCKET, latest.bucket_name.clone())
            .with_label(metrics::LABEL_BACKUP_ID, latest.backup_id.clone())
    };

    sink.write(labeled(metrics::BACKUP_LATEST_BYTES, latest.size_bytes as f64))?;
    sink.write(labeled(metrics::BACKUP_LATEST_TIMESTAMP, latest.timestamp as f64))?;
    sink.write(labeled(
        metrics::BACKUP_LATEST_DURATION,
        latest.duration_seconds as f64,
    ))?;
    sink.write(labeled(
        metrics::BACKUP_LATEST_SUCCESS,
        if latest.success { 1.0 } else { 0.0 },
    ))?;
    Ok(())
}
