use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::{
    error::CollectError,
    metrics,
    record::{WalRecord, validate_wals},
    scrape::Scraper,
    sink::{MetricsSink, Sample},
    tail::read_tail,
    tsv::parse_records,
};

/// Scrapes the WAL-archive result log: latest-state samples keyed by
/// `bucket_name` plus the count of failures within the trailing window.
pub struct WalScraper {
    log_file: PathBuf,
    tail_bytes: u64,
    failure_window: Duration,
}

impl WalScraper {
    pub fn new(log_file: impl Into<PathBuf>, tail_bytes: u64, failure_window: Duration) -> Self {
        Self {
            log_file: log_file.into(),
            tail_bytes,
            failure_window,
        }
    }
}

#[async_trait]
impl Scraper for WalScraper {
    fn name(&self) -> &'static str {
        "barman_cloud_wal"
    }

    async fn scrape(&self, sink: &dyn MetricsSink) -> Result<(), CollectError> {
        let buf = read_tail(&self.log_file, self.tail_bytes).await?;
        let records = validate_wals(&parse_records(&buf));

        let latest = records.last().ok_or_else(|| CollectError::NoRecords {
            path: self.log_file.clone(),
        })?;

        let now = unix_now();
        let failed = failures_within(&records, self.failure_window, now);

        let labeled = |name: &'static str, value: f64| {
            Sample::new(name, value).with_label(metrics::LABEL_BUCKET, latest.bucket_name.clone())
        };

        sink.write(labeled(metrics::WAL_LATEST_BYTES, latest.size_bytes as f64))?;
        sink.write(labeled(metrics::WAL_LATEST_TIMESTAMP, latest.timestamp as f64))?;
        sink.write(labeled(
            metrics::WAL_LATEST_DURATION,
            latest.duration_seconds as f64,
        ))?;
        sink.write(labeled(metrics::WAL_FAILED_WINDOW, failed as f64))?;
        Ok(())
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Count records that failed within the trailing window ending at `now`.
///
/// The window boundary is inclusive: a record stamped exactly `now - window`
/// still counts. Pure reduction, so record order cannot affect the result.
fn failures_within(records: &[WalRecord], window: Duration, now: i64) -> usize {
    let cutoff = now - window.as_secs() as i64;
    records
        .iter()
        .filter(|r| !r.success && r.timestamp >= cutoff)
        .count()
}
