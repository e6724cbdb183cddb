mod backup;
mod wal;

pub use backup::BackupScraper;
pub use wal::WalScraper;

use async_trait::async_trait;

use crate::{error::CollectError, sink::MetricsSink};

/// One configured origin of status records, backed by its own log file.
///
/// A scraper owns its whole pipeline run: tail read, parse, validate,
/// aggregate, emit. It writes samples to the sink as they are produced and
/// returns a source-local error when the file is unreadable or held no
/// valid records; the coordinator decides containment.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Stable identifier used in logs and failure reporting.
    fn name(&self) -> &'static str;

    async fn scrape(&self, sink: &dyn MetricsSink) -> Result<(), CollectError>;
}
