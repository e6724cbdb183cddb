//! Collection pipeline for the barman-cloud exporter.
//!
//! The barman-cloud hook scripts append one tab-separated status line per
//! completed backup or WAL-archive operation to growing log files. On each
//! scrape this crate reads only the tail of those files, parses the rows,
//! derives latest-known state plus a trailing failure window, and hands the
//! results to a [`MetricsSink`].
//!
//! Pipeline, per configured source:
//!
//! ```text
//! read_tail -> parse_records -> validate_* -> Scraper::scrape -> MetricsSink
//! ```
//!
//! [`Exporter`] fans the configured scrapers out concurrently, joins them,
//! and reduces their outcomes into the `barman_cloud_up` liveness sample.
//! Nothing is cached between scrapes; every scrape re-derives its samples
//! from the current file tail.
//!
//! This crate does NOT encode or serve metrics. Sink backends live in
//! separate crates (see `barman-prometheus`).

pub mod error;
pub mod exporter;
pub mod metrics;
pub mod record;
pub mod scrape;
pub mod sink;
pub mod tail;
pub mod tsv;

pub use error::CollectError;
pub use exporter::{Exporter, ScrapeOutcome};
pub use record::{BackupRecord, WalRecord};
pub use scrape::{BackupScraper, Scraper, WalScraper};
pub use sink::{MetricsSink, Sample, SinkError, VecSink};
