use std::path::PathBuf;

use thiserror::Error;

use crate::sink::SinkError;

#[derive(Debug, Error)]
pub enum CollectError {
    /// The source log file is missing or unreadable. Source-local: the
    /// coordinator contains it, the other sources keep scraping.
    #[error("cannot read source file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tail window held zero rows that survived validation.
    #[error("no valid records in {path}")]
    NoRecords { path: PathBuf },

    /// The scrape was cancelled before this source finished.
    #[error("scrape cancelled")]
    Cancelled,

    /// The caller-supplied deadline elapsed before every task joined.
    #[error("scrape deadline exceeded after {elapsed_ms} ms")]
    DeadlineExceeded { elapsed_ms: u128 },

    /// Sink writes are the only failure that escapes the coordinator.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl CollectError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }
}
