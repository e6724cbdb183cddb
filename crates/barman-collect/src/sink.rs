use std::sync::Mutex;

use thiserror::Error;

/// One emitted (name, label-set, value) triple.
///
/// Label values are carried as pairs; backends resolve them against the
/// label names declared in [`crate::metrics`], so emission order does not
/// have to match registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub name: &'static str,
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl Sample {
    pub fn new(name: &'static str, value: f64) -> Self {
        Self {
            name,
            labels: Vec::new(),
            value,
        }
    }

    pub fn with_label(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((name, value.into()));
        self
    }
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("metric {metric} is missing label {label}")]
    MissingLabel {
        metric: &'static str,
        label: &'static str,
    },

    #[error("sink write failed: {0}")]
    Write(String),
}

/// Destination for derived samples.
///
/// The sink is the only resource shared between concurrent scrape tasks, so
/// `write` must be safe to call from several tasks at once. Implementations
/// back this with the `prometheus` registry (its series are internally
/// synchronized) or, for tests, a mutex-guarded vector.
pub trait MetricsSink: Send + Sync {
    fn write(&self, sample: Sample) -> Result<(), SinkError>;
}

/// In-memory sink that records every written sample. Used by the pipeline
/// tests; also handy for debugging a scraper in isolation.
#[derive(Debug, Default)]
pub struct VecSink {
    samples: Mutex<Vec<Sample>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far, in write order.
    pub fn samples(&self) -> Vec<Sample> {
        self.lock().clone()
    }

    // Sample vectors stay consistent even if a writer panicked mid-push,
    // so a poisoned lock is still safe to read through.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sample>> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricsSink for VecSink {
    fn write(&self, sample: Sample) -> Result<(), SinkError> {
        self.lock().push(sample);
        Ok(())
    }
}
