use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::{
    error::CollectError,
    metrics,
    scrape::Scraper,
    sink::{MetricsSink, Sample},
};

/// Result of one completed collection.
#[derive(Debug, Clone, Copy)]
pub struct ScrapeOutcome {
    /// True iff every source scraped cleanly; mirrored in `barman_cloud_up`.
    pub up: bool,
    pub duration: Duration,
}

/// Collection coordinator: fans the configured scrapers out concurrently,
/// joins them, and reduces their outcomes into summary samples.
pub struct Exporter {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl Exporter {
    pub fn new(scrapers: Vec<Arc<dyn Scraper>>) -> Self {
        Self { scrapers }
    }

    /// Run one collection against `sink`, optionally bounded by `deadline`.
    ///
    /// Each source runs as its own task and emits samples as it produces
    /// them; tasks share nothing but the sink. A failing source is logged
    /// and reduced into the liveness value after the join barrier — it
    /// never cancels its siblings. Only two failures surface as errors
    /// here: a sink write failure, and deadline expiry (outstanding tasks
    /// are then cancelled cooperatively and drained before returning).
    /// On deadline expiry the summary samples are still emitted, so a
    /// caller serving the registry anyway shows `up = 0` rather than an
    /// empty response.
    pub async fn collect(
        &self,
        sink: Arc<dyn MetricsSink>,
        deadline: Option<Duration>,
    ) -> Result<ScrapeOutcome, CollectError> {
        let started = Instant::now();
        let cancel = CancellationToken::new();
        let mut tasks: JoinSet<Result<(), CollectError>> = JoinSet::new();

        for scraper in &self.scrapers {
            let scraper = Arc::clone(scraper);
            let sink = Arc::clone(&sink);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                tokio::select! {
                    result = scraper.scrape(sink.as_ref()) => {
                        if let Err(err) = &result
                            && !matches!(err, CollectError::Sink(_))
                        {
                            error!(
                                target: "barman.collect",
                                scraper = scraper.name(), %err,
                                "scrape failed",
                            );
                        }
                        result
                    }
                    _ = cancel.cancelled() => {
                        debug!(target: "barman.collect", scraper = scraper.name(), "scrape cancelled");
                        Err(CollectError::Cancelled)
                    }
                }
            });
        }

        let joined = match deadline {
            Some(limit) => tokio::time::timeout(limit, join_all(&mut tasks)).await,
            None => Ok(join_all(&mut tasks).await),
        };

        match joined {
            Ok(Ok(up)) => finish(sink.as_ref(), up, started),
            Ok(Err(err)) => {
                // Sink failure: abandon the rest, nothing sensible to emit.
                cancel.cancel();
                drain(&mut tasks).await;
                Err(err)
            }
            Err(_elapsed) => {
                cancel.cancel();
                drain(&mut tasks).await;
                finish(sink.as_ref(), false, started)?;
                Err(CollectError::DeadlineExceeded {
                    elapsed_ms: started.elapsed().as_millis(),
                })
            }
        }
    }
}

/// Join barrier. Per-task results are reduced here, on the coordinator's
/// side of the join — the tasks themselves share no mutable state.
async fn join_all(tasks: &mut JoinSet<Result<(), CollectError>>) -> Result<bool, CollectError> {
    let mut up = true;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err @ CollectError::Sink(_))) => return Err(err),
            Ok(Err(_)) => up = false, // already logged with its source identity
            Err(err) => {
                error!(target: "barman.collect", %err, "scrape task panicked");
                up = false;
            }
        }
    }
    Ok(up)
}

async fn drain(tasks: &mut JoinSet<Result<(), CollectError>>) {
    while tasks.join_next().await.is_some() {}
}

fn finish(
    sink: &dyn MetricsSink,
    up: bool,
    started: Instant,
) -> Result<ScrapeOutcome, CollectError> {
    let duration = started.elapsed();
    sink.write(Sample::new(metrics::UP, if up { 1.0 } else { 0.0 }))?;
    sink.write(Sample::new(metrics::SCRAPE_DURATION, duration.as_secs_f64()))?;
    Ok(ScrapeOutcome { up, duration })
}
