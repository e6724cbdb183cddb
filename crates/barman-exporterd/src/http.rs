use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tracing::{debug, error};

use barman_collect::{Exporter, MetricsSink};
use barman_prometheus::PrometheusSink;

/// Prometheus propagates the scrape timeout through this request header.
const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

pub struct AppState {
    pub exporter: Exporter,
    pub telemetry_path: String,
}

/// Build the router: the telemetry endpoint plus a landing page at `/`.
/// When metrics are served at the root itself there is no room for a
/// landing page and it is skipped.
pub fn router(state: Arc<AppState>) -> Router {
    let telemetry_path = state.telemetry_path.clone();
    let mut router = Router::new().route(&telemetry_path, get(serve_metrics));
    if telemetry_path != "/" {
        router = router.route("/", get(landing));
    }
    router.with_state(state)
}

async fn landing(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        "<html>\
         <head><title>Barman Cloud Exporter</title></head>\
         <body>\
         <h1>Barman Cloud Exporter</h1>\
         <p><a href=\"{path}\">Metrics</a></p>\
         </body>\
         </html>",
        path = state.telemetry_path,
    ))
}

/// One scrape: fresh sink, bounded collection, text exposition.
///
/// Per-source failures never fail the response; whatever samples succeeded
/// are served alongside `barman_cloud_up 0`. Only a completely broken sink
/// turns into a 500.
async fn serve_metrics(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    debug!(target: "barman.exporterd", "scraping barman cloud sources");

    let sink = match PrometheusSink::new() {
        Ok(sink) => Arc::new(sink),
        Err(err) => {
            error!(target: "barman.exporterd", %err, "failed to build metrics sink");
            return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
        }
    };

    let deadline = scrape_deadline(&headers);
    let dyn_sink: Arc<dyn MetricsSink> = sink.clone();
    if let Err(err) = state.exporter.collect(dyn_sink, deadline).await {
        // Liveness already reflects the failure; serve what we have.
        error!(target: "barman.exporterd", %err, "collection did not complete cleanly");
    }

    match sink.encode_text() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(target: "barman.exporterd", %err, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Deadline from the `X-Prometheus-Scrape-Timeout-Seconds` header, if the
/// header is present and holds a positive finite number of seconds.
fn scrape_deadline(headers: &HeaderMap) -> Option<Duration> {
    let raw = headers.get(SCRAPE_TIMEOUT_HEADER)?.to_str().ok()?;
    let seconds: f64 = raw.trim().parse().ok()?;
    if seconds <= 0.0 {
        return None;
    }
    // try_from rejects NaN, infinities and values beyond the Duration
    // range; the header is client-controlled, so never panic on it.
    Duration::try_from_secs_f64(seconds).ok()
}
