mod config;
mod http;

use std::sync::Arc;

use tracing::info;

use barman_collect::{BackupScraper, Exporter, Scraper, WalScraper};
use barman_observe::{LogConfig, init_logger};

use crate::config::ExporterConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1) Configuration
    let cfg = ExporterConfig::from_env()?;

    // 2) Logger
    init_logger(&LogConfig {
        format: cfg.log_format,
        level: cfg.log_level.clone(),
        ..Default::default()
    })?;
    info!(
        target: "barman.exporterd",
        backup_log = %cfg.backup_log.display(),
        wal_log = %cfg.wal_log.display(),
        tail_bytes = cfg.tail_bytes,
        "starting barman cloud exporter",
    );

    // 3) Sources
    let scrapers: Vec<Arc<dyn Scraper>> = vec![
        Arc::new(BackupScraper::new(&cfg.backup_log, cfg.tail_bytes)),
        Arc::new(WalScraper::new(
            &cfg.wal_log,
            cfg.tail_bytes,
            cfg.wal_failure_window,
        )),
    ];
    let state = Arc::new(http::AppState {
        exporter: Exporter::new(scrapers),
        telemetry_path: cfg.telemetry_path.clone(),
    });

    // 4) HTTP server
    let app = http::router(state);
    let listener = tokio::net::TcpListener::bind(cfg.listen_addr).await?;
    info!(
        target: "barman.exporterd",
        listen = %cfg.listen_addr,
        path = %cfg.telemetry_path,
        "metrics endpoint ready",
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!(target: "barman.exporterd", "shut down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
