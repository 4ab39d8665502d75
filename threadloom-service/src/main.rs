use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod auth;
mod config;
mod db;
mod error;
mod probe;
mod providers;
mod settings;
mod threads;

use crate::config::StaticConfig;
use crate::db::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting ThreadLoom console service v{}",
        env!("CARGO_PKG_VERSION")
    );

    // Load static configuration (server binding, storage path, endpoints)
    let static_config = StaticConfig::load()?;

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        "Static configuration loaded"
    );

    // Ensure data directory exists
    std::fs::create_dir_all(&static_config.storage.data_dir)?;

    // Initialize database
    let db_path = static_config.storage.data_dir.join("threadloom.db");
    let db = Arc::new(Database::open(&db_path)?);
    info!(path = %db_path.display(), "Database initialized");

    // Install the Prometheus recorder backing /metrics
    let metrics = PrometheusBuilder::new().install_recorder()?;

    // Build the router
    let app = api::router(db.clone(), &static_config, metrics);

    // Start the expired-session sweep background task
    let sweep_db = db.clone();
    let sweep_interval = static_config.auth.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            match sweep_db.delete_expired_sessions() {
                Ok(count) if count > 0 => {
                    info!(removed = count, "Swept expired sessions");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Session sweep failed");
                }
                _ => {}
            }
        }
    });

    // Start the server
    let addr = format!("{}:{}", static_config.server.host, static_config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("threadloom_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
