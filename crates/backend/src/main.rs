pub mod api;
pub mod domain;
pub mod shared;
pub mod usecases;

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                // Keep application logs, silence per-query SQL noise
                "info,sqlx=warn,sea_orm=warn".into()
            }),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    let config = shared::config::load_config()?;
    let db_path = shared::config::get_database_path(&config)?;
    shared::data::db::initialize_database(db_path.to_str())
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let store = Arc::new(shared::kv::RedisProgressStore::new(
        &config.progress_store.redis_url,
    )?);
    let publisher = shared::realtime::RealtimePublisher::new();
    api::handlers::usecases::initialize(store, publisher)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // Sync run records
        .route(
            "/api/sync_run",
            get(api::handlers::sync_runs::list_all).post(api::handlers::sync_runs::create),
        )
        .route(
            "/api/sync_run/:id",
            get(api::handlers::sync_runs::get_by_id),
        )
        // Cancel-guard for exported documents
        .route(
            "/api/a102/guard_cancel",
            post(api::handlers::sync_runs::guard_cancel),
        )
        // UseCase u601: Synchronise to Winbooks
        .route(
            "/api/u601/sync/:id/start",
            post(api::handlers::usecases::u601_start_sync),
        )
        .route(
            "/api/u601/sync/:id/progress",
            get(api::handlers::usecases::u601_get_progress),
        )
        .route(
            "/api/u601/sync/:id/success",
            post(api::handlers::usecases::u601_set_success),
        )
        .route(
            "/api/u601/sync/:id/abort",
            post(api::handlers::usecases::u601_abort),
        )
        .route(
            "/api/u601/invoices/vat",
            post(api::handlers::usecases::u601_compute_vat),
        )
        .route(
            "/api/u601/fetch_plan/:entity_type",
            get(api::handlers::usecases::u601_fetch_plan),
        )
        // UseCase u602: Synchronise to Farandsoft
        .route(
            "/api/u602/sync/:id/start",
            post(api::handlers::usecases::u602_start_sync),
        )
        .route(
            "/api/u602/sync/:id/progress",
            get(api::handlers::usecases::u602_get_progress),
        )
        .route(
            "/api/u602/sync/:id/status",
            post(api::handlers::usecases::u602_set_status),
        )
        .route(
            "/api/u602/sync/:id/append_error",
            post(api::handlers::usecases::u602_append_error),
        )
        // External client heartbeat
        .route(
            "/api/backend/ping",
            post(api::handlers::usecases::backend_ping),
        )
        .layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], 3000).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port 3000 is already in use. Please ensure no other process is using this port."
                );
            } else {
                tracing::error!("Failed to bind to port 3000. Error: {}", e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
