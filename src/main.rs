use axum::{
    routing::{get, post},
    Router,
};
use freight_audit_rust::{api, AppConfig, BatchStore, ClientRegistry, ReconcilerService};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local-time log format
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // Reference data is loaded once; a bad table aborts startup
    let registry = ClientRegistry::load(&config.audit)?;
    info!("Client registry loaded: {} clients", registry.len());

    let state = api::AppState {
        reconciler: Arc::new(ReconcilerService::new(registry, config.audit.tolerance)),
        batches: Arc::new(BatchStore::new()),
    };

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/api/clients", get(api::list_clients))
        .route("/api/audit/batch", post(api::batch_audit))
        .route("/api/audit/:batch_id/export", get(api::export_batch))
        .with_state(state)
        .layer(ServiceBuilder::new());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/clients                 - configured clients");
    info!("  POST /api/audit/batch             - reconcile a batch of CT-e documents");
    info!("  GET  /api/audit/:batch_id/export  - download the audit sheet (CSV)");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
