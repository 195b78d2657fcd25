pub mod handlers;
pub mod queries;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::pipeline::TransactionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub pipeline: Arc<Mutex<TransactionPipeline>>,
}

pub fn router(pool: PgPool, pipeline: Arc<Mutex<TransactionPipeline>>) -> Router {
    let state = Arc::new(AppState { pool, pipeline });

    Router::new()
        .route("/api/v1/health", get(handlers::health))
        .route("/api/v1/metrics", get(handlers::metrics))
        .route(
            "/api/v1/transactions/analyze",
            post(handlers::analyze_transaction),
        )
        .route("/api/v1/transactions", get(handlers::list_transactions))
        .route("/api/v1/cases", get(handlers::list_cases))
        .route("/api/v1/cardholders", post(handlers::create_cardholder))
        .route(
            "/api/v1/cardholders/{cardholder_id}",
            get(handlers::get_cardholder),
        )
        .route("/api/v1/actions", post(handlers::log_action))
        .route("/static/app.js", get(handlers::app_js))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    pool: PgPool,
    pipeline: Arc<Mutex<TransactionPipeline>>,
    host: &str,
    port: u16,
) -> eyre::Result<()> {
    let app = router(pool, pipeline);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
