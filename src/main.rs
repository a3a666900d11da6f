#![allow(dead_code)]
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{Extension, Router};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_swagger_ui::SwaggerUi;

mod api;
mod config;
mod db;
mod middleware;
mod utils;

use crate::config::Config;
use crate::db::queries::location::LocationDoc;
use crate::db::queries::personnel::PersonnelDoc;
use crate::db::queries::shift::ShiftDoc;
use crate::db::queries::task::TaskDoc;
use crate::db::queries::template::TemplateDoc;
use crate::middleware::auth::{create_scope_cache, jwt_middleware, scope_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    Config::init();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let pool = db::pool::get_db_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let scope_cache = create_scope_cache();

    let merged_doc = ShiftDoc::openapi()
        .merge_from(TemplateDoc::openapi())
        .merge_from(TaskDoc::openapi())
        .merge_from(PersonnelDoc::openapi())
        .merge_from(LocationDoc::openapi());

    // Everything except health sits behind JWT + location-scope resolution.
    let private_routes = Router::new()
        .merge(api::shift::shift_routes())
        .merge(api::template::template_routes())
        .merge(api::task::task_routes())
        .merge(api::personnel::directory_routes())
        .route_layer(from_fn_with_state(pool.clone(), scope_middleware))
        .route_layer(from_fn(jwt_middleware));

    let app = Router::new()
        .merge(api::health::health_routes())
        .merge(private_routes)
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", merged_doc.clone()))
        .merge(RapiDoc::with_openapi("/api-docs/rapidoc.json", merged_doc).path("/rapidoc"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(Extension(scope_cache))
        .with_state(pool.clone());

    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    run_server(app, shutdown_tx, pool).await;
    tracing::info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal(mut shutdown_rx: broadcast::Receiver<()>, pool: PgPool) {
    tokio::select! {
        _ = signal::ctrl_c() => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = shutdown_rx.recv() => tracing::info!("Received shutdown signal."),
    }
    tracing::info!("Closing database pool...");
    pool.close().await;
    tracing::info!("Database pool closed. Server shutting down.");
}

async fn run_server(app: Router, shutdown_tx: broadcast::Sender<()>, pool: PgPool) {
    let addr = SocketAddr::from(([127, 0, 0, 1], Config::get().server_port));
    tracing::info!("Server running at http://{addr}");

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listener");

    let shutdown = shutdown_signal(shutdown_tx.subscribe(), pool.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Server encountered an error");
}
