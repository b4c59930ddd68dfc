//! Legacore HTTP API: router assembly and server lifecycle.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod tenant;

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use legacore_db::{DbError, DbManager, run_migrations};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ServerError, error_envelope, fallback};
use crate::state::AppState;

/// Routes operating on one tenant. Every handler resolves the tenant
/// through the [`tenant::Tenant`] extractor.
fn tenant_routes() -> Router<AppState> {
    Router::new()
        .route("/cases", get(routes::cases::list).post(routes::cases::create))
        .route("/cases/stats", get(routes::cases::stats))
        .route("/cases/{id}", patch(routes::cases::update))
        .route("/assets", get(routes::assets::list).post(routes::assets::create))
        .route("/assets/stats", get(routes::assets::stats))
        .route(
            "/projects",
            get(routes::projects::list).post(routes::projects::create),
        )
        .route("/projects/stats", get(routes::projects::stats))
        .route(
            "/analytics",
            get(routes::analytics::list).post(routes::analytics::create),
        )
        .route("/credits", get(routes::credits::statement))
        .route("/credits/purchase", post(routes::credits::purchase))
        .route("/credits/use", post(routes::credits::consume))
}

/// Admin routes over global records.
fn global_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/companies",
            get(routes::companies::list).post(routes::companies::create),
        )
        .route("/users", get(routes::users::list).post(routes::users::create))
        .route(
            "/opportunities",
            get(routes::opportunities::list).post(routes::opportunities::create),
        )
        .route("/opportunities/stats", get(routes::opportunities::stats))
        .route("/ai/completions", post(routes::ai::complete))
        .route("/ai/completions/stream", post(routes::ai::stream))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = global_routes()
        .merge(tenant_routes())
        .nest("/tenants/{tenant}", tenant_routes());

    Router::new()
        .nest("/api", api)
        .fallback(fallback)
        .layer(middleware::from_fn_with_state(state.clone(), error_envelope))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Connect, migrate, bind and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let db = DbManager::connect(&config.database)
        .await
        .map_err(DbError::from)?;
    run_migrations(db.client()).await?;

    let addr = config.bind_addr();
    let state = AppState::new(&db, config)?;
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "Legacore API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Legacore API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
