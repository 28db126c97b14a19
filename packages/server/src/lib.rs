#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the ee-status dashboard.
//!
//! Loads the MaStR snapshot once at startup and serves totals, rankings,
//! timelines, and search over it as JSON. The snapshot is immutable and
//! shared across workers behind an `Arc`.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use ee_status_registry::{RegistryError, Snapshot};

/// Shared application state.
pub struct AppState {
    /// The loaded snapshot.
    pub snapshot: Arc<Snapshot>,
}

/// Errors that can occur while starting or running the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The snapshot could not be loaded.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Binding or serving failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Registers all routes. Shared by [`serve`] and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/states", web::get().to(handlers::states))
            .route("/totals", web::get().to(handlers::totals))
            .route("/rankings", web::get().to(handlers::rankings))
            .route("/timeline", web::get().to(handlers::timeline))
            .route("/search", web::get().to(handlers::search)),
    )
    .route("/search", web::get().to(handlers::search_redirect));
}

/// Reads `BIND_ADDR` and `PORT`, defaulting to `127.0.0.1:8080`.
#[must_use]
pub fn bind_config() -> (String, u16) {
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    (bind_addr, port)
}

/// Serves `snapshot` on `bind_addr:port` until shutdown.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(snapshot: Snapshot, bind_addr: String, port: u16) -> std::io::Result<()> {
    log::info!(
        "Serving {} municipalities and {} timeline rows",
        snapshot.current_totals().len(),
        snapshot.monthly_timeline().len()
    );

    let state = web::Data::new(AppState {
        snapshot: Arc::new(snapshot),
    });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

/// Starts the API server.
///
/// Loads the snapshot from `EE_STATUS_DATA_DIR` and binds to `BIND_ADDR`
/// and `PORT`. This is a regular async function; the caller provides the
/// runtime (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns [`ServerError::Registry`] if the snapshot cannot be loaded and
/// [`ServerError::Io`] if the server fails to bind or run.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> Result<(), ServerError> {
    log::info!("Loading snapshot...");
    let snapshot = ee_status_registry::load_from_env()?;

    let (bind_addr, port) = bind_config();
    serve(snapshot, bind_addr, port).await?;
    Ok(())
}
