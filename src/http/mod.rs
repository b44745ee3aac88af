//! HTTP surface: an axum router over [`Marketplace`].
//!
//! # Endpoints
//!
//! - `GET /api/health`
//! - `/api/properties` listing, single read, agent listings and mutations (`properties`)
//! - `/api/wishlist`, `/api/inquiries`, `/api/dashboard` (`marketplace`)
//! - `/api/admin/users` (`admin`)
//!
//! The caller is taken from the `X-User-Id` header set by the upstream authentication layer.

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::Json,
    routing::get,
};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::AppConfig;
use crate::engine::Engine;
use crate::marketplace::Marketplace;

mod admin;
pub mod caller;
mod marketplace;
mod properties;
pub mod response;

pub use caller::{MaybeCaller, RequireCaller, USER_HEADER};

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub market: Marketplace,
}

impl AppState {
    #[must_use]
    pub fn new(market: Marketplace) -> Self {
        Self { market }
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Builds the full router with CORS applied.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .merge(properties::routes())
        .merge(marketplace::routes())
        .merge(admin::routes())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// CORS for the configured origins; any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::HeaderName::from_static(USER_HEADER)])
        .max_age(Duration::from_secs(60 * 60));

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("ignoring invalid CORS origin '{o}'");
                None
            }
        })
        .collect();

    if parsed.is_empty() { layer.allow_origin(Any) } else { layer.allow_origin(AllowOrigin::list(parsed)) }
}

/// Opens the store, serves until Ctrl+C or SIGTERM, then writes a final checkpoint.
///
/// When a data directory is configured, a background task also checkpoints every
/// `storage.checkpoint_interval_secs` seconds.
///
/// # Errors
/// Returns an error if the store cannot be opened, the address cannot be bound, or the final
/// checkpoint fails.
pub async fn serve(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(match &config.storage.data_dir {
        Some(dir) => Engine::open(dir)?,
        None => Engine::in_memory(),
    });
    let market = Marketplace::new(engine.clone(), config.listing.clone());
    let app = create_router(AppState::new(market), &config.server.cors_origins);

    let checkpointer = spawn_checkpointer(engine.clone(), config.storage.checkpoint_interval_secs);

    let address = format!("{}:{}", config.server.host, config.server.port);
    log::info!("binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    log::info!("server running on {address}");

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    if let Some(task) = checkpointer {
        task.abort();
    }
    let written = engine.checkpoint()?;
    log::info!("server stopped; final checkpoint wrote {written} documents");
    Ok(())
}

fn spawn_checkpointer(engine: Arc<Engine>, every_secs: u64) -> Option<tokio::task::JoinHandle<()>> {
    if engine.data_dir().is_none() || every_secs == 0 {
        return None;
    }
    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(every_secs));
        // The first tick fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = engine.checkpoint() {
                log::error!("periodic checkpoint failed: {e}");
            }
        }
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("received Ctrl+C, shutting down"),
            Err(e) => {
                log::error!("cannot listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                log::info!("received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
