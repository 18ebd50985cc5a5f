//! REST API server for ZIP tree visualization
//!
//! Accepts a `multipart/form-data` upload holding one ZIP archive and answers with
//! the archive's directory tree as JSON:
//!
//! ```text
//! { "name": "", "path": "", "isDirectory": true, "children": [ ... ] }
//! ```
//!
//! Failures are answered with `{"error": "<message>"}`.

pub mod config;
mod handlers;
pub mod multipart;
pub mod storage;
mod types;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use ziptree_archive::ZipLister;

pub use config::ServerConfig;
pub use handlers::*;
pub use storage::{RandomIds, SequentialIds, TransientStore, UniqueIdSource};
pub use types::*;
pub use upload::{UploadError, UploadHandler};

/// API server state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    /// Upload pipeline
    pub upload: Arc<UploadHandler>,
    /// Time allowed for one upload's storage and listing
    pub listing_timeout: Duration,
}

impl ApiState {
    /// Create new API state
    #[must_use]
    pub fn new(upload: UploadHandler, listing_timeout: Duration) -> Self {
        Self {
            upload: Arc::new(upload),
            listing_timeout,
        }
    }

    /// State for the production server: ZIP listing, UUID-named relay files
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        let store = TransientStore::new(config.transient_dir(), Arc::new(RandomIds));
        let upload = UploadHandler::new(store, Arc::new(ZipLister), config.role_policy());
        Self::new(upload, config.listing_timeout())
    }
}

/// Build the API router with all endpoints
pub fn build_router(config: &ServerConfig, state: ApiState) -> Router {
    let router = Router::new()
        // Health check
        .route(config::HEALTH_ROUTE, get(health_check))
        // Archive upload
        .route(&config.upload_route, post(upload_archive))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let router = match &config.static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve `app` on an already bound listener
pub async fn serve(listener: tokio::net::TcpListener, app: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, app).await
}

/// Start the API server
pub async fn start_server(config: &ServerConfig) -> Result<(), std::io::Error> {
    tracing::info!("Starting API server on {}", config.addr);
    tracing::info!(
        "Upload route {}, transient files in {}",
        config.upload_route,
        config.transient_dir().display()
    );

    let app = build_router(config, ApiState::from_config(config));
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    serve(listener, app).await
}
