//! truthpulse-server — HTTP surface for response collection and metrics.
//!
//! Routes:
//! - `POST /api/analytics` stores one response record
//! - `GET /api/metrics` aggregates every stored record
//! - `GET /api/analytics.xlsx` downloads the spreadsheet export
//! - `GET /api/analytics.csv` downloads the CSV mirror
//! - `GET /api/seed` appends a sample record (only when enabled)
//! - `GET /health`

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use truthpulse_core::catalog::load_catalog_or_builtin;
use truthpulse_core::recorder::Recorder;
use truthpulse_core::traits::RecordStore;
use truthpulse_store::DataFiles;

pub mod api;
pub mod config;
pub mod error;

pub use config::TruthpulseConfig;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Also owns the exports served by the download routes.
    pub recorder: Arc<Recorder>,
    pub enable_seed: bool,
    pub body_limit_bytes: usize,
}

impl AppState {
    /// State serving the recorder's exports, with seeding off and the
    /// default body limit.
    pub fn new(recorder: Arc<Recorder>) -> Self {
        Self {
            recorder,
            enable_seed: false,
            body_limit_bytes: TruthpulseConfig::default().body_limit_bytes,
        }
    }

    pub fn with_seed(mut self, enable: bool) -> Self {
        self.enable_seed = enable;
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit_bytes = bytes;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let mut api = Router::new()
        .route("/api/analytics", post(api::record_response))
        .route("/api/metrics", get(api::get_metrics))
        .route("/api/analytics.xlsx", get(api::download_xlsx))
        .route("/api/analytics.csv", get(api::download_csv));
    if state.enable_seed {
        api = api.route("/api/seed", get(api::seed_record));
    }

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(state.body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Open the data directory and catalog named by `config` and assemble the
/// application state.
pub async fn build_state(config: &TruthpulseConfig) -> Result<AppState> {
    let catalog = load_catalog_or_builtin(config.catalog.as_deref())?;
    let files = DataFiles {
        database: &config.database_file,
        xlsx_export: &config.export_file,
        csv_export: config.csv_export.then_some(config.csv_export_file.as_str()),
    };
    let (store, exports) = truthpulse_store::open_data_dir(&config.data_dir, files).await?;

    let store: Arc<dyn RecordStore> = store;
    let recorder = Recorder::new(store, exports, Arc::new(catalog))
        .with_require_contact(config.require_contact);

    Ok(AppState::new(Arc::new(recorder))
        .with_seed(config.enable_seed)
        .with_body_limit(config.body_limit_bytes))
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: TruthpulseConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    let state = build_state(&config).await?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        "truthpulse v{} listening on http://{addr}",
        env!("CARGO_PKG_VERSION")
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
