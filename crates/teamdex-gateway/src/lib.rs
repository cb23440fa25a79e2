//! teamdex HTTP/JSON gateway.
//!
//! A thin axum layer over the teamdex team service and catalog. Handlers
//! run the synchronous core on tokio's blocking pool, bounded by the
//! configured request timeout.

pub mod config;
pub mod error;
pub mod json;
pub mod routes;

pub use config::{Args, GatewayConfig};
pub use error::AppError;

use std::sync::Arc;

use axum::Router;
use teamdex_core::{Catalog, CatalogSeed, Result as CoreResult, StorageEngine};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    /// Roster storage.
    pub engine: Arc<StorageEngine>,
    /// Reference catalog, stored in the same database.
    pub catalog: Arc<Catalog>,
    /// Gateway configuration.
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state.
    pub fn new(engine: StorageEngine, catalog: Catalog, config: GatewayConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            catalog: Arc::new(catalog),
            config,
        }
    }

    /// Open the database described by `config` and load its seed, if any.
    pub fn open(config: GatewayConfig) -> CoreResult<Self> {
        let engine = StorageEngine::open(config.storage_config())?;
        let catalog = Catalog::open(engine.db())?;

        if let Some(path) = &config.seed {
            let seed = CatalogSeed::from_path(path)?;
            catalog.load_seed(&seed)?;
        }

        info!(
            recovered = engine.was_recovered(),
            creatures = catalog.creature_count(),
            teams = engine.list_teams()?.len(),
            "database opened"
        );
        Ok(Self::new(engine, catalog, config))
    }

    /// Run a read-only operation.
    pub async fn execute_read<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&StorageEngine, &Catalog) -> CoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        self.run_blocking(op).await
    }

    /// Run a mutation, retrying it when a concurrent commit rejected it.
    pub async fn execute_write<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: Fn(&StorageEngine, &Catalog) -> CoreResult<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        let mut attempt = 0;

        loop {
            let op = Arc::clone(&op);
            match self.run_blocking(move |engine, catalog| op(engine, catalog)).await {
                Err(AppError::Core(err))
                    if err.is_retryable() && attempt < self.config.write_retries =>
                {
                    attempt += 1;
                    debug!(attempt, error = %err, "retrying write");
                    tokio::time::sleep(self.config.write_retry_backoff).await;
                }
                result => return result,
            }
        }
    }

    async fn run_blocking<T, F>(&self, op: F) -> Result<T, AppError>
    where
        F: FnOnce(&StorageEngine, &Catalog) -> CoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let catalog = Arc::clone(&self.catalog);
        let task = tokio::task::spawn_blocking(move || op(&engine, &catalog));

        match tokio::time::timeout(self.config.request_timeout, task).await {
            Ok(Ok(result)) => result.map_err(AppError::from),
            Ok(Err(e)) => Err(AppError::Internal(format!("worker task failed: {e}"))),
            Err(_) => Err(AppError::Timeout(self.config.request_timeout)),
        }
    }
}

/// Create the router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::health::routes())
        .merge(routes::teams::routes())
        .merge(routes::catalog::routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
