//! # Secrets HTTP Server
//!
//! axum server exposing the vault.
//!
//! ## Routes
//!
//! Under `/api/v1`, behind the bearer token middleware:
//!
//! - `POST /secrets`, `GET /secrets`
//! - `GET|PUT|DELETE /secrets/{id}`
//! - `POST /sys/init`, `POST /sys/seal`, `POST /sys/unseal`, `GET /sys/status`
//!
//! Unauthenticated: `GET /healthz`, `GET /readyz`, `GET /metrics`.
//!
//! Every route is wrapped in `TraceLayer` and the audit middleware.

pub mod audit;
pub mod auth;
pub mod errors;
pub mod handlers;
pub mod probes;

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::sync::Notify;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{ServerConfig, StoreBackend};
use crate::observability::metrics::{register_metrics, set_vault_sealed};
use crate::vault::{FileStore, MemoryStore, Store, VaultError};

/// State shared by all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// `None` leaves the API open
    pub auth_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, auth_token: Option<String>) -> Self {
        Self {
            store,
            auth_token: auth_token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }
}

/// Build the full router for `state`
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            paths::SECRETS,
            post(handlers::create_secret).get(handlers::list_secrets),
        )
        .route(
            paths::SECRET_BY_ID,
            get(handlers::get_secret)
                .put(handlers::update_secret)
                .delete(handlers::delete_secret),
        )
        .route(paths::SYS_INIT, post(handlers::init_vault))
        .route(paths::SYS_SEAL, post(handlers::seal_vault))
        .route(paths::SYS_UNSEAL, post(handlers::unseal_vault))
        .route(paths::SYS_STATUS, get(handlers::vault_status))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    Router::new()
        .nest(paths::API_PREFIX, api)
        .route(paths::HEALTHZ, get(probes::healthz))
        .route(paths::READYZ, get(probes::readyz))
        .route(paths::METRICS, get(probes::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(audit::audit)),
        )
        .with_state(state)
}

/// Open the vault backend selected in `config`
///
/// # Errors
///
/// Fails if the split settings are invalid, or if the file backend's vault
/// file exists but cannot be read or parsed.
pub async fn build_store(config: &ServerConfig) -> Result<Arc<dyn Store>, VaultError> {
    config.split.validate()?;
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory vault (contents are lost on restart)");
            Ok(Arc::new(MemoryStore::new(config.split)))
        }
        StoreBackend::File => {
            info!("Using file vault at {}", config.vault_path.display());
            Ok(Arc::new(
                FileStore::open(config.vault_path.clone(), config.split).await?,
            ))
        }
    }
}

/// Serve the API on `config.listen_addr` until SIGINT/SIGTERM
///
/// # Errors
///
/// Fails if metrics cannot be registered, the listener cannot be bound or the
/// server exits with an I/O error.
pub async fn start_server(config: ServerConfig, store: Arc<dyn Store>) -> Result<()> {
    register_metrics().context("Failed to register metrics")?;
    set_vault_sealed(store.status().await.sealed);

    if config.auth_token.is_none() {
        warn!("PASSWORT_AUTH_TOKEN is not set; the API accepts unauthenticated requests");
    }

    let app = router(AppState::new(store, config.auth_token.clone()));
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!("Secrets API listening on {}", listener.local_addr()?);

    let stop = Arc::new(Notify::new());
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let stop = Arc::clone(&stop);
        async move { stop.notified().await }
    });
    let mut server = std::pin::pin!(server.into_future());

    tokio::select! {
        result = &mut server => result.context("Server error")?,
        () = shutdown_signal() => {
            info!("Shutting down, draining in-flight requests...");
            stop.notify_one();
            let drain = Duration::from_secs(config.shutdown_timeout_secs);
            match tokio::time::timeout(drain, &mut server).await {
                Ok(result) => result.context("Server error")?,
                Err(_) => warn!("Shutdown timed out after {:?}", drain),
            }
        }
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::SplitConfig;

    #[tokio::test]
    async fn test_build_store_rejects_invalid_split() {
        for (shares, threshold) in [(3, 1), (2, 3)] {
            let config = ServerConfig {
                split: SplitConfig { shares, threshold },
                ..ServerConfig::default()
            };
            let result = build_store(&config).await;
            assert!(matches!(result, Err(VaultError::InvalidSplit { .. })));
        }
    }

    #[tokio::test]
    async fn test_build_store_opens_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            store: StoreBackend::File,
            vault_path: dir.path().join("vault.json"),
            split: SplitConfig {
                shares: 5,
                threshold: 3,
            },
            ..ServerConfig::default()
        };
        let store = build_store(&config).await.unwrap();
        assert_eq!(store.threshold(), 3);
        assert_eq!(store.init().await.unwrap().len(), 5);
    }
}
