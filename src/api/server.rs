//! HTTP Server - axum listener for the weather dashboard
//!
//! Mounts the JSON API under `/api` and, when present, serves the dashboard
//! assets for every other path.

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::routes::{
    air_quality_handler, current_weather_handler, forecast_handler, geocode_search_handler,
    health_handler, reverse_geocode_handler, AppState,
};
use crate::proxy::CachedFetchProxy;

/// Build the full application router
pub fn router(state: AppState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/weather/current", get(current_weather_handler))
        .route("/weather/forecast", get(forecast_handler))
        .route("/weather/air-quality", get(air_quality_handler))
        .route("/geocode/search", get(geocode_search_handler))
        .route("/geocode/reverse", get(reverse_geocode_handler))
        .route("/health", get(health_handler));

    let mut app = Router::new().nest("/api", api);

    match static_dir {
        Some(dir) if dir.is_dir() => {
            info!(static_dir = %dir.display(), "Serving dashboard assets");
            app = app.fallback_service(ServeDir::new(dir));
        }
        Some(dir) => {
            warn!(static_dir = %dir.display(), "Static directory not found, serving API only");
        }
        None => {}
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// HTTP server for the proxy API
pub struct ApiServer {
    state: AppState,
    static_dir: Option<PathBuf>,
    /// Socket listener
    listener: Option<TcpListener>,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(proxy: Arc<CachedFetchProxy>, static_dir: Option<PathBuf>) -> Self {
        Self {
            state: AppState { proxy },
            static_dir,
            listener: None,
        }
    }

    /// Bind the listening socket
    pub async fn start(&mut self, address: &str) -> Result<SocketAddr> {
        let listener = TcpListener::bind(address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;
        let local_addr = listener.local_addr().context("Failed to read bound address")?;

        info!(address = %local_addr, "HTTP server started");

        self.listener = Some(listener);
        Ok(local_addr)
    }

    /// Serve requests until `shutdown` resolves
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = self.listener.context("Server not started")?;
        let app = router(self.state, self.static_dir.as_deref());

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .context("HTTP server error")?;

        info!("HTTP server stopped");
        Ok(())
    }
}
