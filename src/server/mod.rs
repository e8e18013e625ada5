//! HTTP API for on-demand link checks
//!
//! Provides two endpoints:
//! - `POST /broken-links` - page, site or single-URL check with a categorized report
//! - `GET /broken-links?url=...` - quick single-URL liveness check
//!
//! Checks run inside the request. If the client disconnects, axum drops the
//! handler future and every in-flight probe with it.

mod handlers;
mod types;

use crate::config::Config;
use crate::crawler::build_http_client;
use crate::LinkScoutError;
use anyhow::Context;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use handlers::{check_links_handler, healthz, quick_check_handler};
pub use types::{
    ApiError, ApiResponse, AppState, CheckMetadata, CheckRequest, CheckResponseData,
    EffectiveOptions, QuickCheckData, QuickCheckQuery, RequestOptions,
};

impl AppState {
    /// Builds the shared state from the loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, LinkScoutError> {
        let user_agent = config.user_agent.header_value();
        let client = build_http_client(&user_agent)?;
        Ok(Self {
            client,
            defaults: Arc::new(config.checker.clone()),
            user_agent: Arc::from(user_agent),
        })
    }
}

/// Creates the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/broken-links",
            get(quick_check_handler).post(check_links_handler),
        )
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Binds `bind` and serves the API until Ctrl-C
pub async fn serve(config: &Config, bind: &str) -> Result<(), anyhow::Error> {
    let state = AppState::from_config(config)?;

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {}", bind))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("LinkScout API listening on http://{}/", addr);
    tracing::info!("  - Check: POST http://{}/broken-links", addr);
    tracing::info!("  - Quick check: GET http://{}/broken-links?url=...", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("LinkScout API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
