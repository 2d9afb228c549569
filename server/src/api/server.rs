//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{health, otlp_collector, replying, runs};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::core::replying::ReplyingState;
use crate::domain::traces::IngestService;

/// Everything the HTTP routes need, detached from the full application
#[derive(Clone)]
pub struct ApiContext {
    pub ingest: Arc<IngestService>,
    pub replying: ReplyingState,
    pub shutdown_rx: watch::Receiver<bool>,
    pub otlp_body_limit: usize,
    pub allowed_origins: AllowedOrigins,
}

impl ApiContext {
    pub fn from_app(app: &CoreApp) -> Self {
        Self {
            ingest: app.ingest.clone(),
            replying: app.replying.clone(),
            shutdown_rx: app.shutdown.subscribe(),
            otlp_body_limit: app.config.otel.body_limit_bytes,
            allowed_origins: AllowedOrigins::new(
                &app.config.server.host,
                app.config.server.port,
            ),
        }
    }
}

/// Build the full HTTP router
pub fn build_router(ctx: ApiContext) -> Router {
    // Exporters may gzip their payloads
    let otlp_routes = otlp_collector::routes(ctx.ingest.clone())
        .layer(DefaultBodyLimit::max(ctx.otlp_body_limit))
        .layer(RequestDecompressionLayer::new());

    Router::new()
        .route("/api/v1/health", get(health::health))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .nest("/v1", otlp_routes)
        .nest("/api/v1/runs", runs::routes(ctx.ingest, ctx.shutdown_rx))
        .merge(replying::routes(ctx.replying))
        .fallback(middleware::handle_404)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors(&ctx.allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

pub struct ApiServer {
    app: CoreApp,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        Self { app }
    }

    /// Serve until shutdown is triggered. Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self { app } = self;

        let shutdown = app.shutdown.clone();
        let host = app.config.server.host.clone();
        let port = app.config.server.port;

        let router = build_router(ApiContext::from_app(&app));

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .with_context(|| format!("Failed to bind HTTP server to {}:{}", host, port))?;
        tracing::debug!(addr = ?listener.local_addr().ok(), "HTTP server listening");

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown.wait())
        .await?;

        Ok(app)
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
