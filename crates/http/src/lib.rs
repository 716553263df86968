//! HTTP pipeline for the Lumen web UI: router assembly, middleware, error
//! rendering, and the blocking serve loop.

use anyhow::Context;
use axum::{extract::Request, http::HeaderValue, routing::get, Router};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::{Timestamp, Uuid};

use lumen_kernel::{
    settings::{ServerSettings, Settings},
    PageRegistry, PipelinePolicy,
};

pub mod error;
pub mod middleware;
pub mod router;

use router::RouterBuilder;

/// Assemble the full request pipeline: page routes, health check, static
/// assets, antiforgery, the policy-conditional middleware, then timeout,
/// request-id, and tracing outermost.
pub fn build_router(pages: &PageRegistry, settings: &Settings, policy: &PipelinePolicy) -> Router {
    RouterBuilder::new()
        .mount_pages(pages)
        .route("/healthz", get(health_check))
        .with_static_assets(&settings.ui.asset_dir)
        .with_antiforgery()
        .with_policy(policy)
        .with_timeout(settings.server.request_timeout_ms)
        .with_request_id()
        .with_tracing()
        .build()
}

/// Bind the listener and serve until externally terminated.
pub async fn serve(app: Router, server: &ServerSettings) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", server.host, server.port))
        .await
        .context("failed to bind to address")?;

    tracing::info!(
        "listening on http://{}:{}",
        server.host,
        server.port
    );

    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

/// Request ID generator for tracing.
#[derive(Clone)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let timestamp = Timestamp::now(uuid::NoContext);
        let request_id = Uuid::new_v7(timestamp)
            .to_string()
            .parse::<HeaderValue>()
            .ok()?;
        Some(RequestId::new(request_id))
    }
}
