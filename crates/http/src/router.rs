//! Router builder for the Lumen HTTP pipeline.

use axum::{middleware::from_fn, Router};
use std::time::Duration;
use tower_http::{
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use lumen_kernel::{PageRegistry, PipelinePolicy};

use crate::middleware::{antiforgery, error_scope, hsts_header_value, https_upgrade};

/// Builder for constructing the main HTTP router.
///
/// Layer methods must be called after the routes they are meant to cover:
/// axum applies a layer only to routes already present, so the call order
/// below is from innermost to outermost middleware.
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder.
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router.
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount every registered page (documents, and fragments when the render
    /// mode is interactive).
    pub fn mount_pages(mut self, pages: &PageRegistry) -> Self {
        self.router = self.router.merge(pages.router());
        self
    }

    /// Serve static assets under `/assets`.
    pub fn with_static_assets(mut self, asset_dir: &str) -> Self {
        self.router = self
            .router
            .nest_service("/assets", ServeDir::new(asset_dir));
        self
    }

    /// Add request-forgery validation middleware.
    pub fn with_antiforgery(mut self) -> Self {
        self.router = self.router.layer(from_fn(antiforgery));
        self
    }

    /// Apply the environment-derived middleware: error-page routing, HSTS,
    /// and the HTTPS upgrade redirect.
    pub fn with_policy(mut self, policy: &PipelinePolicy) -> Self {
        if policy.error_page {
            self.router = self.router.layer(from_fn(error_scope));
        }
        if policy.hsts {
            self.router = self.router.layer(SetResponseHeaderLayer::if_not_present(
                axum::http::header::STRICT_TRANSPORT_SECURITY,
                hsts_header_value(),
            ));
        }
        if policy.https_redirect {
            self.router = self.router.layer(from_fn(https_upgrade));
        }
        self
    }

    /// Add timeout middleware.
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self
            .router
            .layer(TimeoutLayer::new(Duration::from_millis(timeout_ms)));
        self
    }

    /// Add request ID middleware.
    pub fn with_request_id(mut self) -> Self {
        self.router = self.router.layer(
            tower_http::request_id::SetRequestIdLayer::x_request_id(crate::MakeRequestUuid),
        );
        self
    }

    /// Add tracing middleware.
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Build the final router.
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
