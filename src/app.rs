//! Startup sequencer: construct process-wide services in a fixed order, then
//! hand control to the serving runtime. Any registration failure aborts
//! startup; there is no partial-configuration mode.

use anyhow::Context;
use axum::Router;

use lumen_client::{ApiClient, ClientRegistry};
use lumen_kernel::{settings::Settings, PageRegistry, PipelinePolicy};

/// Service identifier attached to every exported trace and log record.
pub const SERVICE_NAME: &str = "lumen-web";

/// Build the process object graph: named clients, page registry, middleware
/// policy, and the assembled router. Fails fast on a malformed base URL.
pub fn build_application(settings: &Settings) -> anyhow::Result<Router> {
    let mut clients = ClientRegistry::new();
    clients
        .register(ApiClient::NAME, &settings.api.base_url)
        .context("failed to register backend api client")?;
    let api = ApiClient::from_registry(&clients)?;

    let mut pages = PageRegistry::new(settings.ui.render_mode);
    crate::modules::register_all(&mut pages, api);

    let policy = PipelinePolicy::from_settings(settings);
    Ok(lumen_http::build_router(&pages, settings, &policy))
}

/// Build the object graph and emit the single startup line. The log fires
/// after construction succeeds and before any listener exists, so a
/// "lumen-web started" record always means a fully wired process.
pub fn bootstrap(settings: &Settings) -> anyhow::Result<Router> {
    let app = build_application(settings)?;

    tracing::info!(
        service = SERVICE_NAME,
        environment = ?settings.environment,
        render_mode = ?settings.ui.render_mode,
        "lumen-web started"
    );

    Ok(app)
}

/// Full bootstrap sequence: settings, telemetry, object graph, startup log,
/// serve loop.
pub async fn run() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load lumen settings")?;

    let _telemetry = lumen_telemetry::init(SERVICE_NAME, &settings.telemetry)
        .context("failed to install telemetry pipeline")?;

    let app = bootstrap(&settings)?;

    lumen_http::serve(app, &settings.server).await
}
