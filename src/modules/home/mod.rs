//! Home dashboard: renders the backend's service summaries.

use std::sync::Arc;

use axum::{extract::State, response::Html, routing::get, Router};

use lumen_client::{ApiClient, ServiceSummary};
use lumen_http::error::AppError;
use lumen_kernel::{Page, RenderMode};

use crate::utils::{escape_html, html_shell};

/// How often the interactive document re-polls its services fragment.
const POLL_INTERVAL_MS: u32 = 5_000;

pub struct HomePage {
    api: ApiClient,
}

#[derive(Clone)]
struct HomeState {
    api: ApiClient,
    mode: RenderMode,
}

impl Page for HomePage {
    fn name(&self) -> &'static str {
        "home"
    }

    fn document_routes(&self, mode: RenderMode) -> Router {
        Router::new().route("/", get(dashboard)).with_state(HomeState {
            api: self.api.clone(),
            mode,
        })
    }

    fn fragment_routes(&self) -> Router {
        Router::new()
            .route("/services", get(services_fragment))
            .with_state(HomeState {
                api: self.api.clone(),
                mode: RenderMode::Interactive,
            })
    }
}

async fn dashboard(State(state): State<HomeState>) -> Result<Html<String>, AppError> {
    let services = fetch_services(&state.api).await?;
    Ok(Html(html_shell(
        "Services",
        &render_dashboard(&services, state.mode),
    )))
}

async fn services_fragment(State(state): State<HomeState>) -> Result<Html<String>, AppError> {
    let services = fetch_services(&state.api).await?;
    Ok(Html(render_services(&services)))
}

async fn fetch_services(api: &ApiClient) -> Result<Vec<ServiceSummary>, AppError> {
    api.service_summaries()
        .await
        .map_err(|err| AppError::upstream(err.to_string()))
}

fn render_dashboard(services: &[ServiceSummary], mode: RenderMode) -> String {
    let mut content = format!(
        "<h1>Service status</h1>\n<div id=\"services\">\n{}</div>\n",
        render_services(services)
    );

    if mode == RenderMode::Interactive {
        content.push_str(&format!(
            "<script>setInterval(async () => {{\n\
             const response = await fetch('/fragments/home/services');\n\
             if (response.ok) {{\n\
               document.getElementById('services').innerHTML = await response.text();\n\
             }}\n\
             }}, {POLL_INTERVAL_MS});</script>\n"
        ));
    }

    content
}

fn render_services(services: &[ServiceSummary]) -> String {
    if services.is_empty() {
        return "<p>No services reported.</p>\n".to_string();
    }

    let mut table = String::from(
        "<table>\n<thead><tr><th>Service</th><th>Status</th><th>Latency</th></tr></thead>\n<tbody>\n",
    );

    for service in services {
        let latency = service
            .latency_ms
            .map(|ms| format!("{ms:.1} ms"))
            .unwrap_or_else(|| "-".to_string());
        let class = if service.is_healthy() { "healthy" } else { "unhealthy" };
        table.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{latency}</td></tr>\n",
            escape_html(&service.name),
            escape_html(&service.status),
        ));
    }

    table.push_str("</tbody>\n</table>\n");
    table
}

/// Create a new instance of the home page.
pub fn create_page(api: ApiClient) -> Arc<dyn Page> {
    Arc::new(HomePage { api })
}
