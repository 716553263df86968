use axum::Router;
use serde::Deserialize;

/// How server-rendered pages are delivered to the browser.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Full documents only; the browser re-requests the page to refresh.
    Static,
    /// Documents plus partial-HTML fragment endpoints the rendered page
    /// polls, so content updates without a full reload.
    #[default]
    Interactive,
}

/// A server-rendered UI page.
///
/// Pages own their dependencies and hand back plain routers; the registry
/// decides where they are mounted and whether fragment routes participate.
pub trait Page: Send + Sync {
    /// Unique name, also the fragment mount segment (`/fragments/{name}`).
    fn name(&self) -> &'static str;

    /// Routes producing full HTML documents, with absolute paths.
    fn document_routes(&self, mode: RenderMode) -> Router;

    /// Routes producing partial HTML for the interactive render mode.
    fn fragment_routes(&self) -> Router {
        Router::new()
    }
}
