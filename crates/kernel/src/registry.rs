use std::sync::Arc;

use axum::Router;

use crate::page::{Page, RenderMode};

/// Registry of server-rendered pages, bound to one render mode for the
/// process lifetime.
pub struct PageRegistry {
    pages: Vec<Arc<dyn Page>>,
    mode: RenderMode,
}

impl PageRegistry {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            pages: Vec::new(),
            mode,
        }
    }

    /// Register a page with the registry.
    pub fn register(&mut self, page: Arc<dyn Page>) {
        self.pages.push(page);
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn pages(&self) -> &[Arc<dyn Page>] {
        &self.pages
    }

    /// Get a page by name.
    pub fn get_page(&self, name: &str) -> Option<&Arc<dyn Page>> {
        self.pages.iter().find(|page| page.name() == name)
    }

    /// Merge every page's document routes, and in interactive mode mount its
    /// fragment routes under `/fragments/{name}`.
    pub fn router(&self) -> Router {
        let mut router = Router::new();

        for page in &self.pages {
            tracing::info!(page = page.name(), mode = ?self.mode, "mounting page routes");
            router = router.merge(page.document_routes(self.mode));

            if self.mode == RenderMode::Interactive {
                let fragment_path = format!("/fragments/{}", page.name());
                router = router.nest(&fragment_path, page.fragment_routes());
            }
        }

        router
    }
}
