//! Error page: landing target for failed requests outside development. The
//! error-scope middleware redirects here with the scope in the query string
//! so users can quote a reference the logs can be searched for.

use std::sync::Arc;

use axum::{extract::Query, response::Html, routing::get, Router};
use serde::Deserialize;

use lumen_kernel::{Page, RenderMode};

use crate::utils::{escape_html, html_shell};

pub struct ErrorPage;

#[derive(Debug, Deserialize)]
struct ErrorParams {
    #[serde(default)]
    scope: Option<String>,
}

impl Page for ErrorPage {
    fn name(&self) -> &'static str {
        "error"
    }

    fn document_routes(&self, _mode: RenderMode) -> Router {
        Router::new().route("/error", get(show_error))
    }
}

async fn show_error(Query(params): Query<ErrorParams>) -> Html<String> {
    let mut content = String::from(
        "<h1>Something went wrong</h1>\n\
         <p>The request could not be completed. Please try again.</p>\n",
    );

    if let Some(scope) = params.scope.as_deref() {
        content.push_str(&format!(
            "<p><small>reference: {}</small></p>\n",
            escape_html(scope)
        ));
    }

    Html(html_shell("Error", &content))
}

/// Create a new instance of the error page.
pub fn create_page() -> Arc<dyn Page> {
    Arc::new(ErrorPage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn error_page_echoes_the_scope() {
        let router = ErrorPage.document_routes(RenderMode::Static);

        let response = router
            .oneshot(
                Request::get("/error?scope=abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("reference: abc-123"));
    }

    #[tokio::test]
    async fn error_page_renders_without_a_scope() {
        let router = ErrorPage.document_routes(RenderMode::Static);

        let response = router
            .oneshot(Request::get("/error").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Something went wrong"));
        assert!(!body.contains("reference:"));
    }
}
