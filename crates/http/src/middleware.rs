//! Request-pipeline middleware: HTTPS upgrade, error-page routing with a
//! per-request error scope, and antiforgery protection.

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

/// Where 5xx responses are routed when the error-page policy is active.
pub const ERROR_PAGE_PATH: &str = "/error";

/// Response header carrying the error scope alongside the redirect.
pub const ERROR_SCOPE_HEADER: &str = "x-error-scope";

/// Double-submit cookie holding the antiforgery token.
pub const ANTIFORGERY_COOKIE: &str = "lumen_antiforgery";

/// Request header that must echo the antiforgery cookie on unsafe methods.
pub const ANTIFORGERY_HEADER: &str = "x-antiforgery-token";

const HSTS_VALUE: &str = "max-age=63072000; includeSubDomains";

/// `Strict-Transport-Security` value applied outside development.
pub fn hsts_header_value() -> HeaderValue {
    HeaderValue::from_static(HSTS_VALUE)
}

/// Redirect plain-HTTP requests to their HTTPS equivalent (307, method
/// preserved). Requests already marked `x-forwarded-proto: https` pass
/// through, as do requests without a `Host` to rebuild the URL from.
pub async fn https_upgrade(req: Request, next: Next) -> Response {
    let forwarded_proto = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok());

    if forwarded_proto == Some("https") {
        return next.run(req).await;
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match host {
        Some(host) => {
            let path_and_query = req
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::temporary(&format!("https://{host}{path_and_query}")).into_response()
        }
        None => next.run(req).await,
    }
}

/// Route server errors to the error page, tagging each with a fresh error
/// scope so the log line and the page the user lands on can be correlated.
pub async fn error_scope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();
    let response = next.run(req).await;

    if !response.status().is_server_error() || path == ERROR_PAGE_PATH {
        return response;
    }

    let scope = Uuid::new_v4();
    tracing::error!(
        error_scope = %scope,
        status = response.status().as_u16(),
        path = %path,
        "request failed; routing to error page"
    );

    let mut redirect = Redirect::to(&format!("{ERROR_PAGE_PATH}?scope={scope}")).into_response();
    if let Ok(value) = HeaderValue::from_str(&scope.to_string()) {
        redirect.headers_mut().insert(ERROR_SCOPE_HEADER, value);
    }
    redirect
}

/// Double-submit antiforgery: safe methods are served and issued a token
/// cookie if they lack one; unsafe methods must echo the cookie in
/// `x-antiforgery-token` or are rejected with 403.
pub async fn antiforgery(req: Request, next: Next) -> Response {
    let safe = matches!(req.method().as_str(), "GET" | "HEAD" | "OPTIONS" | "TRACE");
    let cookie_token = cookie_value(req.headers(), ANTIFORGERY_COOKIE);

    if safe {
        let needs_token = cookie_token.is_none();
        let mut response = next.run(req).await;
        if needs_token {
            let cookie = format!(
                "{ANTIFORGERY_COOKIE}={}; Path=/; SameSite=Strict",
                Uuid::new_v4()
            );
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        return response;
    }

    let header_token = req
        .headers()
        .get(ANTIFORGERY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    match (cookie_token, header_token) {
        (Some(cookie), Some(header)) if !cookie.is_empty() && cookie == header => {
            next.run(req).await
        }
        _ => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "rejected request without a matching antiforgery token"
            );
            (
                StatusCode::FORBIDDEN,
                "antiforgery token missing or mismatched",
            )
                .into_response()
        }
    }
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request as HttpRequest, middleware::from_fn, routing::get, Router};
    use tower::ServiceExt;

    async fn send(router: Router, req: HttpRequest<Body>) -> Response {
        router.oneshot(req).await.expect("infallible")
    }

    #[tokio::test]
    async fn https_upgrade_redirects_plain_requests() {
        let router = Router::new()
            .route("/dash", get(|| async { "ok" }))
            .layer(from_fn(https_upgrade));

        let response = send(
            router,
            HttpRequest::get("/dash?tab=services")
                .header("host", "lumen.example")
                .header("x-forwarded-proto", "http")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://lumen.example/dash?tab=services"
        );
    }

    #[tokio::test]
    async fn https_upgrade_passes_forwarded_https() {
        let router = Router::new()
            .route("/dash", get(|| async { "ok" }))
            .layer(from_fn(https_upgrade));

        let response = send(
            router,
            HttpRequest::get("/dash")
                .header("host", "lumen.example")
                .header("x-forwarded-proto", "https")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn error_scope_routes_server_errors_to_error_page() {
        let router = Router::new()
            .route(
                "/boom",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .layer(from_fn(error_scope));

        let response = send(
            router,
            HttpRequest::get("/boom").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("location header");
        assert!(location.starts_with("/error?scope="));
        assert!(response.headers().contains_key(ERROR_SCOPE_HEADER));
    }

    #[tokio::test]
    async fn error_scope_leaves_success_untouched() {
        let router = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .layer(from_fn(error_scope));

        let response = send(router, HttpRequest::get("/ok").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(ERROR_SCOPE_HEADER));
    }

    #[tokio::test]
    async fn antiforgery_issues_cookie_on_first_get() {
        let router = Router::new()
            .route("/", get(|| async { "page" }))
            .layer(from_fn(antiforgery));

        let response = send(router, HttpRequest::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .expect("set-cookie");
        assert!(cookie.starts_with(ANTIFORGERY_COOKIE));
    }

    #[tokio::test]
    async fn antiforgery_rejects_post_without_token() {
        let router = Router::new()
            .route("/submit", axum::routing::post(|| async { "accepted" }))
            .layer(from_fn(antiforgery));

        let response = send(
            router,
            HttpRequest::post("/submit").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn antiforgery_accepts_matching_cookie_and_header() {
        let router = Router::new()
            .route("/submit", axum::routing::post(|| async { "accepted" }))
            .layer(from_fn(antiforgery));

        let response = send(
            router,
            HttpRequest::post("/submit")
                .header(header::COOKIE, format!("{ANTIFORGERY_COOKIE}=tok-123"))
                .header(ANTIFORGERY_HEADER, "tok-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn antiforgery_rejects_mismatched_tokens() {
        let router = Router::new()
            .route("/submit", axum::routing::post(|| async { "accepted" }))
            .layer(from_fn(antiforgery));

        let response = send(
            router,
            HttpRequest::post("/submit")
                .header(header::COOKIE, format!("{ANTIFORGERY_COOKIE}=tok-123"))
                .header(ANTIFORGERY_HEADER, "tok-456")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
