use crate::settings::Settings;

/// Middleware toggles derived once at startup from the deployment
/// environment. Routing code consumes this instead of checking the
/// environment directly, so the decision lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelinePolicy {
    /// Redirect plain-HTTP requests to HTTPS.
    pub https_redirect: bool,
    /// Emit `Strict-Transport-Security` on every response.
    pub hsts: bool,
    /// Intercept 5xx responses and route the client to the error page with a
    /// per-request error scope.
    pub error_page: bool,
}

impl PipelinePolicy {
    /// Development gets the HTTPS upgrade and the framework's raw error
    /// output; every other environment gets HSTS plus the custom error page.
    /// `server.force_https_redirect` overrides the upgrade in either
    /// direction.
    pub fn from_settings(settings: &Settings) -> Self {
        let development = settings.environment.is_development();
        Self {
            https_redirect: settings.server.force_https_redirect.unwrap_or(development),
            hsts: !development,
            error_page: !development,
        }
    }
}
