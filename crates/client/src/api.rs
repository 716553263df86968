//! Typed access to the backend status API consumed by the dashboard.

use serde::Deserialize;

use crate::{ClientError, ClientRegistry, NamedClient};

/// One monitored service as reported by the backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceSummary {
    pub name: String,
    pub status: String,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ServiceSummary {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok") || self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Backend API client, resolved from the named-client registry.
#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: NamedClient,
}

impl ApiClient {
    /// Registry key the backend client is registered under.
    pub const NAME: &'static str = "api";

    pub fn from_registry(registry: &ClientRegistry) -> Result<Self, ClientError> {
        Ok(Self {
            inner: registry.get(Self::NAME)?,
        })
    }

    /// Fetch the service summaries shown on the dashboard.
    pub async fn service_summaries(&self) -> Result<Vec<ServiceSummary>, ClientError> {
        self.inner.get_json("/api/v1/services").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_client_resolves_from_registry() {
        let mut registry = ClientRegistry::new();
        registry
            .register(ApiClient::NAME, "http://api:8080")
            .expect("register");

        let client = ApiClient::from_registry(&registry).expect("resolve");
        assert_eq!(client.inner.name(), "api");
    }

    #[test]
    fn missing_registration_surfaces_as_unknown() {
        let registry = ClientRegistry::new();
        let err = ApiClient::from_registry(&registry).unwrap_err();
        assert!(matches!(err, ClientError::Unknown(_)));
    }

    #[test]
    fn summaries_deserialize_with_optional_fields() {
        let raw = serde_json::json!([
            { "name": "payments", "status": "ok", "latency_ms": 12.5 },
            { "name": "ledger", "status": "degraded" }
        ]);

        let summaries: Vec<ServiceSummary> = serde_json::from_value(raw).expect("deserialize");
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].is_healthy());
        assert!(!summaries[1].is_healthy());
        assert_eq!(summaries[1].latency_ms, None);
        assert_eq!(summaries[1].updated_at, None);
    }
}
