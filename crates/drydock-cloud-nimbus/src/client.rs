//! Nimbus API client
//!
//! Direct client for the Nimbus control-plane REST API. Bearer token
//! authentication, JSON request/response bodies wrapped in the standard
//! `{success, result, errors}` envelope.

use crate::error::{NimbusError, Result};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;

const NIMBUS_API_BASE: &str = "https://api.nimbus.dev/v1";

/// Error code the API uses for a missing entity, regardless of kind.
const API_CODE_NOT_FOUND: i32 = 4004;

/// Nimbus control-plane client
pub struct NimbusClient {
    client: reqwest::Client,
    api_token: String,
    api_base: String,
}

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct NimbusConfig {
    pub api_token: String,
    pub api_base: String,
}

impl NimbusConfig {
    /// Create NimbusConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let api_token = std::env::var("NIMBUS_API_TOKEN")
            .map_err(|_| NimbusError::MissingEnvVar("NIMBUS_API_TOKEN".to_string()))?;
        let api_base =
            std::env::var("NIMBUS_API_BASE").unwrap_or_else(|_| NIMBUS_API_BASE.to_string());

        Ok(Self {
            api_token,
            api_base,
        })
    }

    pub fn new(api_token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            api_base: api_base.into(),
        }
    }
}

impl NimbusClient {
    /// Create a new client
    pub fn new(config: NimbusConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token: config.api_token,
            api_base: config.api_base,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// GET an entity. `Ok(None)` means the entity is absent, whether the
    /// API reported its not-found condition or a success envelope with
    /// an empty payload.
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        tracing::debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        tracing::debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub(crate) async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        tracing::debug!("PUT {}", path);
        let response = self
            .client
            .put(self.url(path))
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;

        Self::decode(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        tracing::debug!("DELETE {}", path);
        let response = self
            .client
            .delete(self.url(path))
            .bearer_auth(&self.api_token)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        if envelope.success {
            return Ok(envelope.result);
        }

        if is_absent(status, &envelope.errors) {
            return Ok(None);
        }

        let (code, message) = envelope
            .errors
            .first()
            .map(|e| (e.code, e.message.clone()))
            .unwrap_or_else(|| (i32::from(status.as_u16()), "unknown error".to_string()));

        Err(NimbusError::Api { code, message })
    }
}

/// The API reports a missing entity as HTTP 404 and/or the dedicated
/// error code; both mean absence.
fn is_absent(status: StatusCode, errors: &[ApiError]) -> bool {
    status == StatusCode::NOT_FOUND || errors.iter().any(|e| e.code == API_CODE_NOT_FOUND)
}

// ============ Envelope Types ============

#[derive(Debug, serde::Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
struct ApiResponse<T> {
    success: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiError {
    code: i32,
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_error(code: i32, message: &str) -> ApiError {
        ApiError {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_is_absent() {
        assert!(is_absent(StatusCode::NOT_FOUND, &[]));
        assert!(is_absent(
            StatusCode::BAD_REQUEST,
            &[api_error(4004, "no such app")]
        ));
        assert!(!is_absent(StatusCode::OK, &[]));
        assert!(!is_absent(
            StatusCode::INTERNAL_SERVER_ERROR,
            &[api_error(5000, "backend unavailable")]
        ));
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": { "pong": true },
                "errors": [],
            })))
            .mount(&server)
            .await;

        let client = NimbusClient::new(NimbusConfig::new("test-token", server.uri()));
        let result: Option<serde_json::Value> = client.get_json("/ping").await.unwrap();
        assert_eq!(result.unwrap()["pong"], true);
    }

    #[tokio::test]
    async fn test_get_json_empty_success_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "result": null,
            })))
            .mount(&server)
            .await;

        let client = NimbusClient::new(NimbusConfig::new("test-token", server.uri()));
        let result: Option<serde_json::Value> = client.get_json("/ping").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_get_json_api_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "success": false,
                "result": null,
                "errors": [{ "code": 5000, "message": "backend unavailable" }],
            })))
            .mount(&server)
            .await;

        let client = NimbusClient::new(NimbusConfig::new("test-token", server.uri()));
        let err = client
            .get_json::<serde_json::Value>("/ping")
            .await
            .unwrap_err();
        match err {
            NimbusError::Api { code, message } => {
                assert_eq!(code, 5000);
                assert_eq!(message, "backend unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
