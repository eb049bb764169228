use crate::domain::ports::{HttpResponse, HttpTransport};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// `HttpTransport` backed by a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse> {
        tracing::debug!("Making API request to: {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EtlError::input(format!("request to {} timed out after {:?}", url, timeout))
                } else {
                    EtlError::input(format!("request to {} failed: {}", url, e))
                }
            })?;

        let status = response.status().as_u16();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_get_returns_status_and_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/item");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"name": "Item", "value": 3}));
        });

        let transport = ReqwestTransport::new();
        let response = transport
            .get(&server.url("/item"), Duration::from_secs(5))
            .await
            .unwrap();

        api_mock.assert();
        assert!(response.is_success());
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["value"], 3);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(500);
        });

        let transport = ReqwestTransport::new();
        let response = transport
            .get(&server.url("/broken"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_connection_failure_is_input_error() {
        let transport = ReqwestTransport::new();
        let err = transport
            .get("http://127.0.0.1:1/unreachable", Duration::from_secs(2))
            .await
            .unwrap_err();

        assert!(err.is_input_error());
    }
}
