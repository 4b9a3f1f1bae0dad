//! HTTP implementation of the KME requester

use crate::error::{KmeClientError, KmeResult};
use crate::models::{RpcRequest, RpcResponse};
use crate::KmeRequester;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const METHOD_GET_UNIQUE_VERIFICATION_KEY: &str = "GetUniqueVerificationKey";
const METHOD_REGISTER_PROCESSOR: &str = "RegisterWorkOrderProcessor";
const METHOD_PREPROCESS_WORK_ORDER: &str = "PreprocessWorkOrder";

/// JSON-RPC client for the KME listener.
pub struct HttpKmeClient {
    listener_url: Url,
    http_client: Client,
}

impl HttpKmeClient {
    /// Create a client for the listener at `url` with the given connect
    /// timeout.
    pub fn new(url: &str, connect_timeout: Duration) -> KmeResult<Self> {
        let listener_url = Url::parse(url).map_err(|e| KmeClientError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let http_client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(connect_timeout)
            .build()?;

        Ok(Self {
            listener_url,
            http_client,
        })
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> KmeResult<RpcResponse> {
        let request = RpcRequest::new(method, params);
        debug!(method, "sending request to KME listener");

        let response = self
            .http_client
            .post(self.listener_url.clone())
            .json(&request)
            .send()
            .await?;
        let body = response.text().await?;

        serde_json::from_str(&body)
            .map_err(|e| KmeClientError::InvalidResponse(format!("{} (body: {})", e, body)))
    }
}

#[async_trait]
impl KmeRequester for HttpKmeClient {
    async fn request_unique_verification_key(&self, nonce: &[u8]) -> KmeResult<Option<String>> {
        let response = self
            .call(
                METHOD_GET_UNIQUE_VERIFICATION_KEY,
                json!({ "nonce": hex::encode(nonce) }),
            )
            .await?;

        if let Some(error) = response.error {
            warn!(code = error.code, message = %error.message,
                "KME rejected verification key request");
            return Ok(None);
        }
        Ok(response.result.and_then(|v| match v {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        }))
    }

    async fn register_processor(
        &self,
        verification_key: &str,
        encryption_key: &str,
        proof_data: &str,
        measurement: &str,
    ) -> KmeResult<bool> {
        let response = self
            .call(
                METHOD_REGISTER_PROCESSOR,
                json!({
                    "verification_key": verification_key,
                    "encryption_key": encryption_key,
                    "proof_data": proof_data,
                    "measurement": measurement,
                }),
            )
            .await?;

        if let Some(error) = response.error {
            warn!(code = error.code, message = %error.message, "KME rejected registration");
            return Ok(false);
        }
        Ok(matches!(
            response.result,
            Some(serde_json::Value::Bool(true))
        ))
    }

    async fn preprocess_work_order(
        &self,
        request_json: &str,
        encryption_key: &str,
    ) -> KmeResult<serde_json::Value> {
        let response = self
            .call(
                METHOD_PREPROCESS_WORK_ORDER,
                json!({
                    "work_order": request_json,
                    "encryption_key": encryption_key,
                }),
            )
            .await?;

        if let Some(error) = response.error {
            return Err(KmeClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        response
            .result
            .ok_or_else(|| KmeClientError::InvalidResponse("missing preprocess result".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> HttpKmeClient {
        HttpKmeClient::new(&server.url(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn verification_key_response_is_returned_as_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": "ok abcKEY sigABC"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client
            .request_unique_verification_key(&[0u8; 32])
            .await
            .unwrap();

        assert_eq!(response, Some("ok abcKEY sigABC".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn null_verification_key_result_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"jsonrpc": "2.0", "id": 1, "result": null}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client
            .request_unique_verification_key(&[0u8; 32])
            .await
            .unwrap();
        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn rpc_error_on_verification_key_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"error": {"code": -32000, "message": "no key available"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let response = client
            .request_unique_verification_key(&[0u8; 32])
            .await
            .unwrap();
        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn registration_returns_result_boolean() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"result": true}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let registered = client
            .register_processor("key", "enc", "proof", "ab".repeat(32).as_str())
            .await
            .unwrap();
        assert!(registered);
    }

    #[tokio::test]
    async fn registration_rpc_error_is_false() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"error": {"code": -32001, "message": "measurement mismatch"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let registered = client
            .register_processor("key", "enc", "proof", "ab")
            .await
            .unwrap();
        assert!(!registered);
    }

    #[tokio::test]
    async fn preprocess_returns_result_object_verbatim() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"result": {"error": "decrypt failed"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let output = client
            .preprocess_work_order(r#"{"bad":true}"#, "enc")
            .await
            .unwrap();
        assert_eq!(output, serde_json::json!({"error": "decrypt failed"}));
    }

    #[tokio::test]
    async fn malformed_body_is_an_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.preprocess_work_order("{}", "enc").await;
        assert!(matches!(result, Err(KmeClientError::InvalidResponse(_))));
    }

    #[test]
    fn invalid_listener_url_is_rejected() {
        let result = HttpKmeClient::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(KmeClientError::InvalidUrl { .. })));
    }
}
