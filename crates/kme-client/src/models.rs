//! JSON-RPC framing for the KME listener exchange

use serde::{Deserialize, Serialize};

/// A JSON-RPC 2.0 request to the KME listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

impl RpcRequest {
    /// Build a request for `method` with `params`.
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: 1,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// A JSON-RPC 2.0 response from the KME listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_jsonrpc_framing() {
        let request = RpcRequest::new("GetUniqueVerificationKey", serde_json::json!({"nonce": "00"}));
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "GetUniqueVerificationKey");
        assert_eq!(json["params"]["nonce"], "00");
    }

    #[test]
    fn response_parses_with_missing_optional_fields() {
        let response: RpcResponse = serde_json::from_str(r#"{"result": "ok"}"#).unwrap();
        assert_eq!(response.result, Some(serde_json::json!("ok")));
        assert!(response.error.is_none());

        let response: RpcResponse =
            serde_json::from_str(r#"{"error": {"code": -32000, "message": "nope"}}"#).unwrap();
        assert_eq!(response.error.unwrap().code, -32000);
    }
}
