//! KME client for the WPE worker node
//!
//! A worker talks to the Key Management Enclave listener over JSON-RPC for
//! three exchanges: obtaining a unique verification key during signup,
//! registering itself as a work-order processor, and preprocessing incoming
//! work orders. The [`KmeRequester`] trait captures those exchanges;
//! [`HttpKmeClient`] implements them over HTTP.

pub mod client;
pub mod error;
pub mod models;

pub use client::HttpKmeClient;
pub use error::{KmeClientError, KmeResult};
pub use models::{RpcError, RpcRequest, RpcResponse};

use async_trait::async_trait;

/// Client-side view of the KME listener.
///
/// Retry and timeout policy live behind this trait; callers treat every
/// failure as terminal for the operation at hand.
#[async_trait]
pub trait KmeRequester: Send + Sync {
    /// Request a unique verification key for this worker, authenticated by
    /// `nonce`.
    ///
    /// The successful response is a string of exactly three space-delimited
    /// fields: result status, verification key and verification-key
    /// signature. `Ok(None)` means the KME produced no usable response.
    async fn request_unique_verification_key(&self, nonce: &[u8]) -> KmeResult<Option<String>>;

    /// Register this worker as a work-order processor with the KME.
    async fn register_processor(
        &self,
        verification_key: &str,
        encryption_key: &str,
        proof_data: &str,
        measurement: &str,
    ) -> KmeResult<bool>;

    /// Preprocess a raw work-order request for this worker.
    ///
    /// The returned object contains an `"error"` key when the payload could
    /// not be prepared for this worker.
    async fn preprocess_work_order(
        &self,
        request_json: &str,
        encryption_key: &str,
    ) -> KmeResult<serde_json::Value>;
}
