//! Response envelopes returned to the dispatch loop

use crate::status::WorkOrderStatus;
use serde_json::json;

/// Build the error envelope `{"error": {"code": .., "message": ..}}`.
pub fn error_response(status: WorkOrderStatus, message: &str) -> serde_json::Value {
    json!({
        "error": {
            "code": status.code(),
            "message": message,
        }
    })
}

/// Whether a preprocessing result signals failure.
pub fn is_error(value: &serde_json::Value) -> bool {
    value.get("error").is_some()
}
