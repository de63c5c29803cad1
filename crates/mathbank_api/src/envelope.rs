//! Uniform JSON response envelope.
//!
//! # Responsibility
//! - Wrap every endpoint response as `{"success": true, "result": ...}` or
//!   `{"success": false, "error": "..."}`.
//!
//! # Invariants
//! - Serialization never panics; a serializer failure degrades to a fixed
//!   failure envelope.

use serde::Serialize;
use serde_json::Value;

const FALLBACK_FAILURE: &str = r#"{"success":false,"error":"response serialization failed"}"#;

/// Response envelope shared by all endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success { success: bool, result: Value },
    Failure { success: bool, error: String },
}

impl Envelope {
    /// Wraps a result payload in a success envelope.
    pub fn success(result: Value) -> Self {
        Self::Success {
            success: true,
            result,
        }
    }

    /// Wraps an error message in a failure envelope.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            success: false,
            error: error.into(),
        }
    }

    /// Serializes the envelope to its wire form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| FALLBACK_FAILURE.to_string())
    }
}
