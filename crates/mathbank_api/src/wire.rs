//! Wire coding for problem payloads.
//!
//! # Responsibility
//! - Base64-encode problem content on the way out, so the client can inject
//!   returned markup into its page without transport mangling.
//! - Shape list/search payload objects.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mathbank_core::{KeywordHit, ProblemRecord};
use serde_json::{json, Value};

/// Encodes problem content for the response payload.
pub fn encode_content(content: &str) -> String {
    STANDARD.encode(content.as_bytes())
}

/// Shapes one listed problem as a payload object.
pub fn problem_payload(record: &ProblemRecord) -> Value {
    json!({
        "pid": record.pid,
        "content": encode_content(&record.content),
        "keywords": record.keywords,
    })
}

/// Shapes one search hit as a payload object. Same shape as a listed
/// problem; rank is carried by array order.
pub fn hit_payload(hit: &KeywordHit) -> Value {
    json!({
        "pid": hit.pid,
        "content": encode_content(&hit.content),
        "keywords": hit.keywords,
    })
}
