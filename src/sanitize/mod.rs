//! Rich-text sanitization for CMS-authored copy.
//!
//! Stored sections may arrive entity-encoded (sometimes twice) after a round
//! trip through the admin forms. [`sanitize`] first reverses a fixed entity
//! table, then parses the result as an HTML fragment and keeps only the
//! presentational subset in [`ALLOWED_TAGS`] with the attributes in
//! [`ALLOWED_ATTRIBUTES`]. Disallowed tags are unwrapped, so their text stays
//! in place; `script` and `style` bodies are dropped along with the tag.

mod entities;
mod policy;

use ammonia::Builder as AmmoniaBuilder;
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use entities::decode_entities;
pub use policy::{ALLOWED_ATTRIBUTES, ALLOWED_TAGS};

static COPY_SANITIZER: Lazy<AmmoniaBuilder<'static>> = Lazy::new(policy::build_copy_sanitizer);

/// Turn a stored rich-text section into HTML safe to inject as-is.
///
/// Absent and empty input both yield an empty string.
pub fn sanitize(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return String::new();
    };

    let decoded = decode_entities(raw);
    COPY_SANITIZER.clean(&decoded).to_string()
}

/// [`sanitize`] for loosely typed payloads: anything but a JSON string renders
/// as an empty string.
pub fn sanitize_value(value: &Value) -> String {
    match value {
        Value::String(raw) => sanitize(Some(raw)),
        Value::Null => String::new(),
        other => {
            debug!(kind = json_kind(other), "Non-string rich text rendered empty");
            String::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
