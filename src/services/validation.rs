use serde_json::Value;

use crate::errors::{ApiError, FieldError};
use crate::state::items::ItemName;

const NAME_FIELD: &str = "name";

/// Replace markup-significant characters with their entity equivalents.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            other => out.push(other),
        }
    }
    out
}

/// Inverse of [`escape_html`], for putting a stored name back into an input.
pub fn unescape_html(input: &str) -> String {
    const ENTITIES: [(&str, char); 8] = [
        ("&amp;", '&'),
        ("&quot;", '"'),
        ("&#x27;", '\''),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&#x2F;", '/'),
        ("&#x5C;", '\\'),
        ("&#96;", '`'),
    ];

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(*entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Check and sanitize the `name` field of a write payload.
///
/// The name is trimmed, must be a non-empty string and is stored escaped.
/// Anything else is a validation error and the write is not attempted.
pub fn validate_name(payload: &Value) -> Result<ItemName, ApiError> {
    let raw = match payload.get(NAME_FIELD) {
        None | Some(Value::Null) => {
            return Err(rejected(None, "Name is required"));
        }
        Some(Value::String(s)) => s,
        Some(other @ (Value::Array(_) | Value::Object(_))) => {
            return Err(rejected(Some(other.clone()), "Name must be a single string"));
        }
        Some(other) => {
            return Err(rejected(Some(other.clone()), "Name must be a string"));
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(rejected(
            Some(Value::String(String::new())),
            "Name must not be empty",
        ));
    }

    Ok(ItemName::from_sanitized(escape_html(trimmed)))
}

fn rejected(value: Option<Value>, msg: &str) -> ApiError {
    ApiError::Validation(vec![FieldError::body(NAME_FIELD, value, msg)])
}
