//! Reserved attribute names and identity value coercion.

use serde_json::Value;

/// Storage-assigned or caller-assigned document key.
pub const KEY_FIELD: &str = "_key";

/// Derived `collection/key` identity.
pub const ID_FIELD: &str = "_id";

/// Edge source endpoint.
pub const FROM_FIELD: &str = "_from";

/// Edge target endpoint.
pub const TO_FIELD: &str = "_to";

/// Separator between the collection and key halves of an `_id`.
pub const ID_SEPARATOR: char = '/';

/// Names starting with this marker are internal and never treated as
/// extra fields.
pub const RESERVED_PREFIX: char = '_';

/// Returns true when `name` carries the reserved prefix marker.
#[must_use]
pub fn is_reserved_name(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// Reads an identity value (`_key`, `_from`, `_to`) as a string.
///
/// Strings are taken verbatim, `null` means "unset", and any other JSON
/// value is kept in its compact textual form so numeric keys survive.
#[must_use]
pub fn identity_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
