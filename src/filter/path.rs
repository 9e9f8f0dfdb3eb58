//! Dotted attribute paths over JSON records.

use serde_json::Value;
use std::borrow::Cow;

/// Resolve a dot-separated path inside a record.
///
/// Returns `None` when the root is null, when any segment is missing, or when
/// an intermediate value is not an object. The empty path resolves to the
/// record itself.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    if record.is_null() {
        return None;
    }
    if path.is_empty() {
        return Some(record);
    }
    path.split('.')
        .try_fold(record, |current, segment| current.as_object()?.get(segment))
}

/// Render a resolved value as the text substring filters compare against.
///
/// Missing and null values render as `""`; arrays join their elements with
/// `,`; objects render as compact JSON.
pub fn stringify_value(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s),
        Some(Value::Bool(b)) => Cow::Owned(b.to_string()),
        Some(Value::Number(n)) => Cow::Owned(n.to_string()),
        Some(Value::Array(items)) => Cow::Owned(
            items
                .iter()
                .map(|v| stringify_value(Some(v)))
                .collect::<Vec<_>>()
                .join(","),
        ),
        Some(obj @ Value::Object(_)) => Cow::Owned(obj.to_string()),
    }
}

/// Case-insensitive substring test.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    contains_folded(haystack, &needle.to_lowercase())
}

/// Substring test against a needle that is already lowercase.
pub(crate) fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}

/// Case-insensitive equality.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
