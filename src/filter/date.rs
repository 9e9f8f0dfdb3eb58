//! Timestamp parsing for the `created` / `updated` filters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a timestamp string.
///
/// Accepts RFC 3339, naive date-times (read as UTC) and bare dates
/// (UTC midnight). Anything else is `None`.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse a timestamp stored in a record: strings as [`parse_timestamp`],
/// integers as epoch milliseconds.
pub fn timestamp_of(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

/// True only when both sides parse and the record's time is at or after the
/// threshold. Unparseable input on either side excludes the record.
pub fn is_on_or_after(value: Option<&Value>, threshold: &str) -> bool {
    match (value.and_then(timestamp_of), parse_timestamp(threshold)) {
        (Some(at), Some(threshold)) => at >= threshold,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_accepted_forms() {
        let midnight = parse_timestamp("2023-01-02T00:00:00Z").unwrap();
        assert_eq!(parse_timestamp("2023-01-02"), Some(midnight));
        assert_eq!(parse_timestamp("2023-01-02T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2023-01-02 00:00:00.000"), Some(midnight));
        assert_eq!(parse_timestamp("2023-01-02T02:00:00+02:00"), Some(midnight));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp("not-a-date"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2023-13-01"), None);
    }

    #[test]
    fn test_threshold_comparison() {
        let item = json!("2023-01-02T00:00:00Z");
        assert!(is_on_or_after(Some(&item), "2023-01-01"));
        assert!(is_on_or_after(Some(&item), "2023-01-02"));
        assert!(!is_on_or_after(Some(&item), "2023-01-03"));
        assert!(!is_on_or_after(Some(&item), "not-a-date"));
    }

    #[test]
    fn test_fail_closed_on_item_side() {
        assert!(!is_on_or_after(None, "2023-01-01"));
        assert!(!is_on_or_after(Some(&json!("yesterday")), "2023-01-01"));
        assert!(!is_on_or_after(Some(&json!(true)), "2023-01-01"));
    }

    #[test]
    fn test_epoch_millis() {
        // 2023-01-02T00:00:00Z
        let item = json!(1_672_617_600_000_i64);
        assert!(is_on_or_after(Some(&item), "2023-01-02"));
        assert!(!is_on_or_after(Some(&item), "2023-01-03"));
    }
}
