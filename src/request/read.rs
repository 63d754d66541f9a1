//! Lenient readers for request headers, paths and query strings.
//!
//! Missing or unparsable input yields the zero value (`0`, `""`, `None`);
//! handlers validate the result instead of the raw text.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use http::{HeaderMap, Uri};
use url::form_urlencoded;

fn first_header<'a>(headers: &'a HeaderMap, key: &str) -> Option<&'a str> {
    headers.get(key).and_then(|v| v.to_str().ok())
}

/// The first value of `key` parsed as a u64, else 0.
pub fn read_u64_header(headers: &HeaderMap, key: &str) -> u64 {
    first_header(headers, key).map(parse_u64).unwrap_or(0)
}

/// The first value of `key` parsed with a chrono `format`, read as UTC.
/// Date-only formats resolve to midnight.
pub fn read_time_header(headers: &HeaderMap, format: &str, key: &str) -> Option<DateTime<Utc>> {
    let raw = first_header(headers, key)?;
    if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, format)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// The path element immediately after `label`, else "".
pub fn read_path_element<'a>(raw_path: &'a str, label: &str) -> &'a str {
    let mut elements = raw_path.split('/');
    while let Some(element) = elements.next() {
        if element == label {
            return elements.next().unwrap_or("");
        }
    }
    ""
}

/// The path element after `label` parsed as a u64, else 0.
pub fn read_numeric_path_element(raw_path: &str, label: &str) -> u64 {
    parse_u64(read_path_element(raw_path, label))
}

/// All values of `key` in the query string, in order.
pub fn query_values(uri: &Uri, key: &str) -> Vec<String> {
    let query = uri.query().unwrap_or("");
    form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

/// The first value of `key` in the query string, else "".
pub fn query_value(uri: &Uri, key: &str) -> String {
    query_values(uri, key).into_iter().next().unwrap_or_default()
}

// Digits only: `u64::from_str` would also accept a leading '+'.
fn parse_u64(raw: &str) -> u64 {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return 0;
    }
    raw.parse().unwrap_or(0)
}
