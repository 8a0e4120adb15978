//! Turns raw composer input into a [`RequestDescriptor`].

use serde_json::Value;

use crate::request::types::{Body, HeaderRow, Headers, Method, RequestDescriptor};

/// Build the canonical descriptor for one request.
///
/// The URL is carried through untouched; reachability and syntax are the
/// dispatcher's concern.
pub fn normalize(
    raw_url: &str,
    method: Method,
    header_rows: &[HeaderRow],
    raw_body: &str,
) -> RequestDescriptor {
    RequestDescriptor {
        url: raw_url.to_string(),
        method,
        headers: collapse_headers(header_rows),
        body: parse_body(method, raw_body),
    }
}

/// Keep enabled rows with a key and a value; later duplicates overwrite earlier ones.
pub fn collapse_headers(rows: &[HeaderRow]) -> Headers {
    rows.iter()
        .filter(|row| row.is_active())
        .map(|row| (row.key.clone(), row.value.clone()))
        .collect()
}

/// Body for body-carrying methods only. Text that parses as JSON is stored
/// parsed, anything else is kept verbatim. A JSON string literal is stored
/// as its unquoted text so it goes out without quotes.
pub fn parse_body(method: Method, raw_body: &str) -> Option<Body> {
    if !method.allows_body() || raw_body.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw_body) {
        Ok(Value::String(text)) => Some(Body::Raw(text)),
        Ok(value) => Some(Body::Json(value)),
        Err(_) => Some(Body::Raw(raw_body.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inactive_rows_are_dropped() {
        let rows = vec![
            HeaderRow::new("A", "1"),
            HeaderRow::new("", "2"),
            HeaderRow::new("B", ""),
            HeaderRow::new("C", "3").disabled(),
        ];
        let headers = collapse_headers(&rows);
        assert_eq!(headers, Headers::from_iter([("A", "1")]));
    }

    #[test]
    fn test_later_duplicate_wins() {
        let rows = vec![
            HeaderRow::new("X-Token", "first"),
            HeaderRow::new("Accept", "text/plain"),
            HeaderRow::new("X-Token", "second"),
        ];
        let headers = collapse_headers(&rows);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("x-token"), Some("second"));
    }

    #[test]
    fn test_body_dropped_for_bodiless_methods() {
        for method in [Method::Get, Method::Delete, Method::Head, Method::Options] {
            let d = normalize("http://localhost:5000/x", method, &[], "hello");
            assert!(d.body.is_none(), "{method} should not carry a body");
        }
    }

    #[test]
    fn test_json_body_is_parsed() {
        let d = normalize("http://localhost:5000/x", Method::Post, &[], r#"{"a":1}"#);
        assert_eq!(d.body, Some(Body::Json(json!({"a": 1}))));
    }

    #[test]
    fn test_non_json_body_kept_raw() {
        let d = normalize("http://localhost:5000/x", Method::Put, &[], "not json");
        assert_eq!(d.body, Some(Body::Raw("not json".into())));
    }

    #[test]
    fn test_json_string_literal_sent_unquoted() {
        let d = normalize("http://localhost:5000/x", Method::Post, &[], r#""hello""#);
        assert_eq!(d.body, Some(Body::Raw("hello".into())));
        assert_eq!(d.body.unwrap().to_wire().unwrap(), "hello");
    }

    #[test]
    fn test_empty_body_is_absent() {
        let d = normalize("http://localhost:5000/x", Method::Patch, &[], "");
        assert!(d.body.is_none());
    }

    #[test]
    fn test_url_passed_through() {
        let d = normalize("not a url", Method::Get, &[], "");
        assert_eq!(d.url, "not a url");
    }
}
