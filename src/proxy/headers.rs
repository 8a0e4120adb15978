//! Default outbound header set for proxied calls.

use crate::request::{Headers, RequestDescriptor};

pub const ACCEPT: &str = "application/json, text/plain, */*";
pub const ACCEPT_ENCODING: &str = "gzip, deflate, br";
pub const CONNECTION: &str = "keep-alive";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Headers every proxied call starts from.
pub fn default_headers(user_agent: &str) -> Headers {
    Headers::from_iter([
        ("User-Agent", user_agent),
        ("Accept", ACCEPT),
        ("Accept-Encoding", ACCEPT_ENCODING),
        ("Connection", CONNECTION),
    ])
}

/// Defaults overlaid with the caller's headers, plus a JSON Content-Type
/// when the call carries a body and the caller set none.
pub fn external_headers(descriptor: &RequestDescriptor, user_agent: &str) -> Headers {
    let mut headers = default_headers(user_agent);
    headers.extend_from(&descriptor.headers);
    with_json_content_type(headers, descriptor)
}

/// Add `Content-Type: application/json` for body-carrying calls that lack one.
pub fn with_json_content_type(mut headers: Headers, descriptor: &RequestDescriptor) -> Headers {
    if descriptor.method.allows_body()
        && descriptor.body.is_some()
        && !headers.contains_key("content-type")
    {
        headers.insert("Content-Type", JSON_CONTENT_TYPE);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Body, Method};

    const UA: &str = "DevFetch/1.0 (External API Proxy)";

    #[test]
    fn test_defaults_present() {
        let d = RequestDescriptor::new("https://example.com", Method::Get);
        let headers = external_headers(&d, UA);
        assert_eq!(headers.get("user-agent"), Some(UA));
        assert_eq!(headers.get("accept"), Some(ACCEPT));
        assert_eq!(headers.get("accept-encoding"), Some(ACCEPT_ENCODING));
        assert_eq!(headers.get("connection"), Some(CONNECTION));
        assert!(!headers.contains_key("content-type"));
    }

    #[test]
    fn test_caller_headers_override_defaults() {
        let mut d = RequestDescriptor::new("https://example.com", Method::Get);
        d.headers.insert("user-agent", "curl/8.0");
        d.headers.insert("X-Extra", "1");
        let headers = external_headers(&d, UA);
        assert_eq!(headers.get("User-Agent"), Some("curl/8.0"));
        assert_eq!(headers.get("x-extra"), Some("1"));
        assert_eq!(headers.len(), 5);
    }

    #[test]
    fn test_json_content_type_only_with_body() {
        let mut d = RequestDescriptor::new("https://example.com", Method::Post);
        assert!(!external_headers(&d, UA).contains_key("content-type"));

        d.body = Some(Body::Raw("x".into()));
        assert_eq!(
            external_headers(&d, UA).get("content-type"),
            Some(JSON_CONTENT_TYPE)
        );

        d.headers.insert("content-type", "text/plain");
        assert_eq!(
            external_headers(&d, UA).get("Content-Type"),
            Some("text/plain")
        );
    }
}
