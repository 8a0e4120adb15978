//! Transport failure taxonomy.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Wire-level classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    DnsError,
    TimeoutError,
    ConnectionRefused,
    FetchError,
    UnknownError,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorType::DnsError => "DNS_ERROR",
            ErrorType::TimeoutError => "TIMEOUT_ERROR",
            ErrorType::ConnectionRefused => "CONNECTION_REFUSED",
            ErrorType::FetchError => "FETCH_ERROR",
            ErrorType::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while performing a single HTTP call.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Host name could not be resolved.
    #[error("DNS lookup failed: {0}")]
    Dns(String),

    /// Call exceeded its fixed budget.
    #[error("request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// Target actively refused the connection.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    /// Any other network-level failure (reset, TLS, broken body, redirect loop).
    #[error("{0}")]
    Fetch(String),

    /// Failure that is not network related (bad header, client setup).
    #[error("{0}")]
    Unknown(String),
}

impl TransportError {
    pub fn error_type(&self) -> ErrorType {
        match self {
            TransportError::Dns(_) => ErrorType::DnsError,
            TransportError::Timeout(_) => ErrorType::TimeoutError,
            TransportError::ConnectionRefused(_) => ErrorType::ConnectionRefused,
            TransportError::Fetch(_) => ErrorType::FetchError,
            TransportError::Unknown(_) => ErrorType::UnknownError,
        }
    }

    /// Classify a reqwest failure by walking its cause chain.
    pub fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        let cause = root_cause(&err);
        if err.is_timeout() {
            return TransportError::Timeout(timeout);
        }
        match classify_chain(&err) {
            Some(ErrorType::TimeoutError) => TransportError::Timeout(timeout),
            Some(ErrorType::ConnectionRefused) => TransportError::ConnectionRefused(cause),
            Some(ErrorType::DnsError) => TransportError::Dns(cause),
            _ if err.is_builder() => TransportError::Unknown(err.to_string()),
            _ if err.is_connect()
                || err.is_request()
                || err.is_body()
                || err.is_decode()
                || err.is_redirect() =>
            {
                TransportError::Fetch(err.to_string())
            }
            _ => TransportError::Unknown(err.to_string()),
        }
    }
}

/// Inspect every error in the chain for a recognisable low-level cause.
///
/// I/O error kinds are checked first; resolver failures only surface as
/// text from the connector, so those are matched on their message.
pub fn classify_chain(err: &(dyn StdError + 'static)) -> Option<ErrorType> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    let mut dns = false;
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused => return Some(ErrorType::ConnectionRefused),
                io::ErrorKind::TimedOut => return Some(ErrorType::TimeoutError),
                _ => {}
            }
        }
        if mentions_dns(&e.to_string()) {
            dns = true;
        }
        current = e.source();
    }
    dns.then_some(ErrorType::DnsError)
}

fn mentions_dns(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    [
        "dns error",
        "failed to lookup address",
        "name or service not known",
        "no such host",
        "nodename nor servname",
        "temporary failure in name resolution",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

fn root_cause(err: &(dyn StdError + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrapped {
        message: &'static str,
        source: Option<io::Error>,
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.message)
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[test]
    fn test_connection_refused_from_io_kind() {
        let err = Wrapped {
            message: "tcp connect error",
            source: Some(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")),
        };
        assert_eq!(classify_chain(&err), Some(ErrorType::ConnectionRefused));
    }

    #[test]
    fn test_dns_from_connector_message() {
        let err = Wrapped {
            message: "dns error",
            source: Some(io::Error::new(
                io::ErrorKind::Other,
                "failed to lookup address information: Name or service not known",
            )),
        };
        assert_eq!(classify_chain(&err), Some(ErrorType::DnsError));
    }

    #[test]
    fn test_timed_out_io_kind() {
        let err = io::Error::new(io::ErrorKind::TimedOut, "operation timed out");
        assert_eq!(classify_chain(&err), Some(ErrorType::TimeoutError));
    }

    #[test]
    fn test_unrecognised_chain() {
        let err = io::Error::new(io::ErrorKind::ConnectionReset, "connection reset by peer");
        assert_eq!(classify_chain(&err), None);
    }

    #[test]
    fn test_error_type_wire_names() {
        assert_eq!(
            serde_json::to_value(ErrorType::DnsError).unwrap(),
            serde_json::json!("DNS_ERROR")
        );
        assert_eq!(
            serde_json::to_value(ErrorType::ConnectionRefused).unwrap(),
            serde_json::json!("CONNECTION_REFUSED")
        );
        assert_eq!(ErrorType::TimeoutError.to_string(), "TIMEOUT_ERROR");
    }

    #[test]
    fn test_timeout_display() {
        let err = TransportError::Timeout(Duration::from_secs(15));
        assert_eq!(err.to_string(), "request timed out after 15 seconds");
        assert_eq!(err.error_type(), ErrorType::TimeoutError);
    }
}
