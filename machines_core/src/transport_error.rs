//! Maps `Box<dyn Error>` from the `Backend` boundary to typed `ApiError`.
//!
//! `machines_traits::Backend` returns boxed errors so any transport can plug
//! in; this module sorts them into "could not build/send" versus "sent but no
//! response", with a feature-gated path for `machines_http::HttpError`.

use crate::error::ApiError;

/// Map a transport-boundary error to a typed `ApiError`.
///
/// Attempts to downcast known transport error types first, then falls back
/// to string-based heuristics.
pub fn map_backend_error(e: &(dyn std::error::Error + 'static)) -> ApiError {
    // Feature-gated: try to downcast to HttpError for precise mapping
    #[cfg(feature = "http-errors")]
    {
        if let Some(http) = e.downcast_ref::<machines_http::HttpError>() {
            return match http {
                machines_http::HttpError::InvalidRequest(m) => ApiError::Request(m.clone()),
                machines_http::HttpError::NoResponse(m) => ApiError::Network(m.clone()),
                machines_http::HttpError::Timeout => ApiError::Network(http.to_string()),
            };
        }
    }

    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return match io.kind() {
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData => {
                ApiError::Request(io.to_string())
            }
            _ => ApiError::Network(io.to_string()),
        };
    }

    classify_message(e.to_string())
}

/// Display prefixes of `machines_http::HttpError`, stable across builds
/// with or without the `http-errors` feature.
const REQUEST_PREFIXES: &[&str] = &["invalid request:"];
const NETWORK_PREFIXES: &[&str] = &["no response:", "request timed out"];

fn classify_message(s: String) -> ApiError {
    let lower = s.to_ascii_lowercase();
    if REQUEST_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return ApiError::Request(s);
    }
    if NETWORK_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return ApiError::Network(s);
    }
    // Unknown transports: only builder-style failures count as request setup.
    if lower.contains("builder") || lower.starts_with("invalid") {
        ApiError::Request(s)
    } else {
        ApiError::Network(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use machines_traits::BoxError;

    fn map(e: BoxError) -> ApiError {
        map_backend_error(&*e)
    }

    #[test]
    fn io_refused_is_network() {
        let e: BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert!(matches!(map(e), ApiError::Network(_)));
    }

    #[test]
    fn io_invalid_input_is_request() {
        let e: BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "bad header",
        ));
        assert!(matches!(map(e), ApiError::Request(_)));
    }

    #[test]
    fn strings_fall_back_on_keywords() {
        assert!(matches!(map("invalid url".into()), ApiError::Request(_)));
        assert!(matches!(map("reset by peer".into()), ApiError::Network(_)));
    }

    #[rstest::rstest]
    #[case("no response: error sending request for url (http://127.0.0.1:9/unlock_machine)")]
    #[case("error sending request for url (http://127.0.0.1:9/get_machines)")]
    #[case("request timed out")]
    #[case("no response: invalid HTTP version parsed")]
    fn unreachable_backend_text_is_network(#[case] text: &str) {
        let e: BoxError = text.into();
        assert_eq!(map(e), ApiError::Network(text.to_string()));
    }

    #[test]
    fn invalid_request_text_is_request() {
        let text = "invalid request: invalid url: relative URL without a base";
        let e: BoxError = text.into();
        assert_eq!(map(e), ApiError::Request(text.to_string()));
    }

    #[cfg(feature = "http-errors")]
    #[test]
    fn http_errors_map_precisely() {
        use machines_http::HttpError;
        let e: BoxError = Box::new(HttpError::InvalidRequest("no scheme".into()));
        assert_eq!(map(e), ApiError::Request("no scheme".into()));
        let e: BoxError = Box::new(HttpError::Timeout);
        assert!(matches!(map(e), ApiError::Network(_)));
    }
}
