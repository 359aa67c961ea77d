pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Error type crossing the trait boundaries. Implementations are free to
/// return their own error types; `machines_core` maps them to typed errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One request against the machines backend, relative to the backend's base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Endpoint path, e.g. `/get_machine`.
    pub path: String,
    /// Query pairs, unencoded.
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    /// JSON body bytes.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            bearer: None,
            body: Some(body),
        }
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Whatever the server answered, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Transport to the machines backend.
///
/// `Ok` means a response arrived (any status). `Err` means no response:
/// either the request never left or nothing came back.
pub trait Backend: Send + Sync {
    fn execute(&self, request: &ApiRequest) -> Result<Reply, BoxError>;
}

impl<T: Backend + ?Sized> Backend for Box<T> {
    fn execute(&self, request: &ApiRequest) -> Result<Reply, BoxError> {
        (**self).execute(request)
    }
}

impl<T: Backend + ?Sized> Backend for std::sync::Arc<T> {
    fn execute(&self, request: &ApiRequest) -> Result<Reply, BoxError> {
        (**self).execute(request)
    }
}

/// Client-side holder of the opaque session token.
pub trait TokenStore {
    fn load(&self) -> Option<String>;
    fn save(&mut self, token: &str) -> Result<(), BoxError>;
    fn clear(&mut self) -> Result<(), BoxError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builders_collect_query_and_bearer() {
        let req = ApiRequest::get("/get_machine")
            .query("machine_id", "m 1")
            .bearer("tok");
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.query_value("machine_id"), Some("m 1"));
        assert_eq!(req.query_value("other"), None);
        assert_eq!(req.bearer.as_deref(), Some("tok"));
        assert!(req.body.is_none());
    }

    #[test]
    fn reply_success_range() {
        assert!(Reply::new(200, "").is_success());
        assert!(Reply::new(204, "").is_success());
        assert!(!Reply::new(302, "").is_success());
        assert!(!Reply::new(400, "").is_success());
    }
}
