//! Typed calls against the machines backend.
//!
//! `ApiClient` is cheap to clone: the transport and the settings sit behind
//! `Arc`s and are never mutated after `build`.

use std::sync::Arc;

use machines_traits::{ApiRequest, Backend, Reply};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::command::Command;
use crate::config::ApiSettings;
use crate::error::{ApiError, BuildError};
use crate::model::Machine;
use crate::transport_error::map_backend_error;

#[derive(Clone)]
pub struct ApiClient {
    backend: Arc<dyn Backend>,
    settings: Arc<ApiSettings>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// `{error}` body the backend sends on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginReply {
    token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    msg: Option<String>,
    error: Option<String>,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn new(backend: impl Backend + 'static, settings: ApiSettings) -> Self {
        Self {
            backend: Arc::new(backend),
            settings: Arc::new(settings),
        }
    }

    /// Client over the real HTTP transport described by `settings`.
    #[cfg(feature = "http-errors")]
    pub fn connect(settings: ApiSettings) -> Result<Self, BuildError> {
        let backend = machines_http::HttpBackend::new(&settings.backend_url, settings.timeout)
            .map_err(|e| BuildError::InvalidConfig(e.to_string()))?;
        Ok(Self::new(backend, settings))
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// `POST /login`. Returns the session token.
    pub fn login(&self, phone: &str, password: &str) -> Result<String, ApiError> {
        let body = encode(&json!({ "phone_number": phone, "password": password }))?;
        let reply: LoginReply = self.call_json(&ApiRequest::post("/login", body))?;
        match (reply.token, reply.error) {
            (Some(token), _) if !token.trim().is_empty() => Ok(token),
            (_, Some(error)) => Err(ApiError::Server {
                status: 200,
                message: Some(error),
            }),
            _ => Err(ApiError::Decode("login reply carried no token".into())),
        }
    }

    /// `GET /get_all_machines`.
    pub fn machines(&self, token: &str) -> Result<Vec<Machine>, ApiError> {
        self.call_json(&ApiRequest::get("/get_all_machines").bearer(token))
    }

    /// `GET /get_machine?machine_id=<id>`.
    pub fn machine(&self, token: &str, id: &str) -> Result<Machine, ApiError> {
        self.call_json(
            &ApiRequest::get("/get_machine")
                .query("machine_id", id)
                .bearer(token),
        )
    }

    /// POSTs `{machine_id}` to the command's endpoint. The reply body is
    /// returned as-is; callers must not derive state from it.
    pub fn send_command(&self, token: &str, id: &str, command: Command) -> Result<Reply, ApiError> {
        let body = encode(&json!({ "machine_id": id }))?;
        self.call(&ApiRequest::post(command.endpoint(), body).bearer(token))
    }

    /// `POST /finish_session`. Returns the server's `msg`.
    pub fn finish_session(
        &self,
        token: &str,
        key: &str,
        parking_name: &str,
    ) -> Result<String, ApiError> {
        let body = encode(&json!({ "key": key, "parking_name": parking_name }))?;
        let reply: MessageReply =
            self.call_json(&ApiRequest::post("/finish_session", body).bearer(token))?;
        match (reply.msg, reply.error) {
            (Some(msg), _) => Ok(msg),
            (None, Some(error)) => Err(ApiError::Server {
                status: 200,
                message: Some(error),
            }),
            (None, None) => Ok(String::new()),
        }
    }

    fn call(&self, req: &ApiRequest) -> Result<Reply, ApiError> {
        let reply = self
            .backend
            .execute(req)
            .map_err(|e| map_backend_error(&*e))?;
        if reply.is_success() {
            return Ok(reply);
        }
        let message = serde_json::from_slice::<ErrorBody>(&reply.body)
            .ok()
            .and_then(|b| b.error);
        tracing::debug!(
            path = %req.path,
            status = reply.status,
            error = message.as_deref().unwrap_or(""),
            "backend rejected request"
        );
        Err(ApiError::Server {
            status: reply.status,
            message,
        })
    }

    fn call_json<T: DeserializeOwned>(&self, req: &ApiRequest) -> Result<T, ApiError> {
        let reply = self.call(req)?;
        serde_json::from_slice(&reply.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn encode(value: &serde_json::Value) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value).map_err(|e| ApiError::Request(e.to_string()))
}

#[derive(Default)]
pub struct ApiClientBuilder {
    backend: Option<Arc<dyn Backend>>,
    settings: Option<ApiSettings>,
}

impl ApiClientBuilder {
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn with_settings(mut self, settings: ApiSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<ApiClient, BuildError> {
        let backend = self.backend.ok_or(BuildError::MissingBackend)?;
        let settings = self.settings.unwrap_or_default();
        if settings.timeout.is_zero() {
            return Err(BuildError::InvalidConfig("timeout must be > 0".into()));
        }
        Ok(ApiClient {
            backend,
            settings: Arc::new(settings),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::ScriptedBackend;
    use crate::model::MachineState;
    use machines_traits::Method;

    fn client(backend: &ScriptedBackend) -> ApiClient {
        ApiClient::builder()
            .with_backend(backend.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn builder_requires_backend() {
        assert!(matches!(
            ApiClient::builder().build(),
            Err(BuildError::MissingBackend)
        ));
    }

    #[test]
    fn machine_sends_query_and_bearer() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, r#"{"id":"m1","state":1,"voltage":3.3,"ipAddr":"x"}"#);
        let m = client(&backend).machine("tok", "m1").unwrap();
        assert_eq!(m.state, MachineState::Stopped);

        let req = backend.last_request().unwrap();
        assert_eq!(req.method, Method::Get);
        assert_eq!(req.path, "/get_machine");
        assert_eq!(req.query_value("machine_id"), Some("m1"));
        assert_eq!(req.bearer.as_deref(), Some("tok"));
    }

    #[test]
    fn login_has_no_bearer_and_returns_token() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, r#"{"token":"abc"}"#);
        assert_eq!(client(&backend).login("+1", "pw").unwrap(), "abc");
        let req = backend.last_request().unwrap();
        assert!(req.bearer.is_none());
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["phone_number"], "+1");
        assert_eq!(body["password"], "pw");
    }

    #[test]
    fn login_error_field_in_success_body_surfaces() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, r#"{"error":"wrong password"}"#);
        let err = client(&backend).login("+1", "pw").unwrap_err();
        assert_eq!(err.to_string(), "wrong password");
    }

    #[test]
    fn non_json_error_body_falls_back_to_status() {
        let backend = ScriptedBackend::new();
        backend.push_json(503, "<html>down</html>");
        let err = client(&backend).machines("tok").unwrap_err();
        assert_eq!(err.to_string(), "Request failed with status code 503");
    }

    #[test]
    fn success_with_wrong_shape_is_decode_error() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, r#"{"unexpected":true}"#);
        assert!(matches!(
            client(&backend).machine("tok", "m1"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn finish_session_returns_msg() {
        let backend = ScriptedBackend::new();
        backend.push_json(200, r#"{"msg":"done"}"#);
        let msg = client(&backend).finish_session("tok", "k", "P1").unwrap();
        assert_eq!(msg, "done");
        let req = backend.last_request().unwrap();
        assert_eq!(req.path, "/finish_session");
        assert_eq!(req.bearer.as_deref(), Some("tok"));
    }
}
