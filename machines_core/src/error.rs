use thiserror::Error;

use crate::command::Command;
use crate::model::MachineState;
use crate::route::Route;

/// Shown when the backend could not be reached at all.
pub const NO_RESPONSE_MESSAGE: &str =
    "No response received from the server. Please try again later.";
/// Shown when a view fails to load its data, whatever the cause.
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch machines data";

/// Failure of one backend call. `Display` is the one-line message shown to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("{}", server_message(.status, .message))]
    Server { status: u16, message: Option<String> },
    /// The request went out but no response came back.
    #[error("{}", NO_RESPONSE_MESSAGE)]
    Network(String),
    /// The request could not be built or sent.
    #[error("Request setup error: {0}")]
    Request(String),
    /// A success response whose body did not have the expected shape.
    #[error("Unexpected response from the server: {0}")]
    Decode(String),
}

fn server_message(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(m) => m.clone(),
        None => format!("Request failed with status code {status}"),
    }
}

impl ApiError {
    /// Underlying diagnostic, for logs rather than for the user.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Server { status, message } => {
                format!("status {status}: {}", message.as_deref().unwrap_or("<no error body>"))
            }
            ApiError::Network(d) | ApiError::Request(d) | ApiError::Decode(d) => d.clone(),
        }
    }
}

/// Outcome of a view that could not show its normal content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
    #[error("login required")]
    LoginRequired,
    #[error("Machine Id is incorrect")]
    MissingMachineId,
    #[error("missing parameter `{0}`")]
    MissingParam(&'static str),
    #[error("{command} is not available while the machine is {state}")]
    CommandDisabled {
        command: Command,
        state: MachineState,
    },
    #[error("{}", FETCH_FAILED_MESSAGE)]
    LoadFailed(#[source] ApiError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session storage error: {0}")]
    Session(String),
}

impl ViewError {
    /// Where the front-end should navigate instead of rendering an error.
    pub fn redirect(&self) -> Option<Route> {
        match self {
            ViewError::LoginRequired => Some(Route::Login),
            _ => None,
        }
    }

    /// The backend failure behind this error, if any.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ViewError::LoadFailed(e) | ViewError::Api(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing backend")]
    MissingBackend,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ViewError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_with_body_shows_body_message() {
        let e = ApiError::Server {
            status: 400,
            message: Some("X".into()),
        };
        assert_eq!(e.to_string(), "X");
    }

    #[test]
    fn server_error_without_body_shows_status() {
        let e = ApiError::Server {
            status: 502,
            message: None,
        };
        assert_eq!(e.to_string(), "Request failed with status code 502");
    }

    #[test]
    fn network_error_hides_detail() {
        let e = ApiError::Network("connection refused".into());
        assert_eq!(e.to_string(), NO_RESPONSE_MESSAGE);
        assert_eq!(e.detail(), "connection refused");
    }

    #[test]
    fn load_failed_is_generic_but_keeps_source() {
        let e = ViewError::LoadFailed(ApiError::Network("x".into()));
        assert_eq!(e.to_string(), FETCH_FAILED_MESSAGE);
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.redirect().is_none());
        assert_eq!(ViewError::LoginRequired.redirect(), Some(Route::Login));
    }
}
