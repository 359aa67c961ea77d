use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    /// The request could not be built or sent at all.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Sent (or attempted to connect) but no response arrived.
    #[error("no response: {0}")]
    NoResponse(String),
    #[error("request timed out")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, HttpError>;
