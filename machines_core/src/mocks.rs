//! Test and helper mocks for machines_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use machines_traits::{ApiRequest, Backend, BoxError, Reply, TokenStore};

/// Token store that lives only as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }

    fn save(&mut self, token: &str) -> Result<(), BoxError> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), BoxError> {
        self.token = None;
        Ok(())
    }
}

enum Scripted {
    Reply(Reply),
    Fail(String),
}

#[derive(Default)]
struct ScriptState {
    queue: VecDeque<Scripted>,
    requests: Vec<ApiRequest>,
}

/// Backend that answers from a queue and records every request it saw.
///
/// Clones share the same queue, so a test can keep one handle for
/// inspection and give another to the client. An empty queue answers
/// `200 {}`.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    inner: Arc<Mutex<ScriptState>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_json(&self, status: u16, body: &str) {
        self.lock()
            .queue
            .push_back(Scripted::Reply(Reply::new(status, body)));
    }

    /// Queue a transport failure (no response) as an `std::io::Error`.
    pub fn push_no_response(&self, detail: &str) {
        self.lock()
            .queue
            .push_back(Scripted::Fail(detail.to_string()));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.lock().requests.last().cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ScriptState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Backend for ScriptedBackend {
    fn execute(&self, request: &ApiRequest) -> Result<Reply, BoxError> {
        let mut s = self.lock();
        s.requests.push(request.clone());
        match s.queue.pop_front() {
            Some(Scripted::Reply(r)) => Ok(r),
            Some(Scripted::Fail(detail)) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                detail,
            ))),
            None => Ok(Reply::new(200, "{}")),
        }
    }
}
