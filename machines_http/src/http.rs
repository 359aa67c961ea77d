//! Blocking HTTP transport built on `reqwest`.

use std::time::{Duration, Instant};

use machines_traits::{ApiRequest, Backend, BoxError, Method, Reply};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::error::{HttpError, Result};

/// Talks to a real machines backend over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        // Validate once up front so every later failure is about the request itself.
        Url::parse(base_url)
            .map_err(|e| HttpError::InvalidRequest(format!("invalid backend url: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Absolute URL for `request`, query pairs percent-encoded.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, request.path))
            .map_err(|e| HttpError::InvalidRequest(format!("invalid url: {e}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &request.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    fn send(&self, request: &ApiRequest) -> Result<Reply> {
        let url = self.url_for(request)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        builder = builder.header(CONTENT_TYPE, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let started = Instant::now();
        let response = builder.send().map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(classify)?.to_vec();
        tracing::debug!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend reply"
        );
        Ok(Reply { status, body })
    }
}

impl Backend for HttpBackend {
    fn execute(&self, request: &ApiRequest) -> std::result::Result<Reply, BoxError> {
        self.send(request).map_err(|e| {
            tracing::warn!(path = %request.path, error = %e, "backend request failed");
            Box::new(e) as BoxError
        })
    }
}

fn classify(e: reqwest::Error) -> HttpError {
    if e.is_builder() {
        HttpError::InvalidRequest(e.to_string())
    } else if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::NoResponse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_base_url() {
        let err = HttpBackend::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, HttpError::InvalidRequest(_)));
    }

    #[test]
    fn url_for_encodes_query_and_trims_slash() {
        let backend = HttpBackend::new("http://10.0.0.1:8080/", Duration::from_secs(1)).unwrap();
        let req = ApiRequest::get("/get_machine").query("machine_id", "a b&c");
        let url = backend.url_for(&req).unwrap();
        assert_eq!(
            url.as_str(),
            "http://10.0.0.1:8080/get_machine?machine_id=a+b%26c"
        );
    }

    #[test]
    fn url_for_without_query_has_no_question_mark() {
        let backend = HttpBackend::new("http://10.0.0.1:8080", Duration::from_secs(1)).unwrap();
        let url = backend.url_for(&ApiRequest::get("/get_all_machines")).unwrap();
        assert_eq!(url.as_str(), "http://10.0.0.1:8080/get_all_machines");
    }
}
