//! Blocking HTTP client for the catalog API
//!
//! Wraps a single `ureq::Agent` for the whole run. HTTP error statuses are
//! returned as ordinary responses so the caller can compare them against the
//! status it expects.

use crate::multipart::{FilePart, MultipartError};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use ureq::Agent;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: ureq::Error },

    #[error("Failed to read response from {url}: {source}")]
    ReadBody { url: String, source: ureq::Error },

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(FilePart),
}

/// A request relative to the configured base URL
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Delete, endpoint)
    }

    pub fn post_json(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, endpoint).with_body(RequestBody::Json(body))
    }

    pub fn put_json(endpoint: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, endpoint).with_body(RequestBody::Json(body))
    }

    pub fn upload(endpoint: impl Into<String>, part: FilePart) -> Self {
        Self::new(Method::Post, endpoint).with_body(RequestBody::Multipart(part))
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add every `(key, value)` pair of a filter
    pub fn with_filter(mut self, filter: &[(&str, String)]) -> Self {
        for (key, value) in filter {
            self.query.push((key.to_string(), value.clone()));
        }
        self
    }

    fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Status code and raw body of a completed request
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON, or `None` when it is not JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

pub struct ApiClient {
    agent: Agent,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .user_agent(concat!("cinebase-check/", env!("CARGO_PKG_VERSION")))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint such as `actors/42`
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = self.url_for(&request.endpoint);
        log::debug!("{} {} query={:?}", request.method, url, request.query);
        let started = Instant::now();

        let result = match request.method {
            Method::Get => {
                let mut builder = self.agent.get(&url);
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                builder.call()
            }
            Method::Delete => {
                let mut builder = self.agent.delete(&url);
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                builder.call()
            }
            Method::Post | Method::Put => {
                let mut builder = if request.method == Method::Post {
                    self.agent.post(&url)
                } else {
                    self.agent.put(&url)
                };
                for (key, value) in &request.query {
                    builder = builder.query(key, value);
                }
                match &request.body {
                    Some(RequestBody::Json(value)) => {
                        let bytes = serde_json::to_vec(value)?;
                        log::trace!("json body ({} bytes)", bytes.len());
                        builder
                            .header("Content-Type", "application/json")
                            .send(bytes.as_slice())
                    }
                    Some(RequestBody::Multipart(part)) => {
                        let form = part.form()?;
                        log::trace!(
                            "multipart body: {} ({} bytes, boundary {})",
                            part.file_name,
                            part.bytes.len(),
                            form.boundary()
                        );
                        builder.send(form)
                    }
                    None => builder.send_empty(),
                }
            }
        };

        let response = result.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;
        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|source| ClientError::ReadBody {
                url: url.clone(),
                source,
            })?;

        log::debug!(
            "{} {} -> {} in {:?}",
            request.method,
            url,
            status,
            started.elapsed()
        );
        Ok(ApiResponse { status, body })
    }
}
