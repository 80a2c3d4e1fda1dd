//! The I/O seam between accessors and the network.
//!
//! # Design
//! `Transport` executes one `HttpRequest` and returns the matching
//! `HttpResponse`. Status codes are data: a 404 or 500 is a successful
//! round-trip as far as the transport is concerned. Only failures that
//! prevent a response from existing become `TransportError`.

use std::fmt;
use std::time::Duration;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes requests built by the accessors.
///
/// Implementations are shared by every accessor of a client and may be
/// called from several threads at once.
pub trait Transport: Send + Sync + fmt::Debug {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Largest response body `UreqTransport` reads by default, 64 MiB.
pub const DEFAULT_BODY_LIMIT: u64 = 64 * 1024 * 1024;

/// Blocking transport backed by a `ureq` agent.
///
/// Building one performs no network I/O; connections are opened by the
/// first request. A response body larger than the body limit (default
/// `DEFAULT_BODY_LIMIT`) fails with a `TransportError` naming the limit,
/// which bounds how large a `find_many` result can get.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: String,
    body_limit: u64,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>, user_agent: impl Into<String>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: user_agent.into(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn body_limit(mut self, limit: u64) -> Self {
        self.body_limit = limit;
        self
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    user_agent: &str,
) -> ureq::RequestBuilder<B> {
    builder = builder.header("user-agent", user_agent);
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = &request.headers;
        let ua = self.user_agent.as_str();

        let result = match (request.method, request.body.as_deref()) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers, ua).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers, ua).call(),
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), headers, ua).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers, ua).send_empty(),
            (HttpMethod::Patch, Some(body)) => {
                with_headers(self.agent.patch(url), headers, ua).send(body.as_bytes())
            }
            (HttpMethod::Patch, None) => {
                with_headers(self.agent.patch(url), headers, ua).send_empty()
            }
        };

        let mut response = result.map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()
            .map_err(|e| {
                TransportError::new(format!(
                    "reading response body (limit {} bytes): {e}",
                    self.body_limit
                ))
            })?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
