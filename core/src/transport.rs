//! The I/O seam between request building and response parsing.
//!
//! Everything in `client` is pure; a `Transport` is the only component that
//! talks to the network. `UreqTransport` is the blocking default, tests plug
//! in an in-memory fake.

use tracing::debug;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as data rather than `Err`,
/// so status interpretation stays in the client parsers. `Err` is reserved
/// for transport failures and should be `ApiError::Connection`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with default timeouts that reports 4xx/5xx as responses.
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a caller-configured agent. It must have
    /// `http_status_as_error(false)` or 404s surface as connection errors.
    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Head => {
                let mut builder = self.agent.head(url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
        };
        let mut response = result.map_err(|e| ApiError::Connection(e.to_string()))?;

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
        let body = match request.method {
            HttpMethod::Head => Vec::new(),
            HttpMethod::Get => response
                .body_mut()
                .read_to_vec()
                .map_err(|e| ApiError::Connection(e.to_string()))?,
        };

        debug!(method = request.method.as_str(), url, status, bytes = body.len(), "http round-trip");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
