//! The seam between request building and the network.
//!
//! # Design
//! `Transport` executes one prepared `HttpRequest` and hands back the status
//! and body as data. HTTP error statuses are responses, not errors: only a
//! failed round trip (connect, timeout, I/O) returns `TransportError`.
//! Connection pooling and timeouts belong to the implementation and are fixed
//! when it is constructed.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<X: Transport + ?Sized> Transport for &X {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<X: Transport + ?Sized> Transport for Box<X> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<X: Transport + ?Sized> Transport for Arc<X> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a pooled `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    user_agent: Option<String>,
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(Some(config.connect_timeout()))
            .timeout_send_request(Some(config.write_timeout()))
            .timeout_send_body(Some(config.write_timeout()))
            .timeout_recv_response(Some(config.read_timeout()))
            .timeout_recv_body(Some(config.read_timeout()))
            .build()
            .new_agent();
        Self {
            agent,
            user_agent: config.user_agent.clone(),
        }
    }

    fn default_headers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.user_agent.as_deref().map(|ua| ("user-agent", ua)).into_iter()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let headers = self
            .default_headers()
            .chain(request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in headers {
                    builder = builder.header(name, value);
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in headers {
                    builder = builder.header(name, value);
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(TransportError::with_source)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = match response.body_mut().read_to_string() {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(url = %request.url, status, error = %e, "failed to read response body");
                None
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
