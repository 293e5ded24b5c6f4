//! Blocking HTTPS execution of core `HttpRequest`s.
//!
//! The agent is built with `http_status_as_error(false)` so 4xx/5xx replies
//! come back as data and `AnvilClient` decides what counts as failure.

use std::time::Duration;

use anvil_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::debug;

pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    /// `timeout` bounds the whole exchange; `None` keeps ureq's defaults.
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Run one request/response exchange. The connection lives only for the
    /// duration of this call.
    pub fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = req.method.as_str(), url = %req.url, "sending request");

        let result = match req.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(req.url.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(req.url.as_str());
                for (name, value) in &req.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match req.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().map_err(transport_error)?;
        debug!(status, body_len = body.len(), "response received");

        Ok(HttpResponse { status, body })
    }
}

fn transport_error(err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Timeout(_) => ApiError::Timeout(err.to_string()),
        other => ApiError::Connection(other.to_string()),
    }
}
