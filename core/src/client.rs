//! Stateless request builder and response checker for the Anvil API.
//!
//! # Design
//! `AnvilClient` holds only the base URL and the API key. Each endpoint is
//! split into a `build_*` method that produces an `HttpRequest` and a
//! `parse_*` method that consumes the matching `HttpResponse`. The caller
//! executes the round-trip in between, so this crate never touches the
//! network.
//!
//! Response bodies are returned verbatim. The transaction CBOR inside them is
//! meant for a signer further down the line, not for this client.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{SubmitTransactionRequest, TransactionBuildRequest};

pub const BUILD_TRANSACTION_PATH: &str = "/v2/services/transactions/build";
pub const SUBMIT_TRANSACTION_PATH: &str = "/v2/services/transactions/submit";
pub const HEALTH_PATH: &str = "/v2/services/health";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Synchronous, stateless client for the Anvil transaction API.
#[derive(Clone)]
pub struct AnvilClient {
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for AnvilClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnvilClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AnvilClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Serialize `input` and build the transaction-build request for it.
    pub fn build_transaction(&self, input: &TransactionBuildRequest) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.build_raw_transaction(&body))
    }

    /// Build the transaction-build request around an already serialized body.
    /// The body is sent as-is.
    pub fn build_raw_transaction(&self, body: &str) -> HttpRequest {
        let url = format!("{}{BUILD_TRANSACTION_PATH}", self.base_url);
        debug!(%url, body_len = body.len(), "building transaction request");
        HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.json_headers(),
            body: Some(body.to_string()),
        }
    }

    /// Build the submit request for a built transaction and its witnesses.
    pub fn build_submit(
        &self,
        transaction_hex: &str,
        signatures: &[String],
    ) -> Result<HttpRequest, ApiError> {
        let input = SubmitTransactionRequest {
            transaction: transaction_hex.to_string(),
            signatures: signatures.to_vec(),
        };
        let body = serde_json::to_string(&input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let url = format!("{}{SUBMIT_TRANSACTION_PATH}", self.base_url);
        debug!(%url, signatures = signatures.len(), "building submit request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: self.json_headers(),
            body: Some(body),
        })
    }

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}{HEALTH_PATH}", self.base_url),
            headers: vec![(API_KEY_HEADER.to_string(), self.api_key.clone())],
            body: None,
        }
    }

    /// Return the response body unchanged if the status is 2xx.
    pub fn parse_build_transaction(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(response)
    }

    /// Return the submit reply (carrying `txId`) unchanged if the status is 2xx.
    pub fn parse_submit(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(response)
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(response)
    }

    fn json_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (API_KEY_HEADER.to_string(), self.api_key.clone()),
        ]
    }
}

fn check_status(response: HttpResponse) -> Result<String, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }
    warn!(status = response.status, "server rejected request");
    Err(ApiError::HttpStatus {
        status: response.status,
        body: response.body,
    })
}
