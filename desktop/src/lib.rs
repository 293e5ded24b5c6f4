//! Desktop client for the Anvil transaction-build API.
//!
//! # Overview
//! Pairs the I/O-free `anvil-core` client with a blocking ureq transport and
//! a layered configuration (TOML file, then environment). The `anvil-build`
//! binary sends one build request and prints the reply;
//! [`submit_transaction`] covers the follow-up submit call.

pub mod config;
pub mod transport;

use anvil_core::{AnvilClient, ApiError};

pub use config::Config;
pub use transport::HttpTransport;

/// Send one pre-serialized build request and return the reply body verbatim.
pub fn submit_build_request(
    client: &AnvilClient,
    transport: &HttpTransport,
    body: &str,
) -> Result<String, ApiError> {
    let request = client.build_raw_transaction(body);
    let response = transport.execute(request)?;
    client.parse_build_transaction(response)
}

/// Submit a built transaction with its wallet signatures. Returns the reply
/// (carrying `txId`) verbatim.
pub fn submit_transaction(
    client: &AnvilClient,
    transport: &HttpTransport,
    transaction_hex: &str,
    signatures: &[String],
) -> Result<String, ApiError> {
    let request = client.build_submit(transaction_hex, signatures)?;
    let response = transport.execute(request)?;
    client.parse_submit(response)
}

/// Probe the service health endpoint.
pub fn check_health(client: &AnvilClient, transport: &HttpTransport) -> Result<String, ApiError> {
    let response = transport.execute(client.build_health())?;
    client.parse_health(response)
}
