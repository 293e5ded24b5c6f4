//! Synchronous API client core for the Anvil transaction-build service.
//!
//! # Overview
//! Builds `HttpRequest` values and checks `HttpResponse` values without
//! touching the network (host-does-IO pattern). The desktop crate executes
//! requests with a blocking HTTP agent; firmware executes them through the
//! C ABI in `anvil-ffi`.
//!
//! # Design
//! - `AnvilClient` is stateless: base URL plus API key.
//! - Each endpoint is a `build_*` / `parse_*` pair, so the I/O boundary is explicit.
//! - Successful response bodies are handed back verbatim as `String`.
//! - `link::wait_for_link` bounds the network bring-up that precedes a call.

pub mod client;
pub mod error;
pub mod http;
pub mod link;
pub mod types;

pub use client::AnvilClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use link::{wait_for_link, LinkPolicy};
pub use types::{Output, SubmitTransactionRequest, TransactionBuildRequest};
