//! Request payload for the transaction-build endpoint.
//!
//! Amounts and addresses are not validated here; the server owns that.

use serde::{Deserialize, Serialize};

/// Body of `POST /v2/services/transactions/build`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBuildRequest {
    /// Address that receives whatever value is left after paying `outputs`.
    pub change_address: String,
    pub outputs: Vec<Output>,
}

/// A single payment output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Output {
    pub address: String,
    pub lovelace: u64,
}

impl TransactionBuildRequest {
    /// A request paying `lovelace` to `address`, returning change to `change_address`.
    pub fn single_payment(
        change_address: impl Into<String>,
        address: impl Into<String>,
        lovelace: u64,
    ) -> Self {
        Self {
            change_address: change_address.into(),
            outputs: vec![Output {
                address: address.into(),
                lovelace,
            }],
        }
    }
}

/// Body of `POST /v2/services/transactions/submit`.
///
/// `transaction` is the hex CBOR returned by the build endpoint; `signatures`
/// are hex witness sets produced by an external wallet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitTransactionRequest {
    pub transaction: String,
    pub signatures: Vec<String>,
}
