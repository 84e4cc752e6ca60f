//! Argument types for the plugin methods, in the host's camelCase wire shape.

use crate::eth::{ConnectionDescriptor, EthError, Result};
use serde::{Deserialize, Serialize};

/// Default RPC params when the caller passes none
pub(crate) fn default_params() -> String {
    "[]".to_string()
}

/// Byte payload accepted either as a JSON byte array or as a string.
///
/// Strings prefixed with `0x` are hex-decoded; any other string is taken as UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BytesArg {
    Raw(Vec<u8>),
    Text(String),
}

impl BytesArg {
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            BytesArg::Raw(bytes) => Ok(bytes),
            BytesArg::Text(text) => match text.strip_prefix("0x") {
                Some(digits) => hex::decode(digits)
                    .map_err(|e| EthError::InvalidArgument(format!("Invalid hex payload: {}", e))),
                None => Ok(text.into_bytes()),
            },
        }
    }
}

/// Arguments of `request`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsRequest {
    /// JSON-RPC method name
    pub method: String,
    /// JSON-encoded positional params array
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default)]
    pub connection: Option<ConnectionDescriptor>,
}

/// Arguments of `signMessage`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignMessage {
    pub message: BytesArg,
    #[serde(default)]
    pub connection: Option<ConnectionDescriptor>,
}

/// Arguments of `signTransaction`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignTransaction {
    /// RLP-encoded unsigned transaction
    pub rlp: BytesArg,
    #[serde(default)]
    pub connection: Option<ConnectionDescriptor>,
}

/// Arguments of `signerAddress`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsSignerAddress {
    #[serde(default)]
    pub connection: Option<ConnectionDescriptor>,
}

/// Arguments of `waitForTransaction`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgsWaitForTransaction {
    pub tx_hash: String,
    #[serde(default)]
    pub confirmations: u32,
    /// Timeout in seconds; fractional values are allowed
    #[serde(default)]
    pub timeout: Option<f64>,
    #[serde(default)]
    pub connection: Option<ConnectionDescriptor>,
}
