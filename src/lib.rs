//! eth-provider - Ethereum JSON-RPC provider plugin
//!
//! Resolves network descriptors (chain ID, network name or explicit node URL) to
//! signer-capable connections, forwards JSON-RPC calls, signs locally and waits for
//! transaction confirmations on behalf of a host invocation runtime.

pub mod config;
pub mod error;
pub mod eth;
pub mod plugin;
