#![allow(dead_code)]

use async_trait::async_trait;
use eth_provider::eth::{Connection, EthError, LocalWallet, Result, RpcTransport, Wallet};
use serde_json::Value;
use std::sync::{Arc, Mutex};

pub const KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";
pub const ADDRESS: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";
pub const TX_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

type Handler = dyn Fn(&str, &Value) -> Result<Value> + Send + Sync;

/// Transport answering calls from a closure and recording every call it sees.
pub struct MockTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&str, &Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        Self { handler: Box::new(handler), calls: Mutex::new(Vec::new()) }
    }

    /// Transport that fails every call with a node error.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_, _| Err(EthError::ProviderError(message.to_string())))
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(m, _)| m == method).count()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let result = (self.handler)(method, &params);
        self.calls.lock().unwrap().push((method.to_string(), params));
        result
    }
}

pub fn wallet() -> Arc<dyn Wallet> {
    Arc::new(LocalWallet::from_private_key(KEY).unwrap())
}

pub fn mock_connection(endpoint: &str, transport: Arc<MockTransport>) -> Connection {
    Connection::new(endpoint, transport, None)
}

pub fn hex_quantity(value: u64) -> Value {
    Value::String(format!("{:#x}", value))
}
