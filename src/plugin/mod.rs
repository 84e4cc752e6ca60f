//! Host-facing module exposing RPC access, signing and confirmation waiting.
//!
//! Every method resolves its connection first: the call's own descriptor, then the
//! host env descriptor, then the resolver default.

mod types;

pub use types::{
    ArgsRequest, ArgsSignMessage, ArgsSignTransaction, ArgsSignerAddress, ArgsWaitForTransaction,
    BytesArg,
};

use crate::eth::{
    self, ConfirmationWaiter, Connection, ConnectionDescriptor, Connections, EthError, Result,
    SEND_TRANSACTION, SIGN_TYPED_DATA, WaitConfig,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Plugin method names as the host invokes them.
pub const METHODS: [&str; 5] =
    ["request", "signMessage", "signTransaction", "signerAddress", "waitForTransaction"];

/// Ethereum provider plugin module.
#[derive(Debug)]
pub struct EthereumProviderPlugin {
    connections: Connections,
    wait: WaitConfig,
    env: Option<ConnectionDescriptor>,
}

impl EthereumProviderPlugin {
    pub fn new(connections: Connections) -> Self {
        Self { connections, wait: WaitConfig::default(), env: None }
    }

    /// Override poll intervals and the default wait timeout.
    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Descriptor used when a call carries none of its own.
    pub fn with_env(mut self, env: ConnectionDescriptor) -> Self {
        self.env = Some(env);
        self
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    fn connection(&self, descriptor: Option<&ConnectionDescriptor>) -> Result<Connection> {
        self.connections.resolve(descriptor.or(self.env.as_ref()))
    }

    /// Send a JSON-RPC request through the resolved connection.
    ///
    /// `eth_sendTransaction` and `eth_signTypedData_v4` are signed with the connection's
    /// signer; everything else is passed through. Returns the JSON-encoded `result`; node
    /// errors are returned verbatim.
    pub async fn request(&self, args: ArgsRequest) -> Result<String> {
        let connection = self.connection(args.connection.as_ref())?;
        let params = args.params.unwrap_or_else(types::default_params);
        let params: Value = serde_json::from_str(&params)
            .map_err(|e| EthError::InvalidArgument(format!("Invalid params: {}", e)))?;

        debug!(method = %args.method, endpoint = %connection.endpoint(), "Handling RPC request");
        let result = match args.method.as_str() {
            SEND_TRANSACTION => eth::send_transaction(&connection, params).await?,
            SIGN_TYPED_DATA => eth::sign_typed_data(&connection, params)?,
            method => connection.call(method, params).await?,
        };

        Ok(serde_json::to_string(&result)?)
    }

    /// Sign a message (EIP-191) and return the hex signature.
    pub fn sign_message(&self, args: ArgsSignMessage) -> Result<String> {
        let connection = self.connection(args.connection.as_ref())?;
        let message = args.message.into_bytes()?;
        let signature = connection.signer()?.sign_message(&message)?;

        Ok(format!("0x{}", hex::encode(signature)))
    }

    /// Sign a serialized unsigned transaction and return the hex signature.
    pub fn sign_transaction(&self, args: ArgsSignTransaction) -> Result<String> {
        let connection = self.connection(args.connection.as_ref())?;
        let rlp = args.rlp.into_bytes()?;
        let signature = connection.signer()?.sign_transaction(&rlp)?;

        Ok(format!("0x{}", hex::encode(signature)))
    }

    /// Address of the signer, or `None` when no signer is configured.
    pub fn signer_address(&self, args: ArgsSignerAddress) -> Result<Option<String>> {
        let connection = self.connection(args.connection.as_ref())?;
        match connection.signer() {
            Ok(signer) => Ok(Some(signer.address().to_checksum(None))),
            Err(EthError::SignerMissing) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Wait until a transaction is mined with the requested confirmations.
    pub async fn wait_for_transaction(&self, args: ArgsWaitForTransaction) -> Result<bool> {
        let connection = self.connection(args.connection.as_ref())?;
        let timeout = match args.timeout {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                EthError::InvalidArgument(format!("Invalid timeout {}: {}", secs, e))
            })?,
            None => self.wait.default_timeout(),
        };

        ConfirmationWaiter::new(&connection, &self.wait)
            .wait(&args.tx_hash, u64::from(args.confirmations), timeout)
            .await
    }

    /// Invoke a plugin method by name with JSON arguments, returning a JSON result.
    pub async fn invoke(&self, method: &str, args: Value) -> Result<Value> {
        debug!(method = %method, "Invoking plugin method");
        match method {
            "request" => Ok(Value::String(self.request(parse_args(args)?).await?)),
            "signMessage" => Ok(Value::String(self.sign_message(parse_args(args)?)?)),
            "signTransaction" => Ok(Value::String(self.sign_transaction(parse_args(args)?)?)),
            "signerAddress" => {
                Ok(self.signer_address(parse_args(args)?)?.map_or(Value::Null, Value::String))
            },
            "waitForTransaction" => {
                Ok(Value::Bool(self.wait_for_transaction(parse_args(args)?).await?))
            },
            other => Err(EthError::UnknownMethod(other.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T> {
    // hosts send `null` for methods without arguments
    let args = if args.is_null() { Value::Object(Default::default()) } else { args };
    serde_json::from_value(args).map_err(|e| EthError::InvalidArgument(e.to_string()))
}
