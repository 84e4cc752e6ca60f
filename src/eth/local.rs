//! RPC methods answered with the connection's own signer instead of node-managed accounts.

use crate::eth::{
    connection::Connection,
    error::{EthError, Result},
    wait::parse_quantity,
    wallet::Wallet,
};
use alloy_consensus::{SignableTransaction, Signed, TxEnvelope, TypedTransaction};
use alloy_dyn_abi::TypedData;
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Signature, TxKind, U128};
use alloy_rpc_types_eth::TransactionRequest;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Sign a transaction locally and submit it with `eth_sendRawTransaction`.
pub const SEND_TRANSACTION: &str = "eth_sendTransaction";

/// Sign EIP-712 typed data locally.
pub const SIGN_TYPED_DATA: &str = "eth_signTypedData_v4";

/// Fill, sign and submit the transaction object in `params[0]`.
///
/// Missing chain ID, nonce, gas limit and fees are fetched from the node. Returns the node's
/// response to `eth_sendRawTransaction`, normally the transaction hash.
pub async fn send_transaction(connection: &Connection, params: Value) -> Result<Value> {
    let signer = connection.signer()?;

    let tx = params
        .as_array()
        .and_then(|params| params.first())
        .filter(|tx| tx.is_object())
        .ok_or_else(|| {
            EthError::InvalidArgument(format!(
                "{} expects a transaction object as its first parameter",
                SEND_TRANSACTION
            ))
        })?;
    let mut request: TransactionRequest = serde_json::from_value(tx.clone())
        .map_err(|e| EthError::InvalidArgument(format!("Invalid transaction: {}", e)))?;

    let sender = signer.address();
    if let Some(from) = request.from {
        if from != sender {
            return Err(EthError::InvalidArgument(format!(
                "Transaction sender {} does not match signer {}",
                from, sender
            )));
        }
    }
    request.from = Some(sender);
    if request.to.is_none() {
        request.to = Some(TxKind::Create);
    }

    fill(connection, &mut request).await?;

    let tx = request
        .build_typed_tx()
        .map_err(|_| EthError::InvalidArgument("Incomplete transaction request".to_string()))?;
    let envelope = seal(signer.as_ref(), tx)?;
    let raw = format!("0x{}", hex::encode(envelope.encoded_2718()));

    info!(
        tx_hash = %envelope.tx_hash(),
        endpoint = %connection.endpoint(),
        "Submitting locally signed transaction"
    );
    connection.call("eth_sendRawTransaction", json!([raw])).await
}

/// Sign the typed data in `params[1]` on behalf of the address in `params[0]`.
///
/// The typed data may be given as an object or as its JSON encoding.
pub fn sign_typed_data(connection: &Connection, params: Value) -> Result<Value> {
    let signer = connection.signer()?;

    let (address, data): (Address, Value) = serde_json::from_value(params).map_err(|e| {
        EthError::InvalidArgument(format!("{} expects [address, data]: {}", SIGN_TYPED_DATA, e))
    })?;
    if address != signer.address() {
        return Err(EthError::InvalidArgument(format!(
            "Typed data signer {} does not match signer {}",
            address,
            signer.address()
        )));
    }

    let data: TypedData = match data {
        Value::String(encoded) => serde_json::from_str(&encoded),
        other => serde_json::from_value(other),
    }
    .map_err(|e| EthError::InvalidArgument(format!("Invalid typed data: {}", e)))?;
    let hash = data
        .eip712_signing_hash()
        .map_err(|e| EthError::InvalidArgument(format!("Invalid typed data: {}", e)))?;

    debug!(primary_type = %data.primary_type, %hash, "Signing typed data");
    let signature = signer.sign_hash(&hash)?;
    Ok(Value::String(format!("0x{}", hex::encode(signature.as_bytes()))))
}

/// Complete the fields a signed transaction needs from the node.
async fn fill(connection: &Connection, request: &mut TransactionRequest) -> Result<()> {
    if request.chain_id.is_none() {
        request.chain_id = Some(quantity(connection, "eth_chainId", json!([])).await?);
    }

    if request.nonce.is_none() {
        let params = json!([request.from, "pending"]);
        request.nonce = Some(quantity(connection, "eth_getTransactionCount", params).await?);
    }

    if request.gas.is_none() {
        let params = json!([serde_json::to_value(&*request)?]);
        request.gas = Some(quantity(connection, "eth_estimateGas", params).await?);
    }

    let dynamic_fee =
        request.max_fee_per_gas.is_some() || request.max_priority_fee_per_gas.is_some();
    if dynamic_fee {
        let priority = match request.max_priority_fee_per_gas {
            Some(priority) => priority,
            None => fee(connection, "eth_maxPriorityFeePerGas").await?,
        };
        request.max_priority_fee_per_gas = Some(priority);
        if request.max_fee_per_gas.is_none() {
            let base = fee(connection, "eth_gasPrice").await?;
            request.max_fee_per_gas = Some(base.saturating_add(priority));
        }
    } else if request.gas_price.is_none() {
        request.gas_price = Some(fee(connection, "eth_gasPrice").await?);
    }

    debug!(
        chain_id = ?request.chain_id,
        nonce = ?request.nonce,
        gas = ?request.gas,
        "Filled transaction request"
    );
    Ok(())
}

async fn quantity(connection: &Connection, method: &str, params: Value) -> Result<u64> {
    let value = connection.call(method, params).await?;
    parse_quantity(&value)
}

async fn fee(connection: &Connection, method: &str) -> Result<u128> {
    let value = connection.call(method, json!([])).await?;
    U128::deserialize(&value).map(|fee| fee.to::<u128>()).map_err(|e| {
        EthError::ProviderError(format!("Invalid {} response {}: {}", method, value, e))
    })
}

/// Sign a typed transaction and wrap it in its envelope.
fn seal(wallet: &dyn Wallet, tx: TypedTransaction) -> Result<TxEnvelope> {
    match tx {
        TypedTransaction::Legacy(tx) => sign(wallet, tx),
        TypedTransaction::Eip2930(tx) => sign(wallet, tx),
        TypedTransaction::Eip1559(tx) => sign(wallet, tx),
        TypedTransaction::Eip7702(tx) => sign(wallet, tx),
        _ => Err(EthError::InvalidArgument("Blob transactions cannot be signed locally".into())),
    }
}

fn sign<T>(wallet: &dyn Wallet, tx: T) -> Result<TxEnvelope>
where
    T: SignableTransaction<Signature>,
    TxEnvelope: From<Signed<T>>,
{
    let signature = wallet.sign_hash(&tx.signature_hash())?;
    Ok(tx.into_signed(signature).into())
}
