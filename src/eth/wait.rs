//! Waiting for a transaction to be mined and confirmed.

use crate::eth::{
    config::WaitConfig,
    connection::Connection,
    error::{EthError, Result},
};
use alloy_primitives::U64;
use serde::Deserialize;
use serde_json::{Value, json};
use std::{future::Future, time::Duration};
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, info, warn};

/// Deadline used when `timeout` does not fit the clock, roughly 30 years out.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Phases of a confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    /// Waiting for the transaction to appear in a block
    PollingReceipt,
    /// Waiting for the chain head to reach `target_block`
    PollingConfirmations { target_block: u64 },
    /// Target reached
    Done,
    /// Deadline passed in either polling phase
    TimedOut,
}

/// The part of a transaction receipt the waiter reads.
///
/// Pending receipts carry a null `blockNumber`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptBlock {
    #[serde(default)]
    block_number: Option<U64>,
}

/// Polls a connection until a transaction has the requested number of confirmations.
pub struct ConfirmationWaiter<'a> {
    connection: &'a Connection,
    receipt_poll_interval: Duration,
    confirmation_poll_interval: Duration,
}

impl<'a> ConfirmationWaiter<'a> {
    pub fn new(connection: &'a Connection, config: &WaitConfig) -> Self {
        Self {
            connection,
            receipt_poll_interval: config.receipt_poll_interval(),
            confirmation_poll_interval: config.confirmation_poll_interval(),
        }
    }

    /// Wait until `tx_hash` is mined and the head is `confirmations` blocks past it.
    ///
    /// `timeout` covers both phases and is measured from the start of the call. Provider
    /// errors abort the wait immediately.
    pub async fn wait(&self, tx_hash: &str, confirmations: u64, timeout: Duration) -> Result<bool> {
        let started = Instant::now();
        let deadline = started.checked_add(timeout).unwrap_or_else(|| started + FAR_FUTURE);
        let mut state = WaitState::PollingReceipt;

        loop {
            state = match state {
                WaitState::PollingReceipt => {
                    self.poll_receipt(tx_hash, confirmations, deadline).await?
                },
                WaitState::PollingConfirmations { target_block } => {
                    self.poll_confirmations(target_block, deadline).await?
                },
                WaitState::Done => return Ok(true),
                WaitState::TimedOut => {
                    let elapsed = started.elapsed();
                    warn!(tx_hash = %tx_hash, ?elapsed, "Timed out waiting for transaction");
                    return Err(EthError::Timeout { tx_hash: tx_hash.to_string(), elapsed });
                },
            };
        }
    }

    async fn poll_receipt(
        &self,
        tx_hash: &str,
        confirmations: u64,
        deadline: Instant,
    ) -> Result<WaitState> {
        if Instant::now() >= deadline {
            return Ok(WaitState::TimedOut);
        }

        let Some(mined) = bounded(deadline, self.receipt_block(tx_hash)).await else {
            return Ok(WaitState::TimedOut);
        };

        match mined? {
            Some(mined_block) if confirmations == 0 => {
                info!(tx_hash = %tx_hash, mined_block, "Transaction mined");
                Ok(WaitState::Done)
            },
            Some(mined_block) => {
                let target_block = mined_block.saturating_add(confirmations);
                info!(
                    tx_hash = %tx_hash,
                    mined_block,
                    target_block,
                    "Transaction mined, waiting for confirmations"
                );
                Ok(WaitState::PollingConfirmations { target_block })
            },
            None => {
                debug!(tx_hash = %tx_hash, "Transaction not mined yet");
                pause(self.receipt_poll_interval, deadline).await;
                Ok(WaitState::PollingReceipt)
            },
        }
    }

    async fn poll_confirmations(&self, target_block: u64, deadline: Instant) -> Result<WaitState> {
        if Instant::now() >= deadline {
            return Ok(WaitState::TimedOut);
        }

        let Some(head) = bounded(deadline, self.block_number()).await else {
            return Ok(WaitState::TimedOut);
        };
        let head = head?;

        if head >= target_block {
            info!(head, target_block, "Confirmations reached");
            return Ok(WaitState::Done);
        }

        debug!(head, target_block, "Waiting for more blocks");
        pause(self.confirmation_poll_interval, deadline).await;
        Ok(WaitState::PollingConfirmations { target_block })
    }

    /// Block the transaction was included in, or `None` while it is pending.
    async fn receipt_block(&self, tx_hash: &str) -> Result<Option<u64>> {
        let receipt = self.connection.call("eth_getTransactionReceipt", json!([tx_hash])).await?;
        if receipt.is_null() {
            return Ok(None);
        }

        let receipt: ReceiptBlock = serde_json::from_value(receipt)
            .map_err(|e| EthError::ProviderError(format!("Invalid receipt: {}", e)))?;
        Ok(receipt.block_number.map(|block| block.to::<u64>()))
    }

    async fn block_number(&self) -> Result<u64> {
        let head = self.connection.call("eth_blockNumber", json!([])).await?;
        parse_quantity(&head)
    }
}

/// Run a provider call, giving up at `deadline`.
async fn bounded<T>(deadline: Instant, call: impl Future<Output = T>) -> Option<T> {
    timeout_at(deadline, call).await.ok()
}

/// Sleep for `interval`, never past `deadline`.
async fn pause(interval: Duration, deadline: Instant) {
    sleep_until(std::cmp::min(Instant::now() + interval, deadline)).await;
}

/// Decode a JSON-RPC quantity such as `"0x1a"`.
pub fn parse_quantity(value: &Value) -> Result<u64> {
    U64::deserialize(value)
        .map(|quantity| quantity.to::<u64>())
        .map_err(|e| EthError::ProviderError(format!("Invalid quantity {}: {}", value, e)))
}
