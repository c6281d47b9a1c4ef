// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::error::{ChainError, ChainResult};
use alloy::{
    network::{Ethereum, ReceiptResponse},
    primitives::{Address, TxHash},
    providers::{PendingTransactionBuilder, PendingTransactionError, WatchTxError},
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future, time::Duration};
use tracing::{debug, warn};

/// A transaction that has been mined successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedTx {
    pub hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Set when the transaction created a contract
    pub contract_address: Option<Address>,
}

/// Wait for a submitted transaction to be mined. A mined but failed transaction is a revert; a
/// watcher that gives up is a confirmation timeout, not a revert.
pub async fn confirm(
    pending: PendingTransactionBuilder<Ethereum>,
    timeout: Duration,
) -> ChainResult<ConfirmedTx> {
    let tx = *pending.tx_hash();
    debug!(tx = %tx, "awaiting confirmation");

    let receipt = pending
        .with_timeout(Some(timeout))
        .get_receipt()
        .await
        .map_err(|e| match e {
            PendingTransactionError::TxWatcher(WatchTxError::Timeout) => {
                warn!(tx = %tx, "transaction not confirmed in time");
                ChainError::ConfirmationTimeout {
                    tx,
                    timeout_secs: timeout.as_secs(),
                }
            }
            other => ChainError::Network(other.to_string()),
        })?;

    if !receipt.status() {
        return Err(ChainError::Reverted(format!(
            "transaction {} failed in block {}",
            tx,
            receipt
                .block_number
                .map(|b| b.to_string())
                .unwrap_or_else(|| "unknown".to_string())
        )));
    }

    Ok(ConfirmedTx {
        hash: tx,
        block_number: receipt.block_number,
        gas_used: receipt.gas_used,
        contract_address: receipt.contract_address,
    })
}

/// A submitted transaction whose confirmation has not been awaited yet
pub struct PendingTx {
    hash: TxHash,
    confirmation: BoxFuture<'static, ChainResult<ConfirmedTx>>,
}

impl PendingTx {
    pub fn new<F>(hash: TxHash, confirmation: F) -> Self
    where
        F: Future<Output = ChainResult<ConfirmedTx>> + Send + 'static,
    {
        Self {
            hash,
            confirmation: Box::pin(confirmation),
        }
    }

    /// Watch a transaction the node has accepted
    pub fn watch(pending: PendingTransactionBuilder<Ethereum>, timeout: Duration) -> Self {
        let hash = *pending.tx_hash();
        Self::new(hash, confirm(pending, timeout))
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }

    pub async fn confirmed(self) -> ChainResult<ConfirmedTx> {
        self.confirmation.await
    }
}

impl fmt::Debug for PendingTx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTx").field("hash", &self.hash).finish()
    }
}
