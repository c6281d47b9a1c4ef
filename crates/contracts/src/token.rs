// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    bindings::WrapETH,
    confirm::PendingTx,
    contract::{Connection, ProviderType, ReadWrite, SEND_LOCK},
    error::{ChainError, ChainResult},
};
use alloy::primitives::{aliases::U48, Address, Bytes, B256};
use async_trait::async_trait;
use std::marker::PhantomData;
use tracing::{info, instrument};

/// Trait for read-only operations on the confidential token
#[async_trait]
pub trait TokenRead: Send + Sync {
    fn address(&self) -> Address;

    async fn name(&self) -> ChainResult<String>;

    async fn symbol(&self) -> ChainResult<String>;

    async fn decimals(&self) -> ChainResult<u8>;

    /// Handle of the encrypted balance of `account`
    async fn confidential_balance_of(&self, account: Address) -> ChainResult<B256>;

    /// Handle of the encrypted total supply
    async fn confidential_total_supply(&self) -> ChainResult<B256>;

    async fn is_operator(&self, holder: Address, spender: Address) -> ChainResult<bool>;
}

/// Trait for write operations on the confidential token
#[async_trait]
pub trait TokenWrite: Send + Sync {
    /// Mint a plaintext amount to `to`
    async fn mint(&self, to: Address, amount: u64) -> ChainResult<PendingTx>;

    /// Transfer an encrypted amount to `to` and invoke its receiver hook with `data`
    async fn confidential_transfer_and_call(
        &self,
        to: Address,
        handle: B256,
        input_proof: Bytes,
        data: Bytes,
    ) -> ChainResult<PendingTx>;

    /// Let `operator` move the caller's funds until the unix time `until`
    async fn set_operator(&self, operator: Address, until: u64) -> ChainResult<PendingTx>;

    /// Ask the coprocessor to publicly decrypt `handle`. The caller must be allowed on it.
    async fn request_disclose_encrypted_amount(&self, handle: B256) -> ChainResult<PendingTx>;
}

#[derive(Clone)]
pub struct TokenContract<T: ProviderType> {
    connection: Connection,
    contract_address: Address,
    _marker: PhantomData<T>,
}

impl<T: ProviderType> TokenContract<T> {
    pub(crate) fn new(connection: Connection, contract_address: Address) -> Self {
        Self {
            connection,
            contract_address,
            _marker: PhantomData,
        }
    }

    fn instance(&self) -> WrapETH::WrapETHInstance<&alloy::providers::DynProvider> {
        WrapETH::new(self.contract_address, self.connection.provider())
    }
}

#[async_trait]
impl<T: ProviderType> TokenRead for TokenContract<T> {
    fn address(&self) -> Address {
        self.contract_address
    }

    async fn name(&self) -> ChainResult<String> {
        Ok(self.instance().name().call().await?)
    }

    async fn symbol(&self) -> ChainResult<String> {
        Ok(self.instance().symbol().call().await?)
    }

    async fn decimals(&self) -> ChainResult<u8> {
        Ok(self.instance().decimals().call().await?)
    }

    async fn confidential_balance_of(&self, account: Address) -> ChainResult<B256> {
        Ok(self
            .instance()
            .confidentialBalanceOf(account)
            .call()
            .await?)
    }

    async fn confidential_total_supply(&self) -> ChainResult<B256> {
        Ok(self.instance().confidentialTotalSupply().call().await?)
    }

    async fn is_operator(&self, holder: Address, spender: Address) -> ChainResult<bool> {
        Ok(self
            .instance()
            .isOperator(holder, spender)
            .call()
            .await?)
    }
}

// Implement TokenWrite only for contracts with ReadWrite marker
#[async_trait]
impl TokenWrite for TokenContract<ReadWrite> {
    #[instrument(skip(self), fields(token = %self.contract_address))]
    async fn mint(&self, to: Address, amount: u64) -> ChainResult<PendingTx> {
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance()
                .mint(to, amount)
                .nonce(nonce)
                .send()
                .await?
        };
        info!(tx = %pending.tx_hash(), "mint submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }

    #[instrument(skip(self, input_proof, data), fields(token = %self.contract_address))]
    async fn confidential_transfer_and_call(
        &self,
        to: Address,
        handle: B256,
        input_proof: Bytes,
        data: Bytes,
    ) -> ChainResult<PendingTx> {
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance()
                .confidentialTransferAndCall(to, handle, input_proof, data)
                .nonce(nonce)
                .send()
                .await?
        };
        info!(tx = %pending.tx_hash(), "confidential transfer submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }

    #[instrument(skip(self), fields(token = %self.contract_address))]
    async fn set_operator(&self, operator: Address, until: u64) -> ChainResult<PendingTx> {
        let until = U48::try_from(until)
            .map_err(|_| ChainError::Call(format!("operator expiry {} exceeds uint48", until)))?;
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance()
                .setOperator(operator, until)
                .nonce(nonce)
                .send()
                .await?
        };
        info!(tx = %pending.tx_hash(), "set operator submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }

    #[instrument(skip(self), fields(token = %self.contract_address))]
    async fn request_disclose_encrypted_amount(&self, handle: B256) -> ChainResult<PendingTx> {
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance()
                .requestDiscloseEncryptedAmount(handle)
                .nonce(nonce)
                .send()
                .await?
        };
        info!(tx = %pending.tx_hash(), "disclosure request submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }
}
