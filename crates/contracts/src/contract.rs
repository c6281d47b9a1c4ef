// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    error::ChainError, fundraiser::FundraiserContract, provider::ProviderConfig,
    token::TokenContract,
};
use alloy::{
    primitives::Address,
    providers::{DynProvider, Provider},
    signers::local::PrivateKeySigner,
};
use anyhow::Result;
use cloak_config::NetworkConfig;
use once_cell::sync::Lazy;
use std::{marker::PhantomData, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tracing::info;

/// Serializes nonce lookup and submission for every write made by this process
pub(crate) static SEND_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Generic type to represent different provider types
pub trait ProviderType: Send + Sync + 'static {}

/// Marker type for read-only provider
#[derive(Clone)]
pub struct ReadOnly;
impl ProviderType for ReadOnly {}

/// Marker type for a provider holding a signing wallet
#[derive(Clone)]
pub struct ReadWrite;
impl ProviderType for ReadWrite {}

/// Connection shared by every contract created on one network
#[derive(Clone)]
pub struct Connection {
    pub(crate) provider: Arc<DynProvider>,
    pub(crate) chain_id: u64,
    pub(crate) sender: Option<Address>,
    pub(crate) confirmation_timeout: Duration,
}

impl Connection {
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn confirmation_timeout(&self) -> Duration {
        self.confirmation_timeout
    }

    /// The address transactions are sent from, if this connection can sign
    pub fn sender(&self) -> Option<Address> {
        self.sender
    }

    pub(crate) async fn next_nonce(&self) -> Result<u64, ChainError> {
        let Some(from) = self.sender else {
            return Err(ChainError::Call("connection has no signer".to_string()));
        };
        Ok(self
            .provider
            .get_transaction_count(from)
            .pending()
            .await?)
    }
}

/// Factory for contract instances on one network
#[derive(Clone)]
pub struct ContractFactory<T: ProviderType> {
    connection: Connection,
    _marker: PhantomData<T>,
}

/// Type aliases for the two factory variants
pub type ReadFactory = ContractFactory<ReadOnly>;
pub type WriteFactory = ContractFactory<ReadWrite>;

async fn checked_chain_id(provider: &DynProvider, network: &NetworkConfig) -> Result<u64> {
    let actual = provider.get_chain_id().await?;
    if let Some(expected) = network.chain_id {
        if expected != actual {
            return Err(ChainError::WrongChain { expected, actual }.into());
        }
    }
    Ok(actual)
}

impl ContractFactory<ReadOnly> {
    /// Connect without a wallet
    pub async fn create_read(network: &NetworkConfig) -> Result<Self> {
        let provider = ProviderConfig::from_network(network)?
            .create_readonly_provider()
            .await?;
        let chain_id = checked_chain_id(&provider, network).await?;
        info!(network = %network.name, chain_id, "connected read-only");

        Ok(Self {
            connection: Connection {
                provider: Arc::new(provider),
                chain_id,
                sender: None,
                confirmation_timeout: network.confirmation_timeout()?,
            },
            _marker: PhantomData,
        })
    }
}

impl ContractFactory<ReadWrite> {
    /// Connect with a wallet that signs every write
    pub async fn create_write(network: &NetworkConfig, signer: &PrivateKeySigner) -> Result<Self> {
        let provider = ProviderConfig::from_network(network)?
            .create_signer_provider(signer)
            .await?;
        let chain_id = checked_chain_id(&provider, network).await?;
        info!(network = %network.name, chain_id, sender = %signer.address(), "connected with signer");

        Ok(Self {
            connection: Connection {
                provider: Arc::new(provider),
                chain_id,
                sender: Some(signer.address()),
                confirmation_timeout: network.confirmation_timeout()?,
            },
            _marker: PhantomData,
        })
    }

    pub fn sender(&self) -> Address {
        // create_write always records the signer
        self.connection.sender.unwrap_or_default()
    }
}

impl<T: ProviderType> ContractFactory<T> {
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn token(&self, address: Address) -> TokenContract<T> {
        TokenContract::new(self.connection.clone(), address)
    }

    pub fn fundraiser(&self, address: Address) -> FundraiserContract<T> {
        FundraiserContract::new(self.connection.clone(), address)
    }
}
