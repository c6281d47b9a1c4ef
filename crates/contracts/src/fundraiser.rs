// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    bindings::CloakFundraiser,
    confirm::PendingTx,
    contract::{Connection, ProviderType, ReadWrite, SEND_LOCK},
    error::ChainResult,
};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{info, instrument};

/// Plain campaign metadata as stored by the fundraiser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignInfo {
    pub name: String,
    pub target_amount: u64,
    pub end_time: u64,
    pub owner: Address,
    pub is_active: bool,
    pub is_ended: bool,
    pub token: Address,
}

/// Trait for read-only operations on the fundraiser
#[async_trait]
pub trait FundraiserRead: Send + Sync {
    fn address(&self) -> Address;

    async fn campaign_name(&self) -> ChainResult<String>;

    async fn target_amount(&self) -> ChainResult<u64>;

    async fn end_time(&self) -> ChainResult<u64>;

    async fn owner(&self) -> ChainResult<Address>;

    async fn is_active(&self) -> ChainResult<bool>;

    async fn is_ended(&self) -> ChainResult<bool>;

    /// The token contributions must be made in
    async fn token(&self) -> ChainResult<Address>;

    /// Handle of the encrypted sum of all contributions
    async fn total_raised(&self) -> ChainResult<B256>;

    /// Handle of the encrypted contribution of `contributor`
    async fn contribution_of(&self, contributor: Address) -> ChainResult<B256>;

    /// All plain campaign fields, read concurrently
    async fn campaign(&self) -> ChainResult<CampaignInfo> {
        let (name, target_amount, end_time, owner, is_active, is_ended, token) = tokio::try_join!(
            self.campaign_name(),
            self.target_amount(),
            self.end_time(),
            self.owner(),
            self.is_active(),
            self.is_ended(),
            self.token()
        )?;
        Ok(CampaignInfo {
            name,
            target_amount,
            end_time,
            owner,
            is_active,
            is_ended,
            token,
        })
    }
}

/// Trait for the owner-only fundraiser entry points
#[async_trait]
pub trait FundraiserWrite: Send + Sync {
    async fn update_campaign(
        &self,
        name: String,
        target_amount: u64,
        end_time: u64,
    ) -> ChainResult<PendingTx>;

    /// Close the campaign and move the raised funds to the owner
    async fn end_fundraising(&self) -> ChainResult<PendingTx>;
}

#[derive(Clone)]
pub struct FundraiserContract<T: ProviderType> {
    connection: Connection,
    contract_address: Address,
    _marker: PhantomData<T>,
}

impl<T: ProviderType> FundraiserContract<T> {
    pub(crate) fn new(connection: Connection, contract_address: Address) -> Self {
        Self {
            connection,
            contract_address,
            _marker: PhantomData,
        }
    }

    fn instance(&self) -> CloakFundraiser::CloakFundraiserInstance<&alloy::providers::DynProvider> {
        CloakFundraiser::new(self.contract_address, self.connection.provider())
    }
}

#[async_trait]
impl<T: ProviderType> FundraiserRead for FundraiserContract<T> {
    fn address(&self) -> Address {
        self.contract_address
    }

    async fn campaign_name(&self) -> ChainResult<String> {
        Ok(self.instance().campaignName().call().await?)
    }

    async fn target_amount(&self) -> ChainResult<u64> {
        Ok(self.instance().targetAmount().call().await?)
    }

    async fn end_time(&self) -> ChainResult<u64> {
        Ok(self.instance().endTime().call().await?)
    }

    async fn owner(&self) -> ChainResult<Address> {
        Ok(self.instance().owner().call().await?)
    }

    async fn is_active(&self) -> ChainResult<bool> {
        Ok(self.instance().isActive().call().await?)
    }

    async fn is_ended(&self) -> ChainResult<bool> {
        Ok(self.instance().isEnded().call().await?)
    }

    async fn token(&self) -> ChainResult<Address> {
        Ok(self.instance().token().call().await?)
    }

    async fn total_raised(&self) -> ChainResult<B256> {
        Ok(self.instance().totalRaised().call().await?)
    }

    async fn contribution_of(&self, contributor: Address) -> ChainResult<B256> {
        Ok(self.instance().contributionOf(contributor).call().await?)
    }
}

// Implement FundraiserWrite only for contracts with ReadWrite marker
#[async_trait]
impl FundraiserWrite for FundraiserContract<ReadWrite> {
    #[instrument(skip(self), fields(fundraiser = %self.contract_address))]
    async fn update_campaign(
        &self,
        name: String,
        target_amount: u64,
        end_time: u64,
    ) -> ChainResult<PendingTx> {
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance()
                .updateCampaign(name, target_amount, end_time)
                .nonce(nonce)
                .send()
                .await?
        };
        info!(tx = %pending.tx_hash(), "campaign update submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }

    #[instrument(skip(self), fields(fundraiser = %self.contract_address))]
    async fn end_fundraising(&self) -> ChainResult<PendingTx> {
        let pending = {
            let _guard = SEND_LOCK.lock().await;
            let nonce = self.connection.next_nonce().await?;
            self.instance().endFundraising().nonce(nonce).send().await?
        };
        info!(tx = %pending.tx_hash(), "end fundraising submitted");
        Ok(PendingTx::watch(pending, self.connection.confirmation_timeout()))
    }
}
