// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{validation::DEFAULT_DECIMALS, Query, ReadState};
use alloy::primitives::{Address, B256};
use cloak_contracts::{CampaignInfo, ChainResult, FundraiserRead, TokenRead};
use tracing::debug;

/// A value that a confirmed write may have changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Refresh {
    CampaignMetadata,
    TotalRaised,
    Contribution,
    TokenMetadata,
    Balance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub async fn read(token: &dyn TokenRead) -> ChainResult<Self> {
        let (name, symbol, decimals) =
            tokio::try_join!(token.name(), token.symbol(), token.decimals())?;
        Ok(Self {
            name,
            symbol,
            decimals,
        })
    }

    pub fn decimals_or_default(info: Option<&TokenInfo>) -> u8 {
        info.map(|t| t.decimals).unwrap_or(DEFAULT_DECIMALS)
    }
}

/// Campaign reads for one fundraiser
#[derive(Debug)]
pub struct CampaignStore {
    metadata: Query<CampaignInfo>,
    total_raised: Query<B256>,
    contribution: Query<B256>,
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignStore {
    pub fn new() -> Self {
        Self {
            metadata: Query::new(),
            total_raised: Query::new(),
            contribution: Query::new(),
        }
    }

    pub fn metadata(&self) -> &Query<CampaignInfo> {
        &self.metadata
    }

    pub fn total_raised(&self) -> &Query<B256> {
        &self.total_raised
    }

    /// The connected account's contribution handle
    pub fn contribution(&self) -> &Query<B256> {
        &self.contribution
    }

    pub async fn refetch_metadata(
        &self,
        fundraiser: Option<&dyn FundraiserRead>,
    ) -> ReadState<CampaignInfo> {
        match fundraiser {
            Some(f) => self.metadata.refetch(f.campaign()).await,
            None => {
                self.metadata.reset().await;
                ReadState::NotRequested
            }
        }
    }

    pub async fn refetch_total_raised(
        &self,
        fundraiser: Option<&dyn FundraiserRead>,
    ) -> ReadState<B256> {
        match fundraiser {
            Some(f) => self.total_raised.refetch(f.total_raised()).await,
            None => {
                self.total_raised.reset().await;
                ReadState::NotRequested
            }
        }
    }

    pub async fn refetch_contribution(
        &self,
        fundraiser: Option<&dyn FundraiserRead>,
        account: Option<Address>,
    ) -> ReadState<B256> {
        match (fundraiser, account) {
            (Some(f), Some(account)) => {
                self.contribution
                    .refetch(f.contribution_of(account))
                    .await
            }
            _ => {
                debug!("contribution needs both a fundraiser and an account");
                self.contribution.reset().await;
                ReadState::NotRequested
            }
        }
    }

    pub async fn invalidate(&self, refresh: Refresh) {
        match refresh {
            Refresh::CampaignMetadata => self.metadata.invalidate().await,
            Refresh::TotalRaised => self.total_raised.invalidate().await,
            Refresh::Contribution => self.contribution.invalidate().await,
            Refresh::TokenMetadata | Refresh::Balance => {}
        }
    }

    pub async fn reset(&self) {
        self.metadata.reset().await;
        self.total_raised.reset().await;
        self.contribution.reset().await;
    }
}

/// Token reads: metadata and the connected account's balance handle
#[derive(Debug)]
pub struct TokenStore {
    info: Query<TokenInfo>,
    balance: Query<B256>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            info: Query::new(),
            balance: Query::new(),
        }
    }

    pub fn info(&self) -> &Query<TokenInfo> {
        &self.info
    }

    pub fn balance(&self) -> &Query<B256> {
        &self.balance
    }

    pub async fn decimals(&self) -> u8 {
        TokenInfo::decimals_or_default(self.info.value().await.as_ref())
    }

    pub async fn refetch_info(&self, token: Option<&dyn TokenRead>) -> ReadState<TokenInfo> {
        match token {
            Some(t) => self.info.refetch(TokenInfo::read(t)).await,
            None => {
                self.info.reset().await;
                ReadState::NotRequested
            }
        }
    }

    pub async fn refetch_balance(
        &self,
        token: Option<&dyn TokenRead>,
        account: Option<Address>,
    ) -> ReadState<B256> {
        match (token, account) {
            (Some(t), Some(account)) => self.balance.refetch(t.confidential_balance_of(account)).await,
            _ => {
                self.balance.reset().await;
                ReadState::NotRequested
            }
        }
    }

    pub async fn invalidate(&self, refresh: Refresh) {
        match refresh {
            Refresh::TokenMetadata => self.info.invalidate().await,
            Refresh::Balance => self.balance.invalidate().await,
            Refresh::CampaignMetadata | Refresh::TotalRaised | Refresh::Contribution => {}
        }
    }

    pub async fn reset(&self) {
        self.info.reset().await;
        self.balance.reset().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cloak_contracts::ChainError;

    struct StaticToken;

    #[async_trait]
    impl TokenRead for StaticToken {
        fn address(&self) -> Address {
            Address::repeat_byte(0x11)
        }
        async fn name(&self) -> ChainResult<String> {
            Ok("Wrapped Ether".to_string())
        }
        async fn symbol(&self) -> ChainResult<String> {
            Ok("wETH".to_string())
        }
        async fn decimals(&self) -> ChainResult<u8> {
            Ok(6)
        }
        async fn confidential_balance_of(&self, account: Address) -> ChainResult<B256> {
            if account == Address::ZERO {
                Err(ChainError::Call("zero account".to_string()))
            } else {
                Ok(B256::repeat_byte(0x22))
            }
        }
        async fn confidential_total_supply(&self) -> ChainResult<B256> {
            Ok(B256::ZERO)
        }
        async fn is_operator(&self, _: Address, _: Address) -> ChainResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_balance_needs_an_account() {
        let store = TokenStore::new();
        let token = StaticToken;

        assert_eq!(
            store.refetch_balance(Some(&token), None).await,
            ReadState::NotRequested
        );
        assert_eq!(
            store
                .refetch_balance(Some(&token), Some(Address::repeat_byte(1)))
                .await,
            ReadState::Ready(B256::repeat_byte(0x22))
        );
        assert!(matches!(
            store.refetch_balance(Some(&token), Some(Address::ZERO)).await,
            ReadState::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_decimals_default_until_read() {
        let store = TokenStore::new();
        assert_eq!(store.decimals().await, DEFAULT_DECIMALS);

        store.refetch_info(Some(&StaticToken)).await;
        assert_eq!(store.decimals().await, 6);
        assert_eq!(
            store.info().value().await.map(|i| i.symbol),
            Some("wETH".to_string())
        );

        store.invalidate(Refresh::TokenMetadata).await;
        assert!(store.info().view().await.stale);
        store.invalidate(Refresh::Balance).await;
        assert!(store.balance().view().await.stale);
    }
}
