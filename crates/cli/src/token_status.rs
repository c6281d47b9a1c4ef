// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{read_factory, token_address};
use alloy::primitives::{Address, B256};
use anyhow::Result;
use cloak_client::{format::token_label, TokenInfo};
use cloak_config::AppConfig;
use cloak_contracts::{ChainResult, TokenRead};

pub async fn execute(config: &AppConfig, token: Option<Address>) -> Result<()> {
    let token = token_address(config, token)?;
    let factory = read_factory(config).await?;
    let (info, supply) = describe(&factory.token(token)).await?;

    println!("Token        : {}", token_label(Some(&info)));
    println!("Decimals     : {}", info.decimals);
    println!("Supply handle: {}", supply);

    Ok(())
}

/// Token metadata plus the handle of the encrypted total supply
pub(crate) async fn describe(token: &dyn TokenRead) -> ChainResult<(TokenInfo, B256)> {
    tokio::try_join!(TokenInfo::read(token), token.confidential_total_supply())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloak_test_helpers::{rand_wallet, FundraiserFixture};

    #[tokio::test]
    async fn test_supply_handle_changes_with_mints() -> Result<()> {
        let fixture = FundraiserFixture::new();
        let token = fixture.chain.read_only().token();

        let (info, before) = describe(&token).await?;
        assert_eq!(info.decimals, 6);
        assert_eq!(before, B256::ZERO);

        fixture.fund(rand_wallet().account(), 10).await?;
        let (_, after) = describe(&token).await?;
        assert_ne!(after, B256::ZERO);
        assert_eq!(fixture.fhevm.value(&after), Some(10));

        Ok(())
    }
}
