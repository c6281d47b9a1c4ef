// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{
    context::{load_wallet, read_factory, token_address, write_factory},
    unix_now,
};
use alloy::primitives::{Address, TxHash};
use anyhow::{bail, Result};
use cloak_client::format::format_datetime;
use cloak_config::AppConfig;
use cloak_contracts::{TokenRead, TokenWrite};

/// How long an operator stays approved when `--until` is not given
pub const DEFAULT_OPERATOR_SECS: u64 = 24 * 60 * 60;

pub async fn set(
    config: &AppConfig,
    operator: Address,
    until: Option<u64>,
    token: Option<Address>,
) -> Result<()> {
    let token = token_address(config, token)?;
    let until = match until {
        Some(until) => until,
        None => unix_now()?.saturating_add(DEFAULT_OPERATOR_SECS),
    };
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;

    let tx = set_operator(&factory.token(token), operator, until).await?;
    println!(
        "{} may move funds of {} until {} (tx:{})",
        operator,
        factory.sender(),
        format_datetime(until),
        tx
    );

    Ok(())
}

pub async fn check(
    config: &AppConfig,
    holder: Option<Address>,
    spender: Address,
    token: Option<Address>,
) -> Result<()> {
    let token = token_address(config, token)?;
    let holder = match holder {
        Some(holder) => holder,
        None => load_wallet(config)?.address(),
    };
    let factory = read_factory(config).await?;
    let approved = factory.token(token).is_operator(holder, spender).await?;
    println!("Operator {} for {}: {}", spender, holder, approved);

    Ok(())
}

pub(crate) async fn set_operator(
    token: &dyn TokenWrite,
    operator: Address,
    until: u64,
) -> Result<TxHash> {
    if operator == Address::ZERO {
        bail!("Argument --operator must not be the zero address");
    }
    let pending = token.set_operator(operator, until).await?;
    println!("Wait for tx:{}...", pending.hash());
    Ok(pending.confirmed().await?.hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloak_test_helpers::{rand_wallet, unix_now, FundraiserFixture};

    #[tokio::test]
    async fn test_operator_approval_is_visible() -> Result<()> {
        let fixture = FundraiserFixture::new();
        let alice = rand_wallet();
        let bob = rand_wallet();
        let token = fixture.chain.connect(alice.account()).token();

        assert!(!token.is_operator(alice.account(), bob.account()).await?);
        set_operator(&token, bob.account(), unix_now() + 3600).await?;
        assert!(token.is_operator(alice.account(), bob.account()).await?);
        assert!(!token.is_operator(bob.account(), alice.account()).await?);
        assert_eq!(fixture.chain.sent(), vec!["setOperator"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_zero_operator_is_refused_before_sending() -> Result<()> {
        let fixture = FundraiserFixture::new();
        let token = fixture.chain.connect(rand_wallet().account()).token();

        assert!(set_operator(&token, Address::ZERO, unix_now() + 3600)
            .await
            .is_err());
        assert!(fixture.chain.sent().is_empty());

        Ok(())
    }
}
