// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{decryptor, fundraiser_address, load_wallet, read_factory, token_address};
use alloy::{
    primitives::{Address, B256},
    signers::Signer,
};
use anyhow::Result;
use cloak_config::AppConfig;
use cloak_contracts::{FundraiserRead, ReadFactory, TokenRead};
use cloak_fhevm::DynSigner;
use std::sync::Arc;

async fn decrypt(
    config: &AppConfig,
    factory: &ReadFactory,
    signer: &DynSigner,
    handle: B256,
    owning_contract: Address,
) -> Result<u64> {
    let decryptor = decryptor(config, factory.connection().chain_id())?;
    Ok(decryptor
        .decrypt(handle, owning_contract, Some(signer))
        .await?)
}

fn wallet(config: &AppConfig) -> Result<DynSigner> {
    Ok(Arc::new(load_wallet(config)?))
}

pub async fn total(config: &AppConfig, address: Option<Address>) -> Result<()> {
    let address = fundraiser_address(config, address)?;
    let signer = wallet(config)?;
    let factory = read_factory(config).await?;

    let handle = factory.fundraiser(address).total_raised().await?;
    let value = decrypt(config, &factory, &signer, handle, address).await?;

    println!("Encrypted total: {}", handle);
    println!("Clear total    : {}", value);

    Ok(())
}

pub async fn contribution(
    config: &AppConfig,
    contributor: Address,
    address: Option<Address>,
) -> Result<()> {
    let address = fundraiser_address(config, address)?;
    let signer = wallet(config)?;
    let factory = read_factory(config).await?;

    let handle = factory
        .fundraiser(address)
        .contribution_of(contributor)
        .await?;
    let value = decrypt(config, &factory, &signer, handle, address).await?;

    println!("Encrypted contribution: {}", handle);
    println!("Clear contribution    : {}", value);

    Ok(())
}

pub async fn balance(
    config: &AppConfig,
    account: Option<Address>,
    token: Option<Address>,
) -> Result<()> {
    let token = token_address(config, token)?;
    let signer = wallet(config)?;
    let account = account.unwrap_or_else(|| signer.address());
    let factory = read_factory(config).await?;

    let handle = factory.token(token).confidential_balance_of(account).await?;
    let value = decrypt(config, &factory, &signer, handle, token).await?;

    println!("Encrypted balance: {}", handle);
    println!("Clear balance    : {}", value);

    Ok(())
}
