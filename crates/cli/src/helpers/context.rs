// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Shared wiring for the commands: wallet, contract factories, addresses and the coprocessor

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::{Context, Result};
use cloak_config::AppConfig;
use cloak_contracts::{
    deployments::{resolve_address, FUNDRAISER_CONTRACT_NAME, TOKEN_CONTRACT_NAME},
    load_signer_from_env, ReadFactory, WriteFactory,
};
use cloak_fhevm::{
    Coprocessor, DecryptSettings, NetworkKeyEncryptor, RelayerClient, UserDecryptor,
};
use std::sync::Arc;

pub fn load_wallet(config: &AppConfig) -> Result<PrivateKeySigner> {
    let var = &config.wallet().private_key_env;
    load_signer_from_env(var)
        .with_context(|| format!("No wallet available. Set {} to a hex private key.", var))
}

pub async fn read_factory(config: &AppConfig) -> Result<ReadFactory> {
    ReadFactory::create_read(config.network()).await
}

pub async fn write_factory(config: &AppConfig, signer: &PrivateKeySigner) -> Result<WriteFactory> {
    WriteFactory::create_write(config.network(), signer).await
}

/// `--address`, else the deployment record, else the network config
pub fn fundraiser_address(config: &AppConfig, explicit: Option<Address>) -> Result<Address> {
    resolve_address(
        explicit,
        &config.deployments_dir(),
        FUNDRAISER_CONTRACT_NAME,
        config.network().contracts.fundraiser.as_ref(),
    )
}

pub fn token_address(config: &AppConfig, explicit: Option<Address>) -> Result<Address> {
    resolve_address(
        explicit,
        &config.deployments_dir(),
        TOKEN_CONTRACT_NAME,
        config.network().contracts.token.as_ref(),
    )
}

pub fn coprocessor(config: &AppConfig) -> Result<Arc<dyn Coprocessor>> {
    let url = config.coprocessor().endpoint()?;
    let client =
        RelayerClient::new(url).with_context(|| format!("Invalid coprocessor url {}", url))?;
    Ok(Arc::new(client))
}

pub fn encryptor(config: &AppConfig, chain_id: u64) -> Result<NetworkKeyEncryptor> {
    Ok(NetworkKeyEncryptor::new(coprocessor(config)?, chain_id))
}

pub fn decryptor(config: &AppConfig, chain_id: u64) -> Result<UserDecryptor> {
    Ok(UserDecryptor::new(
        coprocessor(config)?,
        DecryptSettings::new(config.coprocessor(), chain_id),
    ))
}
