// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{encryptor, fundraiser_address, load_wallet, token_address, write_factory};
use alloy::primitives::Address;
use anyhow::{bail, Result};
use cloak_client::validation::encode_note;
use cloak_config::AppConfig;
use cloak_contracts::TokenWrite;
use cloak_fhevm::Encryptor;
use tracing::info;

pub async fn execute(
    config: &AppConfig,
    amount: u64,
    address: Option<Address>,
    note: String,
) -> Result<()> {
    if amount == 0 {
        bail!("Argument --amount must be greater than zero");
    }

    let fundraiser = fundraiser_address(config, address)?;
    let token = token_address(config, None)?;
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;
    let contributor = factory.sender();

    let encryptor = encryptor(config, factory.connection().chain_id())?;
    let input = encryptor.encrypt_u64(amount, token, contributor).await?;
    info!(handle = %input.handle, "contribution encrypted");

    let pending = factory
        .token(token)
        .confidential_transfer_and_call(fundraiser, input.handle, input.proof, encode_note(&note))
        .await?;
    println!("Wait for tx:{}...", pending.hash());
    let confirmed = pending.confirmed().await?;
    println!(
        "tx:{} confirmed in block {}",
        confirmed.hash,
        confirmed
            .block_number
            .map(|b| b.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    );

    Ok(())
}
