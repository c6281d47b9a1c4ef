// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{load_wallet, token_address, write_factory};
use alloy::primitives::{Address, TxHash, B256};
use anyhow::{bail, Result};
use cloak_config::AppConfig;
use cloak_contracts::{TokenRead, TokenWrite};
use cloak_fhevm::handle::is_zero_handle;

/// Ask for the wallet's encrypted balance to be decrypted publicly
pub async fn execute(config: &AppConfig, token: Option<Address>) -> Result<()> {
    let token = token_address(config, token)?;
    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;
    let contract = factory.token(token);

    let (handle, tx) = request_balance_disclosure(&contract, &contract, factory.sender()).await?;
    println!("Disclosure of {} requested in tx:{}", handle, tx);

    Ok(())
}

pub(crate) async fn request_balance_disclosure(
    reader: &dyn TokenRead,
    writer: &dyn TokenWrite,
    account: Address,
) -> Result<(B256, TxHash)> {
    let handle = reader.confidential_balance_of(account).await?;
    if is_zero_handle(&handle) {
        bail!("{} has no encrypted balance to disclose", account);
    }
    let pending = writer.request_disclose_encrypted_amount(handle).await?;
    println!("Wait for tx:{}...", pending.hash());
    Ok((handle, pending.confirmed().await?.hash))
}
