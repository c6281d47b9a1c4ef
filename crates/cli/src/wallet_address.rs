// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::load_wallet;
use anyhow::Result;
use cloak_config::AppConfig;

pub fn execute(config: &AppConfig) -> Result<()> {
    let signer = load_wallet(config)?;
    println!("{}", signer.address());

    Ok(())
}
