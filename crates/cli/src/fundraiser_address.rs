// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{fundraiser_address, token_address};
use anyhow::Result;
use cloak_config::AppConfig;

pub fn execute(config: &AppConfig) -> Result<()> {
    let fundraiser = fundraiser_address(config, None)?;
    let token = token_address(config, None)?;

    println!("CloakFundraiser address is {}", fundraiser);
    println!("WrapETH address is {}", token);

    Ok(())
}
