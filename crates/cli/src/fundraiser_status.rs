// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::context::{fundraiser_address, read_factory};
use alloy::primitives::Address;
use anyhow::Result;
use cloak_client::format::{campaign_name, campaign_status, format_datetime};
use cloak_config::AppConfig;
use cloak_contracts::FundraiserRead;

pub async fn execute(config: &AppConfig, address: Option<Address>) -> Result<()> {
    let address = fundraiser_address(config, address)?;
    let factory = read_factory(config).await?;
    let fundraiser = factory.fundraiser(address);

    let (campaign, total) = tokio::try_join!(fundraiser.campaign(), fundraiser.total_raised())?;

    println!("Campaign name: {}", campaign_name(&campaign));
    println!("Target amount: {}", campaign.target_amount);
    println!(
        "End time     : {} ({})",
        campaign.end_time,
        format_datetime(campaign.end_time)
    );
    println!("Owner        : {}", campaign.owner);
    println!("Token        : {}", campaign.token);
    println!("Ended        : {}", campaign.is_ended);
    println!("Status       : {}", campaign_status(&campaign));
    println!("Total handle : {}", total);

    Ok(())
}
