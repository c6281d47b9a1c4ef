// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::{
    context::{load_wallet, write_factory},
    unix_now,
};
use anyhow::Result;
use cloak_config::{AppConfig, DeployParams};
use cloak_contracts::deploy::deploy_contracts;
use tracing::info;

pub async fn execute(config: &AppConfig) -> Result<()> {
    let params = DeployParams::from_env(unix_now()?)?;
    info!(
        name = %params.campaign_name,
        target = params.target_amount,
        end_time = params.end_time,
        "deploying campaign"
    );

    let signer = load_wallet(config)?;
    let factory = write_factory(config, &signer).await?;
    let deployments_dir = config.deployments_dir();
    let deployed = deploy_contracts(
        &factory,
        config.artifacts_dir(),
        &deployments_dir,
        &params,
    )
    .await?;

    println!("WrapETH contract: {}", deployed.token.address);
    println!("CloakFundraiser contract: {}", deployed.fundraiser.address);
    println!("Deployment records written to {}", deployments_dir.display());

    Ok(())
}
