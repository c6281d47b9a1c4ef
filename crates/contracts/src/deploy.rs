// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    bindings::CloakFundraiser,
    confirm::confirm,
    contract::{WriteFactory, SEND_LOCK},
    deployments::{
        write_deployment, DeploymentRecord, FUNDRAISER_CONTRACT_NAME, TOKEN_CONTRACT_NAME,
    },
    error::ChainError,
};
use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::Provider,
    rpc::types::TransactionRequest,
    sol_types::SolConstructor,
};
use anyhow::{bail, Context, Result};
use cloak_config::DeployParams;
use serde::Deserialize;
use std::{fs, path::Path};
use tracing::info;

/// The part of a compiled artifact needed for deployment
#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: Bytes,
}

/// Creation bytecode of `contract`. Looks for the hardhat layout
/// `contracts/<Name>.sol/<Name>.json` first, then a flat `<Name>.json`.
pub fn load_bytecode(artifacts_dir: &Path, contract: &str) -> Result<Bytes> {
    let candidates = [
        artifacts_dir
            .join("contracts")
            .join(format!("{}.sol", contract))
            .join(format!("{}.json", contract)),
        artifacts_dir.join(format!("{}.json", contract)),
    ];

    let Some(path) = candidates.iter().find(|p| p.exists()) else {
        bail!(
            "No artifact for {} under {}. Compile the contracts first.",
            contract,
            artifacts_dir.display()
        );
    };

    let artifact: Artifact = serde_json::from_str(&fs::read_to_string(path)?)
        .with_context(|| format!("Malformed artifact {}", path.display()))?;

    if artifact.bytecode.is_empty() {
        bail!("Artifact {} has no bytecode", path.display());
    }
    Ok(artifact.bytecode)
}

/// Creation code for the fundraiser with its constructor arguments appended
pub fn fundraiser_deploy_code(bytecode: &Bytes, token: Address, params: &DeployParams) -> Bytes {
    let args = CloakFundraiser::constructorCall {
        weth: token,
        name_: params.campaign_name.clone(),
        targetAmount_: params.target_amount,
        endTime_: params.end_time,
    }
    .abi_encode();
    [bytecode.as_ref(), args.as_slice()].concat().into()
}

async fn deploy_code(factory: &WriteFactory, code: Bytes) -> Result<DeploymentRecord> {
    let connection = factory.connection();
    let pending = {
        let _guard = SEND_LOCK.lock().await;
        let tx = TransactionRequest::default()
            .with_from(factory.sender())
            .with_deploy_code(code);
        connection
            .provider()
            .send_transaction(tx)
            .await
            .map_err(ChainError::from)?
    };
    let confirmed = confirm(pending, connection.confirmation_timeout()).await?;
    let Some(address) = confirmed.contract_address else {
        bail!("Deployment {} did not create a contract", confirmed.hash);
    };

    Ok(DeploymentRecord {
        address,
        transaction_hash: Some(confirmed.hash),
        block_number: confirmed.block_number,
    })
}

#[derive(Debug, Clone)]
pub struct Deployed {
    pub token: DeploymentRecord,
    pub fundraiser: DeploymentRecord,
}

/// Deploy the token, then the fundraiser pointing at it, and record both under `deployments_dir`
pub async fn deploy_contracts(
    factory: &WriteFactory,
    artifacts_dir: &Path,
    deployments_dir: &Path,
    params: &DeployParams,
) -> Result<Deployed> {
    let token_code = load_bytecode(artifacts_dir, TOKEN_CONTRACT_NAME)?;
    let fundraiser_code = load_bytecode(artifacts_dir, FUNDRAISER_CONTRACT_NAME)?;

    let token = deploy_code(factory, token_code).await?;
    info!(address = %token.address, "{} deployed", TOKEN_CONTRACT_NAME);
    write_deployment(deployments_dir, TOKEN_CONTRACT_NAME, &token)?;

    let fundraiser = deploy_code(
        factory,
        fundraiser_deploy_code(&fundraiser_code, token.address, params),
    )
    .await?;
    info!(address = %fundraiser.address, "{} deployed", FUNDRAISER_CONTRACT_NAME);
    write_deployment(deployments_dir, FUNDRAISER_CONTRACT_NAME, &fundraiser)?;

    Ok(Deployed { token, fundraiser })
}
