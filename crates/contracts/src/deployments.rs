// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Deployment records: one json file per contract under `<deployments_dir>/<network>/`.

use alloy::primitives::{Address, TxHash};
use anyhow::{anyhow, Context, Result};
use cloak_config::Contract;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const TOKEN_CONTRACT_NAME: &str = "WrapETH";
pub const FUNDRAISER_CONTRACT_NAME: &str = "CloakFundraiser";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    pub address: Address,
    #[serde(default)]
    pub transaction_hash: Option<TxHash>,
    #[serde(default)]
    pub block_number: Option<u64>,
}

fn record_path(dir: &Path, contract: &str) -> PathBuf {
    dir.join(format!("{}.json", contract))
}

/// Read the record for `contract`. Returns `None` when nothing was deployed yet.
pub fn read_deployment(dir: &Path, contract: &str) -> Result<Option<DeploymentRecord>> {
    let path = record_path(dir, contract);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read deployment record {}", path.display()))?;
    let record = serde_json::from_str(&content)
        .with_context(|| format!("Malformed deployment record {}", path.display()))?;
    Ok(Some(record))
}

pub fn write_deployment(dir: &Path, contract: &str, record: &DeploymentRecord) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = record_path(dir, contract);
    fs::write(&path, serde_json::to_string_pretty(record)?)?;
    Ok(path)
}

/// Find a contract address: an explicit address wins, then the local deployment record, then
/// the address from the network config.
pub fn resolve_address(
    explicit: Option<Address>,
    deployments_dir: &Path,
    contract: &str,
    configured: Option<&Contract>,
) -> Result<Address> {
    if let Some(address) = explicit {
        return Ok(address);
    }
    if let Some(record) = read_deployment(deployments_dir, contract)? {
        return Ok(record.address);
    }
    match configured {
        Some(c) => c.parsed(),
        None => Err(anyhow!(
            "No address for {}. Pass --address, deploy it first or add it to the network config.",
            contract
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DEPLOYED: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
    const CONFIGURED: &str = "0x0d267E11343206544Ce9e028061215CAb355559f";

    #[test]
    fn test_missing_record_is_none() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_deployment(dir.path(), FUNDRAISER_CONTRACT_NAME)?, None);
        Ok(())
    }

    #[test]
    fn test_reads_hardhat_deploy_files() -> Result<()> {
        let dir = tempdir()?;
        // hardhat-deploy writes many more fields than we need
        fs::write(
            dir.path().join("WrapETH.json"),
            format!(r#"{{"address":"{}","abi":[],"numDeployments":1}}"#, DEPLOYED),
        )?;
        let record = read_deployment(dir.path(), TOKEN_CONTRACT_NAME)?.unwrap();
        assert_eq!(record.address, DEPLOYED.parse::<Address>()?);
        assert_eq!(record.block_number, None);
        Ok(())
    }

    #[test]
    fn test_resolution_order() -> Result<()> {
        let dir = tempdir()?;
        let configured = Contract::AddressOnly(CONFIGURED.to_string());
        let explicit: Address = "0x00000000000000000000000000000000000000aa".parse()?;

        let found = resolve_address(None, dir.path(), FUNDRAISER_CONTRACT_NAME, Some(&configured))?;
        assert_eq!(found, CONFIGURED.parse::<Address>()?);

        write_deployment(
            dir.path(),
            FUNDRAISER_CONTRACT_NAME,
            &DeploymentRecord {
                address: DEPLOYED.parse()?,
                transaction_hash: None,
                block_number: Some(7),
            },
        )?;
        let found = resolve_address(None, dir.path(), FUNDRAISER_CONTRACT_NAME, Some(&configured))?;
        assert_eq!(found, DEPLOYED.parse::<Address>()?);

        let found = resolve_address(
            Some(explicit),
            dir.path(),
            FUNDRAISER_CONTRACT_NAME,
            Some(&configured),
        )?;
        assert_eq!(found, explicit);

        let empty = tempdir()?;
        let err = resolve_address(None, empty.path(), FUNDRAISER_CONTRACT_NAME, None).unwrap_err();
        assert!(err.to_string().contains("CloakFundraiser"));
        Ok(())
    }
}
