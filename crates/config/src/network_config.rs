// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    contract::ContractAddresses,
    rpc::{RpcAuth, RpcEndpoint},
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const REMOTE_CONFIRMATION_TIMEOUT_MS: u64 = 180_000;
const LOCAL_CONFIRMATION_TIMEOUT_MS: u64 = 30_000;

pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;
pub const HARDHAT_CHAIN_ID: u64 = 31_337;

/// A chain the client can talk to along with where the contracts live on it
#[derive(Debug, Clone, PartialEq, Hash, Eq, Deserialize, Serialize)]
pub struct NetworkConfig {
    pub name: String,
    pub rpc_url: String,
    #[serde(default)]
    pub rpc_auth: RpcAuth,
    /// Expected chain id. When set, providers refuse to talk to a node reporting another id.
    pub chain_id: Option<u64>,
    /// How long to wait for a receipt before reporting the transaction as unconfirmed
    pub confirmation_timeout_ms: Option<u64>,
    #[serde(default)]
    pub contracts: ContractAddresses,
}

impl NetworkConfig {
    pub fn sepolia() -> Self {
        Self {
            name: "sepolia".to_string(),
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            rpc_auth: RpcAuth::None,
            chain_id: Some(SEPOLIA_CHAIN_ID),
            confirmation_timeout_ms: None,
            contracts: ContractAddresses::sepolia(),
        }
    }

    pub fn localhost() -> Self {
        Self {
            name: "localhost".to_string(),
            rpc_url: "http://127.0.0.1:8545".to_string(),
            rpc_auth: RpcAuth::None,
            chain_id: Some(HARDHAT_CHAIN_ID),
            confirmation_timeout_ms: None,
            contracts: ContractAddresses::default(),
        }
    }

    pub fn rpc(&self) -> Result<RpcEndpoint> {
        RpcEndpoint::from_url(&self.rpc_url)
            .map_err(|e| anyhow!("Failed to parse RPC URL for network {}: {}", self.name, e))
    }

    pub fn confirmation_timeout(&self) -> Result<Duration> {
        let ms = match self.confirmation_timeout_ms {
            Some(ms) => ms,
            None if self.rpc()?.is_local() => LOCAL_CONFIRMATION_TIMEOUT_MS,
            None => REMOTE_CONFIRMATION_TIMEOUT_MS,
        };
        Ok(Duration::from_millis(ms))
    }
}
