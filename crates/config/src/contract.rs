// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Deployed fundraiser on Sepolia
pub const DEFAULT_FUNDRAISER_ADDRESS: &str = "0x0d267E11343206544Ce9e028061215CAb355559f";
/// Deployed confidential wrapped ETH token on Sepolia
pub const DEFAULT_TOKEN_ADDRESS: &str = "0xA8a92e63Ab6517b647949F850233dDF18605fCa0";

#[derive(Debug, Clone, Hash, Eq, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Contract {
    Full {
        address: String,
        deploy_block: Option<u64>,
    },
    AddressOnly(String),
}

impl Contract {
    pub fn address(&self) -> &String {
        use Contract::*;
        match self {
            Full { address, .. } => address,
            AddressOnly(v) => v,
        }
    }

    pub fn deploy_block(&self) -> Option<u64> {
        use Contract::*;
        match self {
            Full { deploy_block, .. } => *deploy_block,
            AddressOnly(_) => None,
        }
    }

    /// Parse the configured string into an address
    pub fn parsed(&self) -> Result<Address> {
        self.address()
            .parse()
            .map_err(|e| anyhow!("Invalid contract address '{}': {}", self.address(), e))
    }
}

/// The token and fundraiser pair for one network. Either may be absent on networks where the
/// contracts have not been deployed yet, in which case deployment records are consulted.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Deserialize, Serialize, Default)]
pub struct ContractAddresses {
    pub token: Option<Contract>,
    pub fundraiser: Option<Contract>,
}

impl ContractAddresses {
    pub fn sepolia() -> Self {
        Self {
            token: Some(Contract::AddressOnly(DEFAULT_TOKEN_ADDRESS.to_string())),
            fundraiser: Some(Contract::AddressOnly(DEFAULT_FUNDRAISER_ADDRESS.to_string())),
        }
    }
}
