// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::str::FromStr;

use alloy_primitives::Address;
use url::Url;

#[derive(Clone, Debug)]
pub struct ValidUrl(Url);

impl FromStr for ValidUrl {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ValidUrl(Url::parse(s)?))
    }
}

impl From<ValidUrl> for String {
    fn from(value: ValidUrl) -> Self {
        value.0.to_string()
    }
}

/// An address argument that must be a 20 byte hex string
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidAddress(Address);

impl FromStr for ValidAddress {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if !trimmed.starts_with("0x") {
            anyhow::bail!("address must start with '0x'");
        }
        Ok(ValidAddress(trimmed.parse()?))
    }
}

impl From<ValidAddress> for Address {
    fn from(value: ValidAddress) -> Self {
        value.0
    }
}
