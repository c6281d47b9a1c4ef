// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAMPAIGN_NAME: &str = "Cloak Capital Raise";
pub const DEFAULT_TARGET_AMOUNT: u64 = 1_000_000;
pub const DEFAULT_CAMPAIGN_DURATION_SECS: u64 = 30 * 24 * 60 * 60;

pub const FUND_NAME_VAR: &str = "FUND_NAME";
pub const FUND_TARGET_VAR: &str = "FUND_TARGET";
pub const FUND_END_TIME_VAR: &str = "FUND_END_TIME";

/// Constructor arguments for the fundraiser contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployParams {
    pub campaign_name: String,
    pub target_amount: u64,
    pub end_time: u64,
}

impl DeployParams {
    /// Read overrides from the process environment
    pub fn from_env(now: u64) -> Result<Self> {
        Self::from_lookup(now, |key| std::env::var(key).ok())
    }

    /// Build the parameters from any key lookup. Unset keys fall back to the defaults.
    pub fn from_lookup(now: u64, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let end_time = match lookup(FUND_END_TIME_VAR) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("{FUND_END_TIME_VAR} must be a unix timestamp"))?,
            None => now + DEFAULT_CAMPAIGN_DURATION_SECS,
        };

        let target_amount = match lookup(FUND_TARGET_VAR) {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("{FUND_TARGET_VAR} must be a uint64"))?,
            None => DEFAULT_TARGET_AMOUNT,
        };

        let campaign_name =
            lookup(FUND_NAME_VAR).unwrap_or_else(|| DEFAULT_CAMPAIGN_NAME.to_string());

        Ok(Self {
            campaign_name,
            target_amount,
            end_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() -> Result<()> {
        let params = DeployParams::from_lookup(1_700_000_000, |_| None)?;
        assert_eq!(params.campaign_name, "Cloak Capital Raise");
        assert_eq!(params.target_amount, 1_000_000);
        assert_eq!(params.end_time, 1_700_000_000 + 2_592_000);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("FUND_NAME", "Seed Round"),
            ("FUND_TARGET", "42"),
            ("FUND_END_TIME", "1800000000"),
        ]);
        let params =
            DeployParams::from_lookup(0, |key| env.get(key).map(|v| v.to_string()))?;
        assert_eq!(
            params,
            DeployParams {
                campaign_name: "Seed Round".to_string(),
                target_amount: 42,
                end_time: 1_800_000_000,
            }
        );
        Ok(())
    }

    #[test]
    fn test_bad_target() {
        let result = DeployParams::from_lookup(0, |key| {
            (key == FUND_TARGET_VAR).then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}
