// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Display helpers for campaign and token values

use crate::{ReadState, TokenInfo};
use alloy::primitives::Address;
use chrono::{Local, TimeZone};
use cloak_contracts::CampaignInfo;

/// Shown wherever a value is unknown
pub const PLACEHOLDER: &str = "—";

pub const DEFAULT_TOKEN_SYMBOL: &str = "wETH";

pub const UNNAMED_CAMPAIGN: &str = "Unnamed Campaign";

/// `0x1234...abcd`, or the placeholder for anything too short to be an address
pub fn format_address(address: Option<&str>) -> String {
    match address {
        Some(a) if a.len() >= 10 && a.is_ascii() => {
            format!("{}...{}", &a[..6], &a[a.len() - 4..])
        }
        _ => PLACEHOLDER.to_string(),
    }
}

pub fn format_account(address: Option<Address>) -> String {
    format_address(address.map(|a| a.to_checksum(None)).as_deref())
}

/// `value / 10^decimals` with at least one fractional digit, e.g. `1.0` or `0.000001`
pub fn format_units(value: u64, decimals: u8) -> String {
    let decimals = decimals as usize;
    let digits = format!("{:0>width$}", value, width = decimals + 1);
    let (whole, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Local date and time of a unix timestamp; the placeholder for 0
pub fn format_datetime(timestamp: u64) -> String {
    if timestamp == 0 {
        return PLACEHOLDER.to_string();
    }
    i64::try_from(timestamp)
        .ok()
        .and_then(|t| Local.timestamp_opt(t, 0).single())
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn campaign_status(campaign: &CampaignInfo) -> &'static str {
    if campaign.is_ended {
        "Ended"
    } else if campaign.is_active {
        "Active"
    } else {
        "Expired"
    }
}

pub fn campaign_name(campaign: &CampaignInfo) -> &str {
    if campaign.name.is_empty() {
        UNNAMED_CAMPAIGN
    } else {
        &campaign.name
    }
}

pub fn token_symbol(token: Option<&TokenInfo>) -> &str {
    token
        .map(|t| t.symbol.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TOKEN_SYMBOL)
}

/// `name (symbol)`, else the symbol, else `wETH`
pub fn token_label(token: Option<&TokenInfo>) -> String {
    let symbol = token_symbol(token);
    match token.map(|t| t.name.as_str()).filter(|n| !n.is_empty()) {
        Some(name) => format!("{} ({})", name, symbol),
        None => symbol.to_string(),
    }
}

/// The target amount with the token symbol, or the placeholder while unknown
pub fn target_label(campaign: &ReadState<CampaignInfo>, token: Option<&TokenInfo>) -> String {
    match campaign {
        ReadState::Ready(c) => format!(
            "{} {}",
            format_units(c.target_amount, TokenInfo::decimals_or_default(token)),
            token_symbol(token)
        ),
        ReadState::NotRequested | ReadState::Loading | ReadState::Failed(_) => {
            PLACEHOLDER.to_string()
        }
    }
}

/// A decrypted amount, or the placeholder until one has been decrypted
pub fn decrypted_label(value: Option<u64>, token: Option<&TokenInfo>) -> String {
    value
        .map(|v| format_units(v, TokenInfo::decimals_or_default(token)))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Human readable form of any read
pub fn read_label<T>(state: &ReadState<T>, render: impl FnOnce(&T) -> String) -> String {
    match state {
        ReadState::NotRequested => PLACEHOLDER.to_string(),
        ReadState::Loading => "Loading...".to_string(),
        ReadState::Ready(value) => render(value),
        ReadState::Failed(message) => format!("Unavailable: {}", message),
    }
}

/// True when the fundraiser reports a token other than the one configured
pub fn token_mismatch(campaign_token: Option<Address>, configured: &str) -> bool {
    match campaign_token {
        Some(token) if !configured.trim().is_empty() => !token
            .to_string()
            .eq_ignore_ascii_case(configured.trim()),
        _ => false,
    }
}

pub fn is_owner(account: Option<Address>, owner: Option<Address>) -> bool {
    matches!((account, owner), (Some(a), Some(o)) if a == o)
}
