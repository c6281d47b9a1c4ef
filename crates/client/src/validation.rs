// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Parsing of form input. Nothing here touches the network.

use alloy::primitives::{Address, Bytes};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use thiserror::Error;

/// Notes attached to a contribution are cut to this many bytes
pub const MAX_NOTE_BYTES: usize = 64;

/// Token decimals assumed until the token reports its own
pub const DEFAULT_DECIMALS: u8 = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid decimal value")]
    Invalid,
    #[error("too many decimals for format")]
    TooManyDecimals,
    #[error("value is negative")]
    Negative,
    #[error("value does not fit in 64 bits")]
    Overflow,
}

/// A `0x` prefixed 20 byte hex address, in any letter case
pub fn parse_address(input: &str) -> Option<Address> {
    let trimmed = input.trim();
    let hex = trimmed.strip_prefix("0x")?;
    if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    trimmed.parse().ok()
}

/// Scale a decimal string by `10^decimals`, e.g. `"1.5"` with 6 decimals is `1_500_000`
pub fn parse_units(input: &str, decimals: u8) -> Result<u64, UnitsError> {
    let trimmed = input.trim();
    if let Some(rest) = trimmed.strip_prefix('-') {
        // a well formed negative number is reported as such, garbage stays invalid
        parse_units(rest, decimals)?;
        return Err(UnitsError::Negative);
    }

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(UnitsError::Invalid);
    }
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !digits(whole) || !digits(fraction) {
        return Err(UnitsError::Invalid);
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals);
    }

    let scale = 10u128
        .checked_pow(decimals as u32)
        .ok_or(UnitsError::Overflow)?;
    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| UnitsError::Overflow)?
    };
    let fraction_value: u128 = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = decimals as usize);
        padded.parse().map_err(|_| UnitsError::Overflow)?
    };

    let value = whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction_value))
        .ok_or(UnitsError::Overflow)?;
    u64::try_from(value).map_err(|_| UnitsError::Overflow)
}

/// Parse an end time. Accepts a `datetime-local` value (`2025-01-31T18:30`, local time), an
/// RFC 3339 timestamp or unix seconds. Returns `None` unless the result is after the epoch.
pub fn parse_end_time(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let seconds = if trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.parse::<i64>().ok()?
    } else if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        dt.timestamp()
    } else {
        let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M")
            .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
            .ok()?;
        Local.from_local_datetime(&naive).earliest()?.timestamp()
    };

    u64::try_from(seconds).ok().filter(|s| *s > 0)
}

/// The longest prefix of `note` of at most [`MAX_NOTE_BYTES`] bytes that ends on a character
/// boundary, as UTF-8 bytes. An empty note is empty bytes.
pub fn encode_note(note: &str) -> Bytes {
    let mut end = note.len().min(MAX_NOTE_BYTES);
    while !note.is_char_boundary(end) {
        end -= 1;
    }
    Bytes::copy_from_slice(note[..end].as_bytes())
}
