// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::bindings::CloakFundraiser;
use alloy::{
    primitives::TxHash,
    sol_types::{decode_revert_reason, SolError},
    transports::{RpcError, TransportError},
};
use thiserror::Error;

pub type ChainResult<T> = std::result::Result<T, ChainError>;

/// Failures talking to the chain. Messages carry the node's or contract's own text where there
/// is one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    #[error("Transaction {tx} was not confirmed within {timeout_secs}s")]
    ConfirmationTimeout { tx: TxHash, timeout_secs: u64 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Connected to chain {actual} but the network is configured for chain {expected}")]
    WrongChain { expected: u64, actual: u64 },

    #[error("Contract call failed: {0}")]
    Call(String),
}

impl ChainError {
    pub fn is_revert(&self) -> bool {
        matches!(self, ChainError::Reverted(_))
    }
}

/// Turn revert data into something a person can read: the fundraiser's custom error name, the
/// `Error(string)` reason, or the raw hex.
pub fn revert_reason(data: &[u8]) -> String {
    if data.len() >= 4 {
        let selector: [u8; 4] = [data[0], data[1], data[2], data[3]];
        let known = [
            (CloakFundraiser::CampaignEnded::SELECTOR, "CampaignEnded"),
            (CloakFundraiser::InvalidEndTime::SELECTOR, "InvalidEndTime"),
            (CloakFundraiser::InvalidToken::SELECTOR, "InvalidToken"),
            (CloakFundraiser::NotOwner::SELECTOR, "NotOwner"),
        ];
        if let Some((_, name)) = known.iter().find(|(s, _)| *s == selector) {
            return name.to_string();
        }
    }

    decode_revert_reason(data).unwrap_or_else(|| format!("0x{}", hex::encode(data)))
}

fn from_transport(err: TransportError) -> ChainError {
    match err {
        RpcError::ErrorResp(payload) => {
            if payload.message.contains("revert") {
                ChainError::Reverted(payload.message.to_string())
            } else {
                ChainError::Network(payload.message.to_string())
            }
        }
        other => ChainError::Network(other.to_string()),
    }
}

impl From<alloy::contract::Error> for ChainError {
    fn from(err: alloy::contract::Error) -> Self {
        if let Some(data) = err.as_revert_data() {
            return ChainError::Reverted(revert_reason(&data));
        }
        match err {
            alloy::contract::Error::TransportError(e) => from_transport(e),
            other => ChainError::Call(other.to_string()),
        }
    }
}

impl From<TransportError> for ChainError {
    fn from(err: TransportError) -> Self {
        if let Some(data) = err.as_error_resp().and_then(|p| p.as_revert_data()) {
            return ChainError::Reverted(revert_reason(&data));
        }
        from_transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::sol_types::Revert;

    #[test]
    fn test_custom_errors_decode_to_names() {
        let data = CloakFundraiser::CampaignEnded {}.abi_encode();
        assert_eq!(revert_reason(&data), "CampaignEnded");

        let data = CloakFundraiser::NotOwner {}.abi_encode();
        assert_eq!(revert_reason(&data), "NotOwner");
    }

    #[test]
    fn test_string_revert() {
        let data = Revert {
            reason: "Target must be positive".to_string(),
        }
        .abi_encode();
        assert!(revert_reason(&data).contains("Target must be positive"));
    }

    #[test]
    fn test_unknown_revert_is_hex() {
        assert_eq!(revert_reason(&[0xde, 0xad, 0xbe, 0xef, 0x01]), "0xdeadbeef01");
    }

    #[test]
    fn test_timeout_message() {
        let err = ChainError::ConfirmationTimeout {
            tx: TxHash::ZERO,
            timeout_secs: 30,
        };
        assert!(err.to_string().contains("not confirmed within 30s"));
        assert!(!err.is_revert());
    }
}
