// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cloak_contracts::ChainError;
use cloak_fhevm::WorkflowError;
use thiserror::Error;

/// Why an operation did not succeed. Each variant displays as the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Bad input caught before anything was sent
    #[error("{0}")]
    Validation(String),

    /// No wallet, or the wallet refused to sign
    #[error("{0}")]
    Signer(String),

    #[error("{0}")]
    Chain(#[from] ChainError),

    /// The coprocessor refused or could not be reached
    #[error("{0}")]
    Decryption(String),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn signer(message: impl Into<String>) -> Self {
        Self::Signer(message.into())
    }
}

impl From<WorkflowError> for ClientError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidAmount(_) => {
                ClientError::validation("Amount must be greater than zero.")
            }
            WorkflowError::SignerUnavailable => ClientError::signer("Signer not available."),
            WorkflowError::SigningRejected(reason) => {
                ClientError::Signer(format!("Signature rejected: {}", reason))
            }
            other => ClientError::Decryption(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_pass_through() {
        let err = ClientError::from(ChainError::Reverted("CampaignEnded".to_string()));
        assert_eq!(err.to_string(), "Transaction reverted: CampaignEnded");

        let err = ClientError::from(WorkflowError::SignerUnavailable);
        assert_eq!(err, ClientError::signer("Signer not available."));

        let err = ClientError::from(WorkflowError::DecryptionFailed("not allowed".to_string()));
        assert!(matches!(err, ClientError::Decryption(_)));
    }
}
