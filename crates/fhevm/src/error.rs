// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use thiserror::Error;

pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("No signing key available")]
    SignerUnavailable,

    #[error("Signing rejected: {0}")]
    SigningRejected(String),

    #[error("Encryption service unavailable: {0}")]
    EncryptionUnavailable(String),

    #[error("Invalid encrypted input: {0}")]
    InvalidInput(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}
