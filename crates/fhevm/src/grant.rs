// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    coprocessor::HandleContractPair,
    error::{WorkflowError, WorkflowResult},
};
use alloy::{
    primitives::{Address, Bytes, Signature, B256, U256},
    signers::Signer,
    sol,
    sol_types::{Eip712Domain, SolStruct},
};
use cloak_config::CoprocessorConfig;
use std::sync::Arc;

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

const DOMAIN_NAME: &str = "Decryption";
const DOMAIN_VERSION: &str = "1";

/// Any signer that can produce grant signatures
pub type DynSigner = Arc<dyn Signer + Send + Sync>;

sol! {
    /// Typed data the requester signs to authorize a user decryption
    #[derive(Debug, PartialEq, Eq)]
    struct UserDecryptRequestVerification {
        bytes publicKey;
        address[] contractAddresses;
        uint256 startTimestamp;
        uint256 durationDays;
        bytes extraData;
    }
}

/// The EIP-712 domain grants are signed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrantDomain {
    pub gateway_chain_id: u64,
    pub verifying_contract: Address,
}

impl GrantDomain {
    pub fn from_config(config: &CoprocessorConfig) -> Self {
        Self {
            gateway_chain_id: config.gateway_chain_id,
            verifying_contract: config.decryption_contract,
        }
    }

    pub fn eip712(&self) -> Eip712Domain {
        Eip712Domain::new(
            Some(DOMAIN_NAME.into()),
            Some(DOMAIN_VERSION.into()),
            Some(U256::from(self.gateway_chain_id)),
            Some(self.verifying_contract),
            None,
        )
    }
}

/// Signed statement letting `requester`'s data in `contract_addresses` be decrypted to
/// `public_key` during the window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptionGrant {
    pub requester: Address,
    pub contract_addresses: Vec<Address>,
    pub handle_pairs: Vec<HandleContractPair>,
    pub public_key: Bytes,
    pub start_timestamp: u64,
    pub duration_days: u64,
    pub extra_data: Bytes,
    pub signature: Signature,
}

/// Everything in a grant except the signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantRequest {
    pub contract_addresses: Vec<Address>,
    pub handle_pairs: Vec<HandleContractPair>,
    pub public_key: Bytes,
    pub start_timestamp: u64,
    pub duration_days: u64,
    pub extra_data: Bytes,
}

impl GrantRequest {
    pub fn message(&self) -> UserDecryptRequestVerification {
        UserDecryptRequestVerification {
            publicKey: self.public_key.clone(),
            contractAddresses: self.contract_addresses.clone(),
            startTimestamp: U256::from(self.start_timestamp),
            durationDays: U256::from(self.duration_days),
            extraData: self.extra_data.clone(),
        }
    }

    pub fn signing_hash(&self, domain: &GrantDomain) -> B256 {
        self.message().eip712_signing_hash(&domain.eip712())
    }

    /// Have `signer` sign the typed data. The signer's address becomes the requester.
    pub async fn sign(self, signer: &DynSigner, domain: &GrantDomain) -> WorkflowResult<DecryptionGrant> {
        let hash = self.signing_hash(domain);
        let signature = signer
            .sign_hash(&hash)
            .await
            .map_err(|e| WorkflowError::SigningRejected(e.to_string()))?;

        Ok(DecryptionGrant {
            requester: signer.address(),
            contract_addresses: self.contract_addresses,
            handle_pairs: self.handle_pairs,
            public_key: self.public_key,
            start_timestamp: self.start_timestamp,
            duration_days: self.duration_days,
            extra_data: self.extra_data,
            signature,
        })
    }
}

impl DecryptionGrant {
    #[cfg(any(test, feature = "test-helpers"))]
    fn unsigned(&self) -> GrantRequest {
        GrantRequest {
            contract_addresses: self.contract_addresses.clone(),
            handle_pairs: self.handle_pairs.clone(),
            public_key: self.public_key.clone(),
            start_timestamp: self.start_timestamp,
            duration_days: self.duration_days,
            extra_data: self.extra_data.clone(),
        }
    }

    /// Recover the address that signed this grant
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn recover_signer(&self, domain: &GrantDomain) -> WorkflowResult<Address> {
        let hash = self.unsigned().signing_hash(domain);
        self.signature
            .recover_address_from_prehash(&hash)
            .map_err(|e| WorkflowError::DecryptionFailed(format!("invalid grant signature: {e}")))
    }

    /// Verify that the grant was signed by its requester
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn verify(&self, domain: &GrantDomain) -> WorkflowResult<bool> {
        Ok(self.recover_signer(domain)? == self.requester)
    }

    pub fn expires_at(&self) -> u64 {
        self.start_timestamp
            .saturating_add(self.duration_days.saturating_mul(SECONDS_PER_DAY))
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn is_valid_at(&self, now: u64) -> bool {
        now >= self.start_timestamp && now < self.expires_at()
    }
}
