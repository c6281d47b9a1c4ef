// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    coprocessor::{response_aad, HandleContractPair, UserDecryptRequest, UserDecryptResponse},
    error::{WorkflowError, WorkflowResult},
    grant::{DecryptionGrant, DynSigner, GrantDomain, GrantRequest},
    keypair::Keypair,
};
use alloy::primitives::{Address, Bytes, B256};

/// One decryption attempt: a fresh keypair and the grant that names it. Built for a single
/// handle, used once, then dropped along with its secret key.
#[derive(Debug)]
pub struct DecryptionSession {
    keypair: Keypair,
    grant: DecryptionGrant,
    handle: B256,
}

impl DecryptionSession {
    pub async fn create(
        handle: B256,
        owning_contract: Address,
        signer: &DynSigner,
        domain: &GrantDomain,
        window_days: u64,
        now: u64,
    ) -> WorkflowResult<Self> {
        let keypair = Keypair::generate();
        let grant = GrantRequest {
            contract_addresses: vec![owning_contract],
            handle_pairs: vec![HandleContractPair {
                handle,
                contract_address: owning_contract,
            }],
            public_key: keypair.public_key_bytes(),
            start_timestamp: now,
            duration_days: window_days,
            extra_data: Bytes::from(vec![0u8]),
        }
        .sign(signer, domain)
        .await?;

        Ok(Self {
            keypair,
            grant,
            handle,
        })
    }

    pub fn grant(&self) -> &DecryptionGrant {
        &self.grant
    }

    pub fn expires_at(&self) -> u64 {
        self.grant.expires_at()
    }

    pub fn request(&self, contracts_chain_id: u64) -> UserDecryptRequest {
        UserDecryptRequest::from_grant(&self.grant, contracts_chain_id)
    }

    /// Pull this session's cleartext out of a coprocessor response
    pub fn read(self, response: &UserDecryptResponse) -> WorkflowResult<u64> {
        let Some(payload) = response.payloads.iter().find(|p| p.handle == self.handle) else {
            return Err(WorkflowError::DecryptionFailed(format!(
                "no cleartext returned for handle {}",
                self.handle
            )));
        };

        let cleartext = self
            .keypair
            .open(
                &payload.sealed,
                &response_aad(&self.handle, &self.grant.requester),
            )
            .map_err(|e| WorkflowError::DecryptionFailed(e.to_string()))?;

        let text = std::str::from_utf8(&cleartext).map_err(|_| {
            WorkflowError::DecryptionFailed("cleartext is not valid UTF-8".to_string())
        })?;
        text.trim().parse::<u64>().map_err(|_| {
            WorkflowError::DecryptionFailed(format!("cleartext {:?} is not a uint64", text))
        })
    }
}
