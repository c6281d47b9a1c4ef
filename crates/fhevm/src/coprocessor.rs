// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    error::{WorkflowError, WorkflowResult},
    grant::DecryptionGrant,
};
use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A ciphertext handle together with the contract that owns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleContractPair {
    pub handle: B256,
    pub contract_address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestValidity {
    pub start_timestamp: String,
    pub duration_days: String,
}

/// Body of a user decryption request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDecryptRequest {
    pub handle_contract_pairs: Vec<HandleContractPair>,
    pub request_validity: RequestValidity,
    pub contracts_chain_id: String,
    pub contract_addresses: Vec<Address>,
    pub user_address: Address,
    /// 65 byte signature, hex without prefix
    pub signature: String,
    /// SEC1 public key the cleartexts are sealed to, 0x prefixed hex
    pub public_key: String,
    pub extra_data: String,
}

impl UserDecryptRequest {
    pub fn from_grant(grant: &DecryptionGrant, contracts_chain_id: u64) -> Self {
        Self {
            handle_contract_pairs: grant.handle_pairs.clone(),
            request_validity: RequestValidity {
                start_timestamp: grant.start_timestamp.to_string(),
                duration_days: grant.duration_days.to_string(),
            },
            contracts_chain_id: contracts_chain_id.to_string(),
            contract_addresses: grant.contract_addresses.clone(),
            user_address: grant.requester,
            signature: hex::encode(grant.signature.as_bytes()),
            public_key: format!("0x{}", hex::encode(&grant.public_key)),
            extra_data: format!("0x{}", hex::encode(&grant.extra_data)),
        }
    }

    /// Rebuild the grant carried by this request. Used on the coprocessor side.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn grant(&self) -> WorkflowResult<DecryptionGrant> {
        let bad = |what: &str| WorkflowError::DecryptionFailed(format!("malformed {what}"));

        let signature_bytes = hex::decode(self.signature.trim_start_matches("0x"))
            .map_err(|_| bad("signature"))?;
        let signature = alloy::primitives::Signature::try_from(signature_bytes.as_slice())
            .map_err(|_| bad("signature"))?;

        Ok(DecryptionGrant {
            requester: self.user_address,
            contract_addresses: self.contract_addresses.clone(),
            handle_pairs: self.handle_contract_pairs.clone(),
            public_key: self.public_key.parse().map_err(|_| bad("public key"))?,
            start_timestamp: self
                .request_validity
                .start_timestamp
                .parse()
                .map_err(|_| bad("start timestamp"))?,
            duration_days: self
                .request_validity
                .duration_days
                .parse()
                .map_err(|_| bad("duration"))?,
            extra_data: self.extra_data.parse().map_err(|_| bad("extra data"))?,
            signature,
        })
    }
}

/// A cleartext sealed to the requester's public key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedPayload {
    pub handle: B256,
    pub sealed: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UserDecryptResponse {
    pub payloads: Vec<SealedPayload>,
}

/// Public key material inputs are encrypted under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkKey {
    pub key_id: String,
    pub public_key: Bytes,
}

/// Associated data a response payload is sealed under
pub fn response_aad(handle: &B256, user: &Address) -> Vec<u8> {
    [handle.as_slice(), user.as_slice()].concat()
}

/// The off-chain service holding the network keys
#[async_trait]
pub trait Coprocessor: Send + Sync {
    /// Public key material for encrypting inputs
    async fn network_key(&self) -> WorkflowResult<NetworkKey>;

    /// Exchange a signed grant for cleartexts sealed to the grant's public key
    async fn user_decrypt(&self, request: UserDecryptRequest) -> WorkflowResult<UserDecryptResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{DynSigner, GrantDomain, GrantRequest};
    use alloy::signers::local::PrivateKeySigner;
    use cloak_config::CoprocessorConfig;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_request_wire_shape() -> anyhow::Result<()> {
        let signer: DynSigner = Arc::new(PrivateKeySigner::random());
        let contract = Address::repeat_byte(0xab);
        let domain = GrantDomain::from_config(&CoprocessorConfig::default());
        let grant = GrantRequest {
            contract_addresses: vec![contract],
            handle_pairs: vec![HandleContractPair {
                handle: B256::repeat_byte(1),
                contract_address: contract,
            }],
            public_key: Bytes::from(vec![3u8; 33]),
            start_timestamp: 1_700_000_000,
            duration_days: 10,
            extra_data: Bytes::from(vec![0u8]),
        }
        .sign(&signer, &domain)
        .await?;

        let request = UserDecryptRequest::from_grant(&grant, 11_155_111);
        let json = serde_json::to_value(&request)?;
        assert_eq!(json["contractsChainId"], "11155111");
        assert_eq!(json["requestValidity"]["durationDays"], "10");
        assert_eq!(json["extraData"], "0x00");
        assert!(!json["signature"].as_str().unwrap().starts_with("0x"));
        assert!(json["handleContractPairs"][0]["contractAddress"].is_string());

        // the coprocessor can rebuild and verify the grant
        let rebuilt = request.grant()?;
        assert_eq!(rebuilt, grant);
        assert!(rebuilt.verify(&domain)?);
        Ok(())
    }
}
