// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

#[cfg(any(test, feature = "test-helpers"))]
use crate::keypair::Keypair;
use crate::{
    coprocessor::{Coprocessor, NetworkKey},
    crypto,
    error::{WorkflowError, WorkflowResult},
    handle::derive_input_handle,
    keypair::parse_public_key,
};
use alloy::{
    primitives::{Address, Bytes, B256},
    signers::k256::PublicKey,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

/// A value encrypted for one call by one submitter to one contract.
///
/// Not `Clone`: an input is consumed by the transaction it was made for.
#[derive(Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    pub handle: B256,
    pub proof: Bytes,
    pub contract: Address,
    pub user: Address,
}

#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `amount` as an `euint64` input for `contract`, submitted by `user`
    async fn encrypt_u64(
        &self,
        amount: u64,
        contract: Address,
        user: Address,
    ) -> WorkflowResult<EncryptedInput>;

    /// Load whatever key material encryption needs. Calling it again is a no-op.
    async fn prepare(&self) -> WorkflowResult<()> {
        Ok(())
    }
}

/// Associated data binding a sealed input to its context
pub fn input_aad(contract: &Address, user: &Address, chain_id: u64) -> Vec<u8> {
    [
        contract.as_slice(),
        user.as_slice(),
        chain_id.to_be_bytes().as_slice(),
    ]
    .concat()
}

/// The proof attached to an input: `[count][count * 32 byte handles][sealed box]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputProof {
    pub handles: Vec<B256>,
    pub sealed: Bytes,
}

impl InputProof {
    pub fn encode(&self) -> WorkflowResult<Bytes> {
        let count = u8::try_from(self.handles.len()).map_err(|_| {
            WorkflowError::InvalidInput(format!(
                "a proof covers at most {} handles, got {}",
                u8::MAX,
                self.handles.len()
            ))
        })?;
        let mut out = Vec::with_capacity(1 + self.handles.len() * 32 + self.sealed.len());
        out.push(count);
        for handle in &self.handles {
            out.extend_from_slice(handle.as_slice());
        }
        out.extend_from_slice(&self.sealed);
        Ok(out.into())
    }

    #[cfg(any(test, feature = "test-helpers"))]
    pub fn decode(bytes: &[u8]) -> WorkflowResult<Self> {
        let Some((&count, rest)) = bytes.split_first() else {
            return Err(WorkflowError::InvalidInput("empty proof".to_string()));
        };
        let handles_len = count as usize * 32;
        if count == 0 || rest.len() <= handles_len {
            return Err(WorkflowError::InvalidInput("truncated proof".to_string()));
        }
        let handles = rest[..handles_len]
            .chunks_exact(32)
            .map(B256::from_slice)
            .collect();
        Ok(Self {
            handles,
            sealed: Bytes::copy_from_slice(&rest[handles_len..]),
        })
    }
}

/// Check an input against the context it is submitted in and recover its value. Only the
/// holder of the network secret can do this.
#[cfg(any(test, feature = "test-helpers"))]
pub fn verify_input(
    network: &Keypair,
    handle: B256,
    proof: &[u8],
    contract: Address,
    user: Address,
    chain_id: u64,
) -> WorkflowResult<u64> {
    let proof = InputProof::decode(proof)?;
    let Some(index) = proof.handles.iter().position(|h| *h == handle) else {
        return Err(WorkflowError::InvalidInput("handle not covered by proof".to_string()));
    };
    let index = u8::try_from(index)
        .map_err(|_| WorkflowError::InvalidInput("handle index out of range".to_string()))?;
    if derive_input_handle(&proof.sealed, index, contract, user, chain_id) != handle {
        return Err(WorkflowError::InvalidInput(
            "input was made for another contract or submitter".to_string(),
        ));
    }

    let cleartext = network
        .open(&proof.sealed, &input_aad(&contract, &user, chain_id))
        .map_err(|e| WorkflowError::InvalidInput(e.to_string()))?;
    let bytes: [u8; 8] = cleartext
        .as_slice()
        .try_into()
        .map_err(|_| WorkflowError::InvalidInput("not a 64 bit value".to_string()))?;
    Ok(u64::from_be_bytes(bytes))
}

/// Encrypts inputs under the coprocessor's network key. The key is fetched on first use and
/// kept for the life of the encryptor.
pub struct NetworkKeyEncryptor {
    coprocessor: Arc<dyn Coprocessor>,
    chain_id: u64,
    key: OnceCell<(String, PublicKey)>,
}

impl NetworkKeyEncryptor {
    pub fn new(coprocessor: Arc<dyn Coprocessor>, chain_id: u64) -> Self {
        Self {
            coprocessor,
            chain_id,
            key: OnceCell::new(),
        }
    }

    /// True once key material has been fetched
    pub fn is_ready(&self) -> bool {
        self.key.initialized()
    }

    /// Fetch key material now instead of on the first encryption
    pub async fn ensure_ready(&self) -> WorkflowResult<()> {
        self.network_key().await.map(|_| ())
    }

    async fn network_key(&self) -> WorkflowResult<&(String, PublicKey)> {
        self.key
            .get_or_try_init(|| async {
                let NetworkKey {
                    key_id,
                    public_key,
                } = self.coprocessor.network_key().await?;
                let public_key = parse_public_key(&public_key)
                    .map_err(|e| WorkflowError::EncryptionUnavailable(e.to_string()))?;
                info!(key_id = %key_id, "loaded network key");
                Ok((key_id, public_key))
            })
            .await
    }
}

#[async_trait]
impl Encryptor for NetworkKeyEncryptor {
    async fn prepare(&self) -> WorkflowResult<()> {
        self.ensure_ready().await
    }

    #[instrument(skip(self, amount), fields(chain_id = self.chain_id))]
    async fn encrypt_u64(
        &self,
        amount: u64,
        contract: Address,
        user: Address,
    ) -> WorkflowResult<EncryptedInput> {
        if amount == 0 {
            return Err(WorkflowError::InvalidAmount(
                "amount must be greater than zero".to_string(),
            ));
        }

        let (_, network_key) = self.network_key().await?;
        let sealed = crypto::seal(
            network_key,
            &amount.to_be_bytes(),
            &input_aad(&contract, &user, self.chain_id),
        )
        .map_err(|e| WorkflowError::EncryptionUnavailable(e.to_string()))?;

        let handle = derive_input_handle(&sealed, 0, contract, user, self.chain_id);
        debug!(handle = %handle, "encrypted input");

        let proof = InputProof {
            handles: vec![handle],
            sealed: sealed.into(),
        }
        .encode()?;

        Ok(EncryptedInput {
            handle,
            proof,
            contract,
            user,
        })
    }
}
