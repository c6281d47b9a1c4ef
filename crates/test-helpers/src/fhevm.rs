// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use cloak_fhevm::{
    crypto, handle::is_zero_handle, parse_public_key, response_aad, verify_input, Coprocessor,
    GrantDomain, Keypair, NetworkKey, SealedPayload, UserDecryptRequest, UserDecryptResponse,
    WorkflowError, WorkflowResult,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::debug;

#[derive(Default)]
struct Ciphertexts {
    values: HashMap<B256, u64>,
    acl: HashMap<B256, HashSet<Address>>,
    next: u64,
}

/// The network side of FHEVM: holds the network secret, the value behind every handle and who
/// may read it.
pub struct FakeFhevm {
    network: Keypair,
    chain_id: u64,
    ciphertexts: Mutex<Ciphertexts>,
}

impl FakeFhevm {
    pub fn new(chain_id: u64) -> Arc<Self> {
        Arc::new(Self {
            network: Keypair::generate(),
            chain_id,
            ciphertexts: Mutex::new(Ciphertexts::default()),
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn network_key(&self) -> NetworkKey {
        NetworkKey {
            key_id: "fake-network-key".to_string(),
            public_key: self.network.public_key_bytes(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ciphertexts> {
        self.ciphertexts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check an input proof and register its handle. The submitter and the contract it was made
    /// for may use it.
    pub fn accept_input(
        &self,
        handle: B256,
        proof: &[u8],
        contract: Address,
        user: Address,
    ) -> WorkflowResult<u64> {
        let value = verify_input(&self.network, handle, proof, contract, user, self.chain_id)?;
        let mut ciphertexts = self.lock();
        ciphertexts.values.insert(handle, value);
        ciphertexts
            .acl
            .entry(handle)
            .or_default()
            .extend([contract, user]);
        Ok(value)
    }

    /// Store the result of a computation under a fresh handle readable by `allowed`
    pub fn store(&self, value: u64, allowed: &[Address]) -> B256 {
        let mut ciphertexts = self.lock();
        ciphertexts.next += 1;
        let handle = keccak256(
            [
                b"fake-ciphertext".as_slice(),
                ciphertexts.next.to_be_bytes().as_slice(),
            ]
            .concat(),
        );
        ciphertexts.values.insert(handle, value);
        ciphertexts
            .acl
            .insert(handle, allowed.iter().copied().collect());
        handle
    }

    /// The cleartext behind a handle. The zero handle reads as 0.
    pub fn value(&self, handle: &B256) -> Option<u64> {
        if is_zero_handle(handle) {
            return Some(0);
        }
        self.lock().values.get(handle).copied()
    }

    pub fn allow(&self, handle: B256, account: Address) {
        self.lock().acl.entry(handle).or_default().insert(account);
    }

    pub fn is_allowed(&self, handle: &B256, account: &Address) -> bool {
        self.lock()
            .acl
            .get(handle)
            .map(|allowed| allowed.contains(account))
            .unwrap_or(false)
    }
}

/// A coprocessor backed by [`FakeFhevm`]. It enforces what the real relayer does: a valid grant
/// signature, an open window, matching contracts and ACL access for both user and contract.
pub struct FakeCoprocessor {
    fhevm: Arc<FakeFhevm>,
    domain: GrantDomain,
    key_requests: AtomicUsize,
    decrypt_requests: AtomicUsize,
    unavailable: Mutex<Option<String>>,
}

impl FakeCoprocessor {
    pub fn new(fhevm: Arc<FakeFhevm>, domain: GrantDomain) -> Arc<Self> {
        Arc::new(Self {
            fhevm,
            domain,
            key_requests: AtomicUsize::new(0),
            decrypt_requests: AtomicUsize::new(0),
            unavailable: Mutex::new(None),
        })
    }

    pub fn key_requests(&self) -> usize {
        self.key_requests.load(Ordering::SeqCst)
    }

    pub fn decrypt_requests(&self) -> usize {
        self.decrypt_requests.load(Ordering::SeqCst)
    }

    /// Fail every request with `reason` until cleared with `None`
    pub fn set_unavailable(&self, reason: Option<&str>) {
        *self
            .unavailable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = reason.map(str::to_string);
    }

    fn check_available(&self) -> WorkflowResult<()> {
        match &*self
            .unavailable
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
        {
            Some(reason) => Err(WorkflowError::DecryptionFailed(reason.clone())),
            None => Ok(()),
        }
    }
}

fn rejected(reason: impl Into<String>) -> WorkflowError {
    WorkflowError::DecryptionFailed(reason.into())
}

#[async_trait]
impl Coprocessor for FakeCoprocessor {
    async fn network_key(&self) -> WorkflowResult<NetworkKey> {
        self.key_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()
            .map_err(|e| WorkflowError::EncryptionUnavailable(e.to_string()))?;
        Ok(self.fhevm.network_key())
    }

    async fn user_decrypt(&self, request: UserDecryptRequest) -> WorkflowResult<UserDecryptResponse> {
        self.decrypt_requests.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let grant = request.grant()?;
        if !grant.verify(&self.domain)? {
            return Err(rejected("grant was not signed by the user"));
        }
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| rejected(e.to_string()))?
            .as_secs();
        if !grant.is_valid_at(now) {
            return Err(rejected("grant is outside its validity window"));
        }
        let public_key =
            parse_public_key(&grant.public_key).map_err(|e| rejected(e.to_string()))?;

        let mut payloads = Vec::with_capacity(grant.handle_pairs.len());
        for pair in &grant.handle_pairs {
            if !grant.contract_addresses.contains(&pair.contract_address) {
                return Err(rejected(format!(
                    "contract {} is not named in the grant",
                    pair.contract_address
                )));
            }
            if !self.fhevm.is_allowed(&pair.handle, &grant.requester)
                || !self.fhevm.is_allowed(&pair.handle, &pair.contract_address)
            {
                return Err(rejected(format!(
                    "{} is not allowed to decrypt {}",
                    grant.requester, pair.handle
                )));
            }
            let value = self
                .fhevm
                .value(&pair.handle)
                .ok_or_else(|| rejected(format!("unknown handle {}", pair.handle)))?;
            let sealed = crypto::seal(
                &public_key,
                value.to_string().as_bytes(),
                &response_aad(&pair.handle, &grant.requester),
            )
            .map_err(|e| rejected(e.to_string()))?;
            debug!(handle = %pair.handle, "sealed cleartext");
            payloads.push(SealedPayload {
                handle: pair.handle,
                sealed: sealed.into(),
            });
        }

        Ok(UserDecryptResponse { payloads })
    }
}
