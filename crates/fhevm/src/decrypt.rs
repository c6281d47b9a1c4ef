// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    coprocessor::Coprocessor,
    error::{WorkflowError, WorkflowResult},
    grant::{DynSigner, GrantDomain},
    handle::is_zero_handle,
    session::DecryptionSession,
};
use alloy::primitives::{Address, B256};
use cloak_config::CoprocessorConfig;
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptSettings {
    pub domain: GrantDomain,
    /// Chain the owning contracts live on
    pub contracts_chain_id: u64,
    pub window_days: u64,
}

impl DecryptSettings {
    pub fn new(config: &CoprocessorConfig, contracts_chain_id: u64) -> Self {
        Self {
            domain: GrantDomain::from_config(config),
            contracts_chain_id,
            window_days: config.decryption_window_days,
        }
    }
}

/// Decrypts handles on behalf of the account that signs the grant
#[derive(Clone)]
pub struct UserDecryptor {
    coprocessor: Arc<dyn Coprocessor>,
    settings: DecryptSettings,
}

impl UserDecryptor {
    pub fn new(coprocessor: Arc<dyn Coprocessor>, settings: DecryptSettings) -> Self {
        Self {
            coprocessor,
            settings,
        }
    }

    pub fn settings(&self) -> &DecryptSettings {
        &self.settings
    }

    /// Decrypt `handle` owned by `owning_contract` as the signer's account.
    ///
    /// The zero handle is 0 without any request. Otherwise one grant is signed and exactly one
    /// request is made; failures are returned, never retried.
    #[instrument(skip(self, signer), fields(handle = %handle, contract = %owning_contract))]
    pub async fn decrypt(
        &self,
        handle: B256,
        owning_contract: Address,
        signer: Option<&DynSigner>,
    ) -> WorkflowResult<u64> {
        if is_zero_handle(&handle) {
            debug!("zero handle, nothing recorded");
            return Ok(0);
        }

        let signer = signer.ok_or(WorkflowError::SignerUnavailable)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WorkflowError::DecryptionFailed(e.to_string()))?
            .as_secs();

        let session = DecryptionSession::create(
            handle,
            owning_contract,
            signer,
            &self.settings.domain,
            self.settings.window_days,
            now,
        )
        .await?;

        let request = session.request(self.settings.contracts_chain_id);
        let response = self.coprocessor.user_decrypt(request).await.map_err(|e| {
            warn!(error = %e, "user decryption rejected");
            match e {
                WorkflowError::DecryptionFailed(_) => e,
                other => WorkflowError::DecryptionFailed(other.to_string()),
            }
        })?;

        session.read(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coprocessor::{NetworkKey, UserDecryptRequest, UserDecryptResponse};
    use alloy::signers::local::PrivateKeySigner;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Unreachable {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Coprocessor for Unreachable {
        async fn network_key(&self) -> WorkflowResult<NetworkKey> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WorkflowError::EncryptionUnavailable("offline".to_string()))
        }

        async fn user_decrypt(&self, _: UserDecryptRequest) -> WorkflowResult<UserDecryptResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(WorkflowError::EncryptionUnavailable("offline".to_string()))
        }
    }

    fn decryptor() -> (Arc<Unreachable>, UserDecryptor) {
        let coprocessor = Arc::new(Unreachable::default());
        let settings = DecryptSettings::new(&CoprocessorConfig::default(), 11_155_111);
        (coprocessor.clone(), UserDecryptor::new(coprocessor, settings))
    }

    #[tokio::test]
    async fn test_zero_handle_short_circuits() {
        let (coprocessor, decryptor) = decryptor();
        let value = decryptor.decrypt(B256::ZERO, Address::ZERO, None).await;
        assert_eq!(value, Ok(0));
        assert_eq!(coprocessor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_signer_required() {
        let (coprocessor, decryptor) = decryptor();
        let value = decryptor
            .decrypt(B256::repeat_byte(1), Address::ZERO, None)
            .await;
        assert_eq!(value, Err(WorkflowError::SignerUnavailable));
        assert_eq!(coprocessor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_single_attempt_and_errors_are_decryption_failures() {
        let (coprocessor, decryptor) = decryptor();
        let signer: DynSigner = Arc::new(PrivateKeySigner::random());
        let value = decryptor
            .decrypt(B256::repeat_byte(1), Address::ZERO, Some(&signer))
            .await;
        assert!(matches!(value, Err(WorkflowError::DecryptionFailed(_))));
        assert_eq!(coprocessor.calls.load(Ordering::SeqCst), 1);
    }
}
