// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    coprocessor::{Coprocessor, NetworkKey, UserDecryptRequest, UserDecryptResponse},
    error::{WorkflowError, WorkflowResult},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, instrument};
use url::Url;

const KEY_PATH: &str = "v1/network-key";
const USER_DECRYPT_PATH: &str = "v1/user-decrypt";

#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

/// HTTP client for a cloak coprocessor.
///
/// Both endpoints exchange JSON wrapped in `{"response": ...}`. `GET v1/network-key` returns a
/// [`NetworkKey`] and `POST v1/user-decrypt` takes a [`UserDecryptRequest`].
#[derive(Clone, Debug)]
pub struct RelayerClient {
    http: reqwest::Client,
    base: Url,
    key_url: Url,
    user_decrypt_url: Url,
}

impl RelayerClient {
    pub fn new(url: &str) -> WorkflowResult<Self> {
        let bad_url = |reason: String| {
            WorkflowError::EncryptionUnavailable(format!("bad relayer url: {reason}"))
        };
        let mut base = Url::parse(url).map_err(|e| bad_url(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(bad_url(format!("{url} is not an http(s) url")));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let key_url = base.join(KEY_PATH).map_err(|e| bad_url(e.to_string()))?;
        let user_decrypt_url = base
            .join(USER_DECRYPT_PATH)
            .map_err(|e| bad_url(e.to_string()))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            key_url,
            user_decrypt_url,
        })
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("relayer returned {}: {}", status, body));
        }
        response
            .json::<Envelope<T>>()
            .await
            .map(|e| e.response)
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Coprocessor for RelayerClient {
    #[instrument(skip(self), fields(relayer = %self.base))]
    async fn network_key(&self) -> WorkflowResult<NetworkKey> {
        let response = self
            .http
            .get(self.key_url.clone())
            .send()
            .await
            .map_err(|e| WorkflowError::EncryptionUnavailable(e.to_string()))?;
        Self::parse(response)
            .await
            .map_err(WorkflowError::EncryptionUnavailable)
    }

    #[instrument(skip(self, request), fields(relayer = %self.base, user = %request.user_address))]
    async fn user_decrypt(&self, request: UserDecryptRequest) -> WorkflowResult<UserDecryptResponse> {
        debug!(pairs = request.handle_contract_pairs.len(), "requesting user decryption");
        let response = self
            .http
            .post(self.user_decrypt_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| WorkflowError::DecryptionFailed(e.to_string()))?;
        Self::parse(response)
            .await
            .map_err(WorkflowError::DecryptionFailed)
    }
}
