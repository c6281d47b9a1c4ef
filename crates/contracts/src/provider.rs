// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{
    network::EthereumWallet,
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
    transports::{
        http::{
            reqwest::{
                header::{HeaderMap, HeaderValue, AUTHORIZATION},
                Client,
            },
            Http,
        },
        ws::WsConnect,
        Authorization,
    },
};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use cloak_config::{NetworkConfig, RpcAuth, RpcEndpoint};
use std::env;

pub trait AuthConversions {
    fn to_header_value(&self) -> Option<HeaderValue>;
    fn to_ws_auth(&self) -> Option<Authorization>;
}

impl AuthConversions for RpcAuth {
    fn to_header_value(&self) -> Option<HeaderValue> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => {
                let credentials = STANDARD.encode(format!("{}:{}", username, password));
                HeaderValue::from_str(&format!("Basic {}", credentials)).ok()
            }
            RpcAuth::Bearer(token) => HeaderValue::from_str(&format!("Bearer {}", token)).ok(),
        }
    }

    fn to_ws_auth(&self) -> Option<Authorization> {
        match self {
            RpcAuth::None => None,
            RpcAuth::Basic { username, password } => Some(Authorization::basic(username, password)),
            RpcAuth::Bearer(token) => Some(Authorization::bearer(token)),
        }
    }
}

/// Builds providers for one configured network
pub struct ProviderConfig {
    rpc: RpcEndpoint,
    auth: RpcAuth,
}

impl ProviderConfig {
    pub fn new(rpc: RpcEndpoint, auth: RpcAuth) -> Self {
        Self { rpc, auth }
    }

    pub fn from_network(network: &NetworkConfig) -> Result<Self> {
        Ok(Self::new(network.rpc()?, network.rpc_auth.clone()))
    }

    pub async fn create_readonly_provider(&self) -> Result<DynProvider> {
        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .connect_client(self.create_http_client()?)
                .erased()
        };

        Ok(provider)
    }

    pub async fn create_signer_provider(&self, signer: &PrivateKeySigner) -> Result<DynProvider> {
        let wallet = EthereumWallet::from(signer.clone());

        let provider = if self.rpc.is_websocket() {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_ws(self.create_ws_connect()?)
                .await
                .context("Failed to connect to WebSocket RPC. Check if the node is running and URL is correct.")?
                .erased()
        } else {
            ProviderBuilder::new()
                .wallet(wallet)
                .connect_client(self.create_http_client()?)
                .erased()
        };

        Ok(provider)
    }

    fn create_ws_connect(&self) -> Result<WsConnect> {
        let mut ws_connect = WsConnect::new(self.rpc.as_ws_url()?);

        if let Some(auth) = self.auth.to_ws_auth() {
            ws_connect = ws_connect.with_auth(auth);
        }

        Ok(ws_connect)
    }

    fn create_http_client(&self) -> Result<alloy::rpc::client::RpcClient> {
        let mut headers = HeaderMap::new();
        if let Some(auth_header) = self.auth.to_header_value() {
            headers.insert(AUTHORIZATION, auth_header);
        }

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        let is_local = self.rpc.is_local();
        let http = Http::with_client(client, self.rpc.as_http_url()?.parse()?);
        Ok(alloy::rpc::client::RpcClient::new(http, is_local))
    }
}

/// Read a hex private key from the environment and scrub the variable afterwards
pub fn load_signer_from_env(var: &str) -> Result<PrivateKeySigner> {
    let private_key = env::var(var).with_context(|| format!("{} is not set", var))?;
    env::remove_var(var);
    private_key
        .trim()
        .parse()
        .with_context(|| format!("{} does not hold a valid private key", var))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_headers() {
        let basic = RpcAuth::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(
            basic.to_header_value().unwrap(),
            HeaderValue::from_static("Basic dXNlcjpwYXNz")
        );

        let bearer = RpcAuth::Bearer("token".to_string());
        assert_eq!(
            bearer.to_header_value().unwrap(),
            HeaderValue::from_static("Bearer token")
        );
        assert!(RpcAuth::None.to_header_value().is_none());
        assert!(RpcAuth::None.to_ws_auth().is_none());
    }

    #[test]
    fn test_load_signer_from_env() -> Result<()> {
        let var = "CLOAK_TEST_SIGNER_KEY";
        env::set_var(
            var,
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        );
        let signer = load_signer_from_env(var)?;
        assert_eq!(
            signer.address().to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        // the key does not linger in the environment
        assert!(env::var(var).is_err());
        assert!(load_signer_from_env(var).is_err());
        Ok(())
    }
}
