// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::load_config::{find_in_parent, resolve_config_path, DEFAULT_CONFIG_NAME};
use crate::network_config::{NetworkConfig, HARDHAT_CHAIN_ID};
use crate::yaml::load_yaml_with_env;
use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use figment::{
    providers::{Format, Serialized, Yaml},
    Figment,
};
use path_clean::clean;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

pub const DEFAULT_NETWORK: &str = "sepolia";
pub const DEFAULT_DECRYPTION_WINDOW_DAYS: u64 = 10;
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Where and how to reach the off-chain decryption service.
///
/// The client speaks the cloak coprocessor's JSON protocol, not the Zama relayer SDK protocol,
/// so there is no public default endpoint. `url` must point at a cloak coprocessor and the grant
/// domain fields must match the ones that coprocessor verifies against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoprocessorConfig {
    /// Base url of the coprocessor
    pub url: Option<String>,
    /// Chain id used in the EIP-712 domain of decryption grants
    pub gateway_chain_id: u64,
    /// Verifying contract used in the EIP-712 domain of decryption grants
    pub decryption_contract: Address,
    /// Validity window of each decryption grant
    pub decryption_window_days: u64,
}

impl CoprocessorConfig {
    /// The configured coprocessor url
    pub fn endpoint(&self) -> Result<&str> {
        match self.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => bail!(
                "No coprocessor configured. Set coprocessor.url in {} to the url of a cloak coprocessor.",
                DEFAULT_CONFIG_NAME
            ),
        }
    }
}

impl Default for CoprocessorConfig {
    fn default() -> Self {
        Self {
            url: None,
            gateway_chain_id: HARDHAT_CHAIN_ID,
            decryption_contract: Address::ZERO,
            decryption_window_days: DEFAULT_DECRYPTION_WINDOW_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key of the signing account
    pub private_key_env: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            private_key_env: DEFAULT_PRIVATE_KEY_ENV.to_string(),
        }
    }
}

/// The config actually used throughout the app. Scoped to a single network.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    network: NetworkConfig,
    networks: Vec<NetworkConfig>,
    coprocessor: CoprocessorConfig,
    wallet: WalletConfig,
    deployments_dir: PathBuf,
    artifacts_dir: PathBuf,
    config_file: Option<PathBuf>,
    otel: Option<String>,
}

impl AppConfig {
    pub fn try_from_unscoped(name: &str, config: UnscopedAppConfig, cwd: &PathBuf) -> Result<Self> {
        let Some(network) = config.networks.iter().find(|n| n.name == name).cloned() else {
            let known: Vec<&str> = config.networks.iter().map(|n| n.name.as_str()).collect();
            bail!(
                "Could not find network '{}'. Known networks: [{}]",
                name,
                known.join(", ")
            );
        };

        // Relative folders are taken from the folder holding the config file, or cwd when running
        // on defaults
        let base = config
            .found_config_file
            .as_ref()
            .and_then(|f| f.parent().map(PathBuf::from))
            .unwrap_or_else(|| cwd.clone());

        let relative_to_base = |p: &PathBuf| {
            if p.is_absolute() {
                p.clone()
            } else {
                clean(base.join(p))
            }
        };

        if config.coprocessor.decryption_window_days == 0 {
            bail!("coprocessor.decryption_window_days must be at least 1");
        }

        Ok(AppConfig {
            network,
            deployments_dir: relative_to_base(&config.deployments_dir),
            artifacts_dir: relative_to_base(&config.artifacts_dir),
            networks: config.networks,
            coprocessor: config.coprocessor,
            wallet: config.wallet,
            config_file: config.found_config_file,
            otel: config.otel,
        })
    }

    /// The network selected for this run
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Every network listed in the configuration
    pub fn networks(&self) -> &Vec<NetworkConfig> {
        &self.networks
    }

    pub fn coprocessor(&self) -> &CoprocessorConfig {
        &self.coprocessor
    }

    pub fn wallet(&self) -> &WalletConfig {
        &self.wallet
    }

    /// Folder holding `<network>/<Contract>.json` deployment records
    pub fn deployments_dir(&self) -> PathBuf {
        self.deployments_dir.join(&self.network.name)
    }

    /// Folder holding compiled contract artifacts
    pub fn artifacts_dir(&self) -> &PathBuf {
        &self.artifacts_dir
    }

    /// The config file the values were read from, if any
    pub fn config_file(&self) -> Option<&PathBuf> {
        self.config_file.as_ref()
    }

    /// Get the open telemetry collector url
    pub fn otel(&self) -> Option<String> {
        self.otel.clone()
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct UnscopedAppConfig {
    networks: Vec<NetworkConfig>,
    coprocessor: CoprocessorConfig,
    wallet: WalletConfig,
    deployments_dir: PathBuf,
    artifacts_dir: PathBuf,
    /// The config file as found before scoping. Set by the loader; not meant for config files.
    found_config_file: Option<PathBuf>,
    otel: Option<String>,
}

impl Default for UnscopedAppConfig {
    fn default() -> Self {
        Self {
            networks: vec![NetworkConfig::sepolia(), NetworkConfig::localhost()],
            coprocessor: CoprocessorConfig::default(),
            wallet: WalletConfig::default(),
            deployments_dir: PathBuf::from("deployments"),
            artifacts_dir: PathBuf::from("artifacts"),
            found_config_file: None,
            otel: None,
        }
    }
}

impl UnscopedAppConfig {
    /// Scope to a network using the process cwd
    pub fn into_scoped(self, name: &str) -> Result<AppConfig> {
        AppConfig::try_from_unscoped(name, self, &env::current_dir()?)
    }

    pub fn into_scoped_with_cwd(self, name: &str, cwd: &PathBuf) -> Result<AppConfig> {
        AppConfig::try_from_unscoped(name, self, cwd)
    }
}

/// Value struct for passing configuration from the cli to the configuration
#[derive(Default, Serialize, Deserialize, Clone, Debug)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otel: Option<String>,
    pub found_config_file: Option<PathBuf>,
}

/// Load the config at the given file or the resolved default location and scope it to a network.
///
/// If no file exists the returned error downcasts to an `io::Error` of kind `NotFound`.
pub fn load_config(
    network: &str,
    config_file: Option<String>,
    otel: Option<String>,
) -> Result<AppConfig> {
    let config_file = config_file.map(PathBuf::from);

    let resolved_config_path = resolve_config_path(
        find_in_parent,
        env::current_dir()?,
        OsDirs::config_dir()?,
        DEFAULT_CONFIG_NAME,
        config_file,
    );

    let loaded_yaml = load_yaml_with_env(&resolved_config_path)?;

    let config: UnscopedAppConfig =
        Figment::from(Serialized::defaults(&UnscopedAppConfig::default()))
            .merge(Yaml::string(&loaded_yaml))
            .merge(Serialized::defaults(&CliOverrides {
                otel,
                found_config_file: Some(resolved_config_path),
            }))
            .extract()
            .context("Could not parse configuration")?;

    config
        .into_scoped(network)
        .with_context(|| format!("Could not apply network '{}' to configuration.", network))
}

/// Built in configuration used when no config file exists
pub fn default_config(network: &str, otel: Option<String>) -> Result<AppConfig> {
    let mut config = UnscopedAppConfig::default();
    config.otel = otel;
    config.into_scoped(network)
}

pub struct OsDirs;
impl OsDirs {
    pub fn config_dir() -> Result<PathBuf> {
        let Some(dir) = dirs::config_dir() else {
            bail!("This OS does not provide a config dir. See https://docs.rs/dirs for more information.");
        };
        Ok(dir.join("cloak"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcAuth;
    use figment::Jail;

    const CONFIG: &str = r#"
deployments_dir: "./deploys"
coprocessor:
  url: "http://localhost:3000"
  decryption_window_days: 3
networks:
  - name: "hardhat"
    rpc_url: "ws://localhost:8545"
    chain_id: 31337
    rpc_auth:
      type: "Basic"
      credentials:
        username: "testUser"
        password: "testPassword"
    contracts:
      token: "0x5FbDB2315678afecb367f032d93F642f64180aa3"
      fundraiser:
        address: "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
        deploy_block: 2
"#;

    #[test]
    fn test_deserialization() -> Result<()> {
        let unscoped: UnscopedAppConfig = serde_yaml::from_str(CONFIG)?;
        let config = unscoped.into_scoped_with_cwd("hardhat", &PathBuf::from("/my/cwd"))?;

        let network = config.network();
        assert_eq!(network.chain_id, Some(31337));
        assert_eq!(
            network.rpc_auth,
            RpcAuth::Basic {
                username: "testUser".to_string(),
                password: "testPassword".to_string()
            }
        );
        assert_eq!(
            network.contracts.fundraiser.as_ref().unwrap().deploy_block(),
            Some(2)
        );
        assert_eq!(config.coprocessor().endpoint()?, "http://localhost:3000");
        assert_eq!(config.coprocessor().decryption_window_days, 3);
        // unspecified coprocessor fields keep their defaults
        assert_eq!(config.coprocessor().gateway_chain_id, HARDHAT_CHAIN_ID);
        assert_eq!(config.coprocessor().decryption_contract, Address::ZERO);
        assert_eq!(
            config.deployments_dir(),
            PathBuf::from("/my/cwd/deploys/hardhat")
        );
        assert_eq!(config.wallet().private_key_env, "PRIVATE_KEY");
        Ok(())
    }

    #[test]
    fn test_unknown_network() -> Result<()> {
        let unscoped: UnscopedAppConfig = serde_yaml::from_str(CONFIG)?;
        let err = unscoped
            .into_scoped_with_cwd("mainnet", &PathBuf::from("/"))
            .unwrap_err();
        assert!(err.to_string().contains("hardhat"));
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config =
            UnscopedAppConfig::default().into_scoped_with_cwd("sepolia", &PathBuf::from("/w"))?;
        assert_eq!(config.network().chain_id, Some(11_155_111));
        assert_eq!(
            config
                .network()
                .contracts
                .fundraiser
                .as_ref()
                .unwrap()
                .address(),
            "0x0d267E11343206544Ce9e028061215CAb355559f"
        );
        assert_eq!(config.coprocessor().decryption_window_days, 10);
        assert_eq!(config.coprocessor().url, None);
        let err = config.coprocessor().endpoint().unwrap_err();
        assert!(err.to_string().contains("coprocessor.url"));
        assert_eq!(config.deployments_dir(), PathBuf::from("/w/deployments/sepolia"));
        Ok(())
    }

    #[test]
    fn test_file_not_found() -> Result<()> {
        let Err(err) = load_config("sepolia", Some("/nope/cloak.config.yaml".to_string()), None)
        else {
            bail!("error expected");
        };
        let Some(e) = err.downcast_ref::<std::io::Error>() else {
            bail!("io error expected");
        };
        assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_config_file_with_env() {
        Jail::expect_with(|jail| {
            jail.set_env("CLOAK_TEST_TOKEN", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
            jail.create_file(
                "cloak.config.yaml",
                r#"
networks:
  - name: "localhost"
    rpc_url: "http://127.0.0.1:8545"
    contracts:
      token: "${CLOAK_TEST_TOKEN}"
"#,
            )?;

            let path = jail.directory().join("cloak.config.yaml");
            let config = load_config(
                "localhost",
                Some(path.to_string_lossy().to_string()),
                Some("http://localhost:4317".to_string()),
            )
            .map_err(|e| e.to_string())?;

            let token = config.network().contracts.token.clone().unwrap();
            assert_eq!(token.address(), "0x5FbDB2315678afecb367f032d93F642f64180aa3");
            assert_eq!(config.otel(), Some("http://localhost:4317".to_string()));
            assert_eq!(config.config_file(), Some(&path));
            assert_eq!(
                config.deployments_dir(),
                jail.directory().join("deployments").join("localhost")
            );
            Ok(())
        });
    }
}
