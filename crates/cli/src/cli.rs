// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::telemetry::setup_tracing;
use crate::{
    deploy, fundraiser_address, fundraiser_contribute, fundraiser_decrypt, fundraiser_end,
    fundraiser_mint, fundraiser_status, fundraiser_update, token_disclose, token_operator,
    token_status, wallet_address,
};
use anyhow::Result;
use clap::{command, ArgAction, Parser, Subcommand};
use cloak_config::validation::{ValidAddress, ValidUrl};
use cloak_config::{default_config, load_config, AppConfig, DEFAULT_NETWORK};
use tracing::{info, instrument, Level};

#[derive(Parser, Debug)]
#[command(name = "cloak")]
#[command(about = "A CLI for Cloak Capital confidential fundraising campaigns", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Network from the config to run against
    #[arg(short, long, global = true, default_value = DEFAULT_NETWORK)]
    network: String,

    #[command(subcommand)]
    command: Commands,

    /// Indicate error levels by adding additional `-v` arguments. Eg. `cloak -vvv` will give you
    /// trace level output
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true
    )]
    pub verbose: u8,

    /// Silence all output. This argument cannot be used alongside `-v`
    #[arg(
        short,
        long,
        action = ArgAction::SetTrue,
        conflicts_with = "verbose",
        global = true
    )]
    quiet: bool,

    /// Set the Open Telemetry collector grpc endpoint. Eg. http://localhost:4317
    #[arg(long = "otel", global = true)]
    pub otel: Option<ValidUrl>,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.quiet {
            Level::ERROR
        } else {
            match self.verbose {
                0 => Level::WARN,  //
                1 => Level::INFO,  // -v
                2 => Level::DEBUG, // -vv
                _ => Level::TRACE, // -vvv
            }
        }
    }

    #[instrument(skip_all)]
    pub async fn execute(self) -> Result<()> {
        // A missing config file is fine, every other load error is fatal
        let config = match self.load_config() {
            Ok(cfg) => cfg,
            Err(e)
                if matches!(
                    e.downcast_ref::<std::io::Error>(),
                    Some(ioe) if ioe.kind() == std::io::ErrorKind::NotFound
                ) =>
            {
                default_config(&self.network, self.otel.clone().map(Into::into))?
            }
            Err(e) => return Err(e),
        };

        setup_tracing(&config, self.log_level())?;
        info!("Config loaded from: {:?}", config.config_file());

        match self.command {
            Commands::FundraiserAddress => fundraiser_address::execute(&config)?,
            Commands::FundraiserStatus { address } => {
                fundraiser_status::execute(&config, address.map(Into::into)).await?
            }
            Commands::FundraiserContribute {
                amount,
                address,
                note,
            } => {
                fundraiser_contribute::execute(&config, amount, address.map(Into::into), note)
                    .await?
            }
            Commands::FundraiserDecryptTotal { address } => {
                fundraiser_decrypt::total(&config, address.map(Into::into)).await?
            }
            Commands::FundraiserDecryptContribution {
                contributor,
                address,
            } => {
                fundraiser_decrypt::contribution(
                    &config,
                    contributor.into(),
                    address.map(Into::into),
                )
                .await?
            }
            Commands::FundraiserDecryptBalance { account, token } => {
                fundraiser_decrypt::balance(
                    &config,
                    account.map(Into::into),
                    token.map(Into::into),
                )
                .await?
            }
            Commands::FundraiserMint { amount, to, token } => {
                fundraiser_mint::execute(&config, amount, to.map(Into::into), token.map(Into::into))
                    .await?
            }
            Commands::FundraiserUpdate {
                name,
                target,
                end_time,
                address,
            } => {
                fundraiser_update::execute(&config, name, target, end_time, address.map(Into::into))
                    .await?
            }
            Commands::FundraiserEnd { address } => {
                fundraiser_end::execute(&config, address.map(Into::into)).await?
            }
            Commands::TokenStatus { token } => {
                token_status::execute(&config, token.map(Into::into)).await?
            }
            Commands::TokenSetOperator {
                operator,
                until,
                token,
            } => {
                token_operator::set(&config, operator.into(), until, token.map(Into::into)).await?
            }
            Commands::TokenIsOperator {
                holder,
                spender,
                token,
            } => {
                token_operator::check(
                    &config,
                    holder.map(Into::into),
                    spender.into(),
                    token.map(Into::into),
                )
                .await?
            }
            Commands::TokenRequestDisclose { token } => {
                token_disclose::execute(&config, token.map(Into::into)).await?
            }
            Commands::Deploy => deploy::execute(&config).await?,
            Commands::WalletAddress => wallet_address::execute(&config)?,
        }

        Ok(())
    }

    pub fn load_config(&self) -> Result<AppConfig> {
        let config = load_config(
            &self.network,
            self.config.clone(),
            self.otel.clone().map(Into::into),
        )?;
        Ok(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CloakFundraiser and WrapETH addresses
    #[command(name = "fundraiser:address")]
    FundraiserAddress,

    /// Print campaign metadata and encrypted totals
    #[command(name = "fundraiser:status")]
    FundraiserStatus {
        /// CloakFundraiser contract address. Defaults to the deployment record or config.
        #[arg(long)]
        address: Option<ValidAddress>,
    },

    /// Submit an encrypted contribution through WrapETH
    #[command(name = "fundraiser:contribute")]
    FundraiserContribute {
        /// Contribution amount in token base units (uint64)
        #[arg(long)]
        amount: u64,

        /// CloakFundraiser contract address
        #[arg(long)]
        address: Option<ValidAddress>,

        /// Note attached to the transfer, cut to 64 bytes
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Decrypt the total raised. Only the campaign owner is allowed.
    #[command(name = "fundraiser:decrypt-total")]
    FundraiserDecryptTotal {
        /// CloakFundraiser contract address
        #[arg(long)]
        address: Option<ValidAddress>,
    },

    /// Decrypt a contributor's recorded amount
    #[command(name = "fundraiser:decrypt-contribution")]
    FundraiserDecryptContribution {
        /// Contributor address
        #[arg(long)]
        contributor: ValidAddress,

        /// CloakFundraiser contract address
        #[arg(long)]
        address: Option<ValidAddress>,
    },

    /// Decrypt a WrapETH balance. Defaults to the wallet's own balance.
    #[command(name = "fundraiser:decrypt-balance")]
    FundraiserDecryptBalance {
        /// Account whose balance is read
        #[arg(long)]
        account: Option<ValidAddress>,

        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Mint WrapETH in plaintext
    #[command(name = "fundraiser:mint")]
    FundraiserMint {
        /// Amount in token base units (uint64)
        #[arg(long)]
        amount: u64,

        /// Recipient. Defaults to the wallet address.
        #[arg(long)]
        to: Option<ValidAddress>,

        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Update the campaign name, target and end time (owner only)
    #[command(name = "fundraiser:update")]
    FundraiserUpdate {
        #[arg(long)]
        name: String,

        /// Target in token base units (uint64)
        #[arg(long)]
        target: u64,

        /// Unix seconds, RFC 3339 or `YYYY-MM-DDTHH:MM` local time
        #[arg(long = "end-time")]
        end_time: String,

        /// CloakFundraiser contract address
        #[arg(long)]
        address: Option<ValidAddress>,
    },

    /// End the campaign and withdraw the raised funds (owner only)
    #[command(name = "fundraiser:end")]
    FundraiserEnd {
        /// CloakFundraiser contract address
        #[arg(long)]
        address: Option<ValidAddress>,
    },

    /// Print WrapETH metadata and the encrypted total supply handle
    #[command(name = "token:status")]
    TokenStatus {
        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Approve an operator to move the wallet's WrapETH
    #[command(name = "token:set-operator")]
    TokenSetOperator {
        #[arg(long)]
        operator: ValidAddress,

        /// Unix seconds the approval lasts until. Defaults to one day from now.
        #[arg(long)]
        until: Option<u64>,

        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Check whether `spender` may move `holder`'s WrapETH
    #[command(name = "token:is-operator")]
    TokenIsOperator {
        /// Defaults to the wallet address
        #[arg(long)]
        holder: Option<ValidAddress>,

        #[arg(long)]
        spender: ValidAddress,

        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Request public disclosure of the wallet's encrypted balance
    #[command(name = "token:request-disclose")]
    TokenRequestDisclose {
        /// WrapETH contract address
        #[arg(long)]
        token: Option<ValidAddress>,
    },

    /// Deploy WrapETH and CloakFundraiser and record their addresses.
    /// Reads FUND_NAME, FUND_TARGET and FUND_END_TIME from the environment.
    Deploy,

    /// Print the address of the configured wallet
    #[command(name = "wallet:address")]
    WalletAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_names() {
        let cli = Cli::try_parse_from(["cloak", "fundraiser:contribute", "--amount", "1200"])
            .expect("valid args");
        assert!(matches!(
            cli.command,
            Commands::FundraiserContribute { amount: 1200, .. }
        ));
        assert_eq!(cli.network, DEFAULT_NETWORK);

        let cli = Cli::try_parse_from([
            "cloak",
            "-vv",
            "--network",
            "localhost",
            "fundraiser:decrypt-contribution",
            "--contributor",
            "0x0d267E11343206544Ce9e028061215CAb355559f",
        ])
        .expect("valid args");
        assert_eq!(cli.log_level(), Level::DEBUG);
        assert_eq!(cli.network, "localhost");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["cloak", "fundraiser:contribute", "--amount", "-5"]).is_err());
        assert!(Cli::try_parse_from([
            "cloak",
            "fundraiser:decrypt-contribution",
            "--contributor",
            "nope"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["cloak", "-q", "-v", "fundraiser:address"]).is_err());
        assert!(Cli::try_parse_from(["cloak", "token:set-operator", "--until", "10"]).is_err());
    }

    #[test]
    fn test_token_commands() {
        let cli = Cli::try_parse_from([
            "cloak",
            "token:set-operator",
            "--operator",
            "0x0d267E11343206544Ce9e028061215CAb355559f",
            "--until",
            "1800000000",
        ])
        .expect("valid args");
        assert!(matches!(
            cli.command,
            Commands::TokenSetOperator {
                until: Some(1_800_000_000),
                token: None,
                ..
            }
        ));

        let cli = Cli::try_parse_from([
            "cloak",
            "token:is-operator",
            "--spender",
            "0x0d267E11343206544Ce9e028061215CAb355559f",
        ])
        .expect("valid args");
        assert!(matches!(
            cli.command,
            Commands::TokenIsOperator { holder: None, .. }
        ));

        let cli = Cli::try_parse_from(["cloak", "token:request-disclose"]).expect("valid args");
        assert!(matches!(cli.command, Commands::TokenRequestDisclose { token: None }));
        let cli = Cli::try_parse_from(["cloak", "token:status"]).expect("valid args");
        assert!(matches!(cli.command, Commands::TokenStatus { token: None }));
    }
}
