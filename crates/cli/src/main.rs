// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use clap::Parser;
use cli::Cli;

mod cli;
mod deploy;
mod fundraiser_address;
mod fundraiser_contribute;
mod fundraiser_decrypt;
mod fundraiser_end;
mod fundraiser_mint;
mod fundraiser_status;
mod fundraiser_update;
pub mod helpers;
mod token_disclose;
mod token_operator;
mod token_status;
mod wallet_address;

#[tokio::main]
pub async fn main() {
    if let Err(err) = Cli::parse().execute().await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
