// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    FakeChain, FakeCoprocessor, FakeFhevm, FAKE_FUNDRAISER_ADDRESS, FAKE_TOKEN_ADDRESS,
};
use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use anyhow::Result;
use cloak_client::{FundraiserClient, Wallet};
use cloak_config::{CoprocessorConfig, HARDHAT_CHAIN_ID};
use cloak_contracts::TokenWrite;
use cloak_fhevm::{DecryptSettings, NetworkKeyEncryptor, UserDecryptor};
use std::{
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

pub const FAKE_CHAIN_ID: u64 = HARDHAT_CHAIN_ID;

const WEEK_SECS: u64 = 7 * 24 * 60 * 60;

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub fn rand_wallet() -> Wallet {
    Wallet::from_private_key(PrivateKeySigner::random())
}

/// A deployed token and fundraiser on a fake chain, a coprocessor for it and the owner's wallet
pub struct FundraiserFixture {
    pub fhevm: Arc<FakeFhevm>,
    pub coprocessor: Arc<FakeCoprocessor>,
    pub chain: FakeChain,
    pub owner: Wallet,
    pub settings: DecryptSettings,
}

impl Default for FundraiserFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl FundraiserFixture {
    /// A campaign that is open for another week
    pub fn new() -> Self {
        let settings = DecryptSettings::new(&CoprocessorConfig::default(), FAKE_CHAIN_ID);
        let fhevm = FakeFhevm::new(FAKE_CHAIN_ID);
        let coprocessor = FakeCoprocessor::new(fhevm.clone(), settings.domain);
        let owner = rand_wallet();
        let now = unix_now();
        let chain = FakeChain::new(fhevm.clone(), owner.account(), now, now + WEEK_SECS);

        Self {
            fhevm,
            coprocessor,
            chain,
            owner,
            settings,
        }
    }

    pub fn encryptor(&self) -> Arc<NetworkKeyEncryptor> {
        Arc::new(NetworkKeyEncryptor::new(
            self.coprocessor.clone(),
            FAKE_CHAIN_ID,
        ))
    }

    pub fn decryptor(&self) -> UserDecryptor {
        UserDecryptor::new(self.coprocessor.clone(), self.settings)
    }

    /// A client pointed at the fixture's contracts, connected as `wallet` when one is given
    pub fn client(&self, wallet: Option<&Wallet>) -> FundraiserClient {
        let chain = match wallet {
            Some(w) => self.chain.connect(w.account()),
            None => self.chain.read_only(),
        };
        let client = FundraiserClient::new(Arc::new(chain), self.encryptor(), self.decryptor())
            .with_addresses(
                FAKE_FUNDRAISER_ADDRESS.to_string(),
                FAKE_TOKEN_ADDRESS.to_string(),
            );
        match wallet {
            Some(w) => client.with_wallet(w.clone()),
            None => client,
        }
    }

    /// Mint plaintext tokens to `to` and wait for the mint to land
    pub async fn fund(&self, to: Address, amount: u64) -> Result<()> {
        self.chain
            .connect(self.owner.account())
            .token()
            .mint(to, amount)
            .await?
            .confirmed()
            .await?;
        Ok(())
    }
}
