// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use cloak_contracts::{
    FundraiserRead, FundraiserWrite, ReadFactory, TokenRead, TokenWrite, WriteFactory,
};
use cloak_fhevm::DynSigner;
use std::{fmt, sync::Arc};

/// Hands out contract access for whichever addresses the user entered
pub trait ContractProvider: Send + Sync {
    fn fundraiser_reader(&self, address: Address) -> Arc<dyn FundraiserRead>;

    fn token_reader(&self, address: Address) -> Arc<dyn TokenRead>;

    /// `None` when no wallet is connected
    fn fundraiser_writer(&self, address: Address) -> Option<Arc<dyn FundraiserWrite>>;

    fn token_writer(&self, address: Address) -> Option<Arc<dyn TokenWrite>>;
}

impl ContractProvider for ReadFactory {
    fn fundraiser_reader(&self, address: Address) -> Arc<dyn FundraiserRead> {
        Arc::new(self.fundraiser(address))
    }

    fn token_reader(&self, address: Address) -> Arc<dyn TokenRead> {
        Arc::new(self.token(address))
    }

    fn fundraiser_writer(&self, _: Address) -> Option<Arc<dyn FundraiserWrite>> {
        None
    }

    fn token_writer(&self, _: Address) -> Option<Arc<dyn TokenWrite>> {
        None
    }
}

impl ContractProvider for WriteFactory {
    fn fundraiser_reader(&self, address: Address) -> Arc<dyn FundraiserRead> {
        Arc::new(self.fundraiser(address))
    }

    fn token_reader(&self, address: Address) -> Arc<dyn TokenRead> {
        Arc::new(self.token(address))
    }

    fn fundraiser_writer(&self, address: Address) -> Option<Arc<dyn FundraiserWrite>> {
        Some(Arc::new(self.fundraiser(address)))
    }

    fn token_writer(&self, address: Address) -> Option<Arc<dyn TokenWrite>> {
        Some(Arc::new(self.token(address)))
    }
}

/// The connected account and the key that signs for it
#[derive(Clone)]
pub struct Wallet {
    account: Address,
    signer: DynSigner,
}

impl Wallet {
    pub fn new(signer: DynSigner) -> Self {
        Self {
            account: signer.address(),
            signer,
        }
    }

    pub fn from_private_key(signer: PrivateKeySigner) -> Self {
        Self::new(Arc::new(signer))
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn signer(&self) -> &DynSigner {
        &self.signer
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("account", &self.account)
            .finish()
    }
}
