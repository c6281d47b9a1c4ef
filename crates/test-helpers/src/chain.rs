// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::FakeFhevm;
use alloy::primitives::{address, keccak256, Address, Bytes, TxHash, B256};
use async_trait::async_trait;
use cloak_client::ContractProvider;
use cloak_contracts::{
    ChainError, ChainResult, ConfirmedTx, FundraiserRead, FundraiserWrite, PendingTx, TokenRead,
    TokenWrite,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use tokio::sync::watch;
use tracing::debug;

pub const FAKE_TOKEN_ADDRESS: Address = address!("A8a92e63Ab6517b647949F850233dDF18605fCa0");
pub const FAKE_FUNDRAISER_ADDRESS: Address = address!("0d267E11343206544Ce9e028061215CAb355559f");

const GAS_USED: u64 = 120_000;

#[derive(Debug, Clone)]
struct Campaign {
    name: String,
    target_amount: u64,
    end_time: u64,
    owner: Address,
    ended: bool,
}

struct ChainState {
    now: u64,
    campaign: Campaign,
    balances: HashMap<Address, B256>,
    contributions: HashMap<Address, B256>,
    total_raised: B256,
    total_supply: B256,
    operators: HashMap<(Address, Address), u64>,
    disclose_requests: Vec<B256>,
    sent: Vec<&'static str>,
    next_failure: Option<ChainError>,
}

struct Inner {
    fhevm: Arc<FakeFhevm>,
    state: Mutex<ChainState>,
    gate: watch::Sender<bool>,
    reads: AtomicUsize,
}

/// An in-memory chain running WrapETH and one CloakFundraiser with the contracts' rules.
///
/// Clones share the chain; [`FakeChain::connect`] gives a view that sends as another account.
#[derive(Clone)]
pub struct FakeChain {
    inner: Arc<Inner>,
    sender: Option<Address>,
}

impl FakeChain {
    pub fn new(fhevm: Arc<FakeFhevm>, owner: Address, now: u64, end_time: u64) -> Self {
        let (gate, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                fhevm,
                state: Mutex::new(ChainState {
                    now,
                    campaign: Campaign {
                        name: "Cloak Capital Raise".to_string(),
                        target_amount: 1_000_000,
                        end_time,
                        owner,
                        ended: false,
                    },
                    balances: HashMap::new(),
                    contributions: HashMap::new(),
                    total_raised: B256::ZERO,
                    total_supply: B256::ZERO,
                    operators: HashMap::new(),
                    disclose_requests: Vec::new(),
                    sent: Vec::new(),
                    next_failure: None,
                }),
                gate,
                reads: AtomicUsize::new(0),
            }),
            sender: None,
        }
    }

    /// The same chain, sending as `account`
    pub fn connect(&self, account: Address) -> Self {
        Self {
            inner: self.inner.clone(),
            sender: Some(account),
        }
    }

    pub fn read_only(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            sender: None,
        }
    }

    pub fn fhevm(&self) -> &Arc<FakeFhevm> {
        &self.inner.fhevm
    }

    pub fn token(&self) -> FakeToken {
        FakeToken {
            chain: self.clone(),
            address: FAKE_TOKEN_ADDRESS,
        }
    }

    pub fn fundraiser(&self) -> FakeFundraiser {
        FakeFundraiser {
            chain: self.clone(),
            address: FAKE_FUNDRAISER_ADDRESS,
        }
    }

    pub fn set_now(&self, now: u64) {
        self.lock().now = now;
    }

    /// Report `error` when the next submitted transaction is awaited. A revert leaves the state
    /// untouched.
    pub fn fail_next_confirmation(&self, error: ChainError) {
        self.lock().next_failure = Some(error);
    }

    /// Keep submitted transactions unconfirmed until [`FakeChain::release_confirmations`]
    pub fn hold_confirmations(&self) {
        self.inner.gate.send_replace(true);
    }

    pub fn release_confirmations(&self) {
        self.inner.gate.send_replace(false);
    }

    /// Names of the write methods submitted so far
    pub fn sent(&self) -> Vec<&'static str> {
        self.lock().sent.clone()
    }

    /// Handles whose public disclosure was requested
    pub fn disclose_requests(&self) -> Vec<B256> {
        self.lock().disclose_requests.clone()
    }

    pub fn reads(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, ChainState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T>(&self, address: Address, expected: Address, f: impl FnOnce(&ChainState) -> T) -> ChainResult<T> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        if address != expected {
            return Err(ChainError::Call(format!("no contract at {}", address)));
        }
        let state = self.lock();
        Ok(f(&state))
    }

    fn submit(
        &self,
        method: &'static str,
        apply: impl FnOnce(&mut ChainState, &FakeFhevm, Address) -> ChainResult<()>,
    ) -> ChainResult<PendingTx> {
        let sender = self
            .sender
            .ok_or_else(|| ChainError::Network("no account to send from".to_string()))?;

        let (hash, block, failure) = {
            let mut state = self.lock();
            let failure = state.next_failure.take();
            if !matches!(failure, Some(ChainError::Reverted(_))) {
                apply(&mut state, &self.inner.fhevm, sender)?;
            }
            state.sent.push(method);
            let block = state.sent.len() as u64;
            let hash: TxHash = keccak256([method.as_bytes(), block.to_be_bytes().as_slice()].concat());
            (hash, block, failure)
        };
        debug!(tx = %hash, method, "fake transaction submitted");

        let mut gate = self.inner.gate.subscribe();
        Ok(PendingTx::new(hash, async move {
            let _ = gate.wait_for(|held| !*held).await;
            match failure {
                Some(error) => Err(error),
                None => Ok(ConfirmedTx {
                    hash,
                    block_number: Some(block),
                    gas_used: GAS_USED,
                    contract_address: None,
                }),
            }
        }))
    }
}

fn reverted(reason: &str) -> ChainError {
    ChainError::Reverted(reason.to_string())
}

impl ChainState {
    fn is_active(&self) -> bool {
        !self.campaign.ended && self.now < self.campaign.end_time
    }

    fn credit(&mut self, fhevm: &FakeFhevm, account: Address, amount: u64, debit: bool) {
        let current = self
            .balances
            .get(&account)
            .and_then(|h| fhevm.value(h))
            .unwrap_or(0);
        let next = if debit {
            current.saturating_sub(amount)
        } else {
            current.saturating_add(amount)
        };
        let handle = fhevm.store(next, &[account, FAKE_TOKEN_ADDRESS]);
        self.balances.insert(account, handle);
    }

    /// The fundraiser's receiver hook. Returns false to have the token refund the sender.
    fn receive_contribution(&mut self, fhevm: &FakeFhevm, from: Address, amount: u64) -> bool {
        if !self.is_active() {
            return false;
        }
        let previous = self
            .contributions
            .get(&from)
            .and_then(|h| fhevm.value(h))
            .unwrap_or(0);
        let contribution = fhevm.store(
            previous.saturating_add(amount),
            &[from, FAKE_FUNDRAISER_ADDRESS],
        );
        self.contributions.insert(from, contribution);

        let total = fhevm.value(&self.total_raised).unwrap_or(0);
        self.total_raised = fhevm.store(
            total.saturating_add(amount),
            &[self.campaign.owner, FAKE_FUNDRAISER_ADDRESS],
        );
        true
    }
}

pub struct FakeToken {
    chain: FakeChain,
    address: Address,
}

#[async_trait]
impl TokenRead for FakeToken {
    fn address(&self) -> Address {
        self.address
    }

    async fn name(&self) -> ChainResult<String> {
        self.chain
            .read(self.address, FAKE_TOKEN_ADDRESS, |_| "Wrap ETH".to_string())
    }

    async fn symbol(&self) -> ChainResult<String> {
        self.chain
            .read(self.address, FAKE_TOKEN_ADDRESS, |_| "wETH".to_string())
    }

    async fn decimals(&self) -> ChainResult<u8> {
        self.chain.read(self.address, FAKE_TOKEN_ADDRESS, |_| 6)
    }

    async fn confidential_balance_of(&self, account: Address) -> ChainResult<B256> {
        self.chain.read(self.address, FAKE_TOKEN_ADDRESS, |s| {
            s.balances.get(&account).copied().unwrap_or(B256::ZERO)
        })
    }

    async fn confidential_total_supply(&self) -> ChainResult<B256> {
        self.chain
            .read(self.address, FAKE_TOKEN_ADDRESS, |s| s.total_supply)
    }

    async fn is_operator(&self, holder: Address, spender: Address) -> ChainResult<bool> {
        self.chain.read(self.address, FAKE_TOKEN_ADDRESS, |s| {
            holder == spender
                || s.operators
                    .get(&(holder, spender))
                    .map(|until| *until >= s.now)
                    .unwrap_or(false)
        })
    }
}

#[async_trait]
impl TokenWrite for FakeToken {
    async fn mint(&self, to: Address, amount: u64) -> ChainResult<PendingTx> {
        self.chain.submit("mint", |state, fhevm, _| {
            state.credit(fhevm, to, amount, false);
            let supply = fhevm.value(&state.total_supply).unwrap_or(0);
            state.total_supply = fhevm.store(supply.saturating_add(amount), &[FAKE_TOKEN_ADDRESS]);
            Ok(())
        })
    }

    async fn confidential_transfer_and_call(
        &self,
        to: Address,
        handle: B256,
        input_proof: Bytes,
        _data: Bytes,
    ) -> ChainResult<PendingTx> {
        self.chain
            .submit("confidentialTransferAndCall", |state, fhevm, from| {
                let amount = fhevm
                    .accept_input(handle, &input_proof, FAKE_TOKEN_ADDRESS, from)
                    .map_err(|e| reverted(&e.to_string()))?;

                let balance = state
                    .balances
                    .get(&from)
                    .and_then(|h| fhevm.value(h))
                    .unwrap_or(0);
                // an encrypted transfer above the balance moves nothing instead of reverting
                let moved = if amount <= balance { amount } else { 0 };

                let accepted = if to == FAKE_FUNDRAISER_ADDRESS {
                    state.receive_contribution(fhevm, from, moved)
                } else {
                    true
                };
                let moved = if accepted { moved } else { 0 };

                state.credit(fhevm, from, moved, true);
                state.credit(fhevm, to, moved, false);
                Ok(())
            })
    }

    async fn set_operator(&self, operator: Address, until: u64) -> ChainResult<PendingTx> {
        self.chain.submit("setOperator", |state, _, holder| {
            state.operators.insert((holder, operator), until);
            Ok(())
        })
    }

    async fn request_disclose_encrypted_amount(&self, handle: B256) -> ChainResult<PendingTx> {
        self.chain
            .submit("requestDiscloseEncryptedAmount", |state, fhevm, sender| {
                if !fhevm.is_allowed(&handle, &sender) {
                    return Err(reverted("sender may not disclose this amount"));
                }
                state.disclose_requests.push(handle);
                Ok(())
            })
    }
}

pub struct FakeFundraiser {
    chain: FakeChain,
    address: Address,
}

#[async_trait]
impl FundraiserRead for FakeFundraiser {
    fn address(&self) -> Address {
        self.address
    }

    async fn campaign_name(&self) -> ChainResult<String> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.campaign.name.clone())
    }

    async fn target_amount(&self) -> ChainResult<u64> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.campaign.target_amount)
    }

    async fn end_time(&self) -> ChainResult<u64> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.campaign.end_time)
    }

    async fn owner(&self) -> ChainResult<Address> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.campaign.owner)
    }

    async fn is_active(&self) -> ChainResult<bool> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.is_active())
    }

    async fn is_ended(&self) -> ChainResult<bool> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.campaign.ended)
    }

    async fn token(&self) -> ChainResult<Address> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |_| FAKE_TOKEN_ADDRESS)
    }

    async fn total_raised(&self) -> ChainResult<B256> {
        self.chain
            .read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| s.total_raised)
    }

    async fn contribution_of(&self, contributor: Address) -> ChainResult<B256> {
        self.chain.read(self.address, FAKE_FUNDRAISER_ADDRESS, |s| {
            s.contributions
                .get(&contributor)
                .copied()
                .unwrap_or(B256::ZERO)
        })
    }
}

#[async_trait]
impl FundraiserWrite for FakeFundraiser {
    async fn update_campaign(
        &self,
        name: String,
        target_amount: u64,
        end_time: u64,
    ) -> ChainResult<PendingTx> {
        self.chain.submit("updateCampaign", |state, _, sender| {
            if sender != state.campaign.owner {
                return Err(reverted("NotOwner"));
            }
            if state.campaign.ended {
                return Err(reverted("CampaignEnded"));
            }
            if end_time <= state.now {
                return Err(reverted("InvalidEndTime"));
            }
            state.campaign.name = name;
            state.campaign.target_amount = target_amount;
            state.campaign.end_time = end_time;
            Ok(())
        })
    }

    async fn end_fundraising(&self) -> ChainResult<PendingTx> {
        self.chain.submit("endFundraising", |state, fhevm, sender| {
            if sender != state.campaign.owner {
                return Err(reverted("NotOwner"));
            }
            if state.campaign.ended {
                return Err(reverted("CampaignEnded"));
            }
            state.campaign.ended = true;
            let raised = fhevm.value(&state.total_raised).unwrap_or(0);
            let owner = state.campaign.owner;
            state.credit(fhevm, owner, raised, false);
            Ok(())
        })
    }
}

impl ContractProvider for FakeChain {
    fn fundraiser_reader(&self, address: Address) -> Arc<dyn FundraiserRead> {
        Arc::new(FakeFundraiser {
            chain: self.clone(),
            address,
        })
    }

    fn token_reader(&self, address: Address) -> Arc<dyn TokenRead> {
        Arc::new(FakeToken {
            chain: self.clone(),
            address,
        })
    }

    fn fundraiser_writer(&self, address: Address) -> Option<Arc<dyn FundraiserWrite>> {
        self.sender.map(|_| {
            Arc::new(FakeFundraiser {
                chain: self.clone(),
                address,
            }) as Arc<dyn FundraiserWrite>
        })
    }

    fn token_writer(&self, address: Address) -> Option<Arc<dyn TokenWrite>> {
        self.sender.map(|_| {
            Arc::new(FakeToken {
                chain: self.clone(),
                address,
            }) as Arc<dyn TokenWrite>
        })
    }
}
