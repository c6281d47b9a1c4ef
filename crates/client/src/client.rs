// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{
    validation::{encode_note, parse_address, parse_end_time, parse_units, UnitsError},
    CampaignStore, ClientError, ContractProvider, OperationKind, OperationOutcome, OperationSlot,
    OperationState, ReadState, Refresh, SlotGuard, TokenInfo, TokenStore, Wallet,
};
use alloy::primitives::{Address, TxHash, B256};
use cloak_contracts::{CampaignInfo, FundraiserRead, PendingTx, TokenRead};
use cloak_fhevm::{Encryptor, UserDecryptor};
use std::{fmt, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributeForm {
    pub amount: String,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MintForm {
    pub amount: String,
    /// Empty mints to the connected account
    pub recipient: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignForm {
    pub name: String,
    pub target: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncryptionStatus {
    Initializing,
    Ready,
    Error(String),
}

impl fmt::Display for EncryptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionStatus::Initializing => write!(f, "Initializing encryption service..."),
            EncryptionStatus::Ready => write!(f, "Encryption service is ready."),
            EncryptionStatus::Error(e) => write!(f, "Encryption error: {}", e),
        }
    }
}

/// Plaintexts recovered by the decrypt operations, kept until the inputs change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecryptedValues {
    pub contribution: Option<u64>,
    pub total_raised: Option<u64>,
    pub balance: Option<u64>,
}

/// Everything the presentation layer needs, read at one point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub account: Option<Address>,
    pub fundraiser_input: String,
    pub token_input: String,
    pub fundraiser: Option<Address>,
    pub token: Option<Address>,
    pub campaign: ReadState<CampaignInfo>,
    pub total_raised: ReadState<B256>,
    pub contribution: ReadState<B256>,
    pub token_info: ReadState<TokenInfo>,
    pub balance: ReadState<B256>,
    pub encryption: EncryptionStatus,
    pub decrypted: DecryptedValues,
    pub contribute: OperationState,
    pub mint: OperationState,
    pub update_campaign: OperationState,
    pub end_campaign: OperationState,
    pub decrypt_contribution: OperationState,
    pub decrypt_total: OperationState,
    pub decrypt_balance: OperationState,
}

/// Orchestrates reads, writes and decryptions against one fundraiser and its token.
///
/// Operations take `&self` so different operations may run at the same time; each one refuses
/// to start while a previous run of itself is still in flight.
pub struct FundraiserClient {
    contracts: Arc<dyn ContractProvider>,
    encryptor: Arc<dyn Encryptor>,
    decryptor: UserDecryptor,
    wallet: Option<Wallet>,
    fundraiser_input: String,
    token_input: String,
    campaign: CampaignStore,
    token: TokenStore,
    encryption: RwLock<EncryptionStatus>,
    decrypted: RwLock<DecryptedValues>,
    contribute_slot: OperationSlot,
    mint_slot: OperationSlot,
    update_slot: OperationSlot,
    end_slot: OperationSlot,
    decrypt_contribution_slot: OperationSlot,
    decrypt_total_slot: OperationSlot,
    decrypt_balance_slot: OperationSlot,
}

impl FundraiserClient {
    pub fn new(
        contracts: Arc<dyn ContractProvider>,
        encryptor: Arc<dyn Encryptor>,
        decryptor: UserDecryptor,
    ) -> Self {
        Self {
            contracts,
            encryptor,
            decryptor,
            wallet: None,
            fundraiser_input: String::new(),
            token_input: String::new(),
            campaign: CampaignStore::new(),
            token: TokenStore::new(),
            encryption: RwLock::new(EncryptionStatus::Initializing),
            decrypted: RwLock::new(DecryptedValues::default()),
            contribute_slot: OperationSlot::new(OperationKind::Contribute),
            mint_slot: OperationSlot::new(OperationKind::Mint),
            update_slot: OperationSlot::new(OperationKind::UpdateCampaign),
            end_slot: OperationSlot::new(OperationKind::EndCampaign),
            decrypt_contribution_slot: OperationSlot::new(OperationKind::DecryptContribution),
            decrypt_total_slot: OperationSlot::new(OperationKind::DecryptTotal),
            decrypt_balance_slot: OperationSlot::new(OperationKind::DecryptBalance),
        }
    }

    pub fn with_wallet(mut self, wallet: Wallet) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_addresses(mut self, fundraiser: impl Into<String>, token: impl Into<String>) -> Self {
        self.fundraiser_input = fundraiser.into();
        self.token_input = token.into();
        self
    }

    /// Connect a wallet. Account scoped reads are dropped until the next refresh.
    pub async fn connect(&mut self, wallet: Wallet) {
        info!(account = %wallet.account(), "wallet connected");
        self.wallet = Some(wallet);
        self.forget_account_state().await;
    }

    pub async fn disconnect(&mut self) {
        self.wallet = None;
        self.forget_account_state().await;
    }

    pub async fn set_fundraiser_address(&mut self, input: impl Into<String>) {
        self.fundraiser_input = input.into();
        self.campaign.reset().await;
        let mut decrypted = self.decrypted.write().await;
        decrypted.contribution = None;
        decrypted.total_raised = None;
    }

    pub async fn set_token_address(&mut self, input: impl Into<String>) {
        self.token_input = input.into();
        self.token.reset().await;
        self.decrypted.write().await.balance = None;
    }

    async fn forget_account_state(&self) {
        self.campaign.contribution().reset().await;
        self.token.balance().reset().await;
        *self.decrypted.write().await = DecryptedValues::default();
    }

    pub fn wallet(&self) -> Option<&Wallet> {
        self.wallet.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.wallet.as_ref().map(|w| w.account())
    }

    pub fn fundraiser_address(&self) -> Option<Address> {
        parse_address(&self.fundraiser_input)
    }

    pub fn token_address(&self) -> Option<Address> {
        parse_address(&self.token_input)
    }

    pub fn campaign(&self) -> &CampaignStore {
        &self.campaign
    }

    pub fn token(&self) -> &TokenStore {
        &self.token
    }

    pub fn slot(&self, kind: OperationKind) -> &OperationSlot {
        match kind {
            OperationKind::Contribute => &self.contribute_slot,
            OperationKind::Mint => &self.mint_slot,
            OperationKind::UpdateCampaign => &self.update_slot,
            OperationKind::EndCampaign => &self.end_slot,
            OperationKind::DecryptContribution => &self.decrypt_contribution_slot,
            OperationKind::DecryptTotal => &self.decrypt_total_slot,
            OperationKind::DecryptBalance => &self.decrypt_balance_slot,
        }
    }

    pub async fn decrypted(&self) -> DecryptedValues {
        *self.decrypted.read().await
    }

    pub async fn encryption_status(&self) -> EncryptionStatus {
        self.encryption.read().await.clone()
    }

    /// Fetch the encryption key material ahead of the first contribution
    pub async fn prepare_encryption(&self) -> EncryptionStatus {
        *self.encryption.write().await = EncryptionStatus::Initializing;
        let status = match self.encryptor.prepare().await {
            Ok(()) => EncryptionStatus::Ready,
            Err(e) => {
                warn!(error = %e, "encryption service unavailable");
                EncryptionStatus::Error(e.to_string())
            }
        };
        *self.encryption.write().await = status.clone();
        status
    }

    fn fundraiser_reader(&self) -> Option<Arc<dyn FundraiserRead>> {
        self.fundraiser_address()
            .map(|a| self.contracts.fundraiser_reader(a))
    }

    fn token_reader(&self) -> Option<Arc<dyn TokenRead>> {
        self.token_address().map(|a| self.contracts.token_reader(a))
    }

    /// Read every value whose prerequisites are present
    pub async fn refresh_all(&self) {
        self.refresh(&[
            Refresh::CampaignMetadata,
            Refresh::TotalRaised,
            Refresh::Contribution,
            Refresh::TokenMetadata,
            Refresh::Balance,
        ])
        .await;
    }

    /// Mark `values` stale and read them again
    pub async fn refresh(&self, values: &[Refresh]) {
        let fundraiser = self.fundraiser_reader();
        let token = self.token_reader();
        let account = self.account();

        for value in values {
            self.campaign.invalidate(*value).await;
            self.token.invalidate(*value).await;
        }

        for value in values {
            match value {
                Refresh::CampaignMetadata => {
                    self.campaign.refetch_metadata(fundraiser.as_deref()).await;
                }
                Refresh::TotalRaised => {
                    self.campaign
                        .refetch_total_raised(fundraiser.as_deref())
                        .await;
                }
                Refresh::Contribution => {
                    self.campaign
                        .refetch_contribution(fundraiser.as_deref(), account)
                        .await;
                }
                Refresh::TokenMetadata => {
                    self.token.refetch_info(token.as_deref()).await;
                }
                Refresh::Balance => {
                    self.token.refetch_balance(token.as_deref(), account).await;
                }
            }
        }
    }

    pub async fn snapshot(&self) -> ClientSnapshot {
        ClientSnapshot {
            account: self.account(),
            fundraiser_input: self.fundraiser_input.clone(),
            token_input: self.token_input.clone(),
            fundraiser: self.fundraiser_address(),
            token: self.token_address(),
            campaign: self.campaign.metadata().state().await,
            total_raised: self.campaign.total_raised().state().await,
            contribution: self.campaign.contribution().state().await,
            token_info: self.token.info().state().await,
            balance: self.token.balance().state().await,
            encryption: self.encryption_status().await,
            decrypted: self.decrypted().await,
            contribute: self.contribute_slot.state(),
            mint: self.mint_slot.state(),
            update_campaign: self.update_slot.state(),
            end_campaign: self.end_slot.state(),
            decrypt_contribution: self.decrypt_contribution_slot.state(),
            decrypt_total: self.decrypt_total_slot.state(),
            decrypt_balance: self.decrypt_balance_slot.state(),
        }
    }

    /// Encrypt the amount for the token and transfer it to the fundraiser
    #[instrument(skip_all)]
    pub async fn contribute(&self, form: &mut ContributeForm) -> OperationOutcome {
        let kind = OperationKind::Contribute;
        let Some(guard) = self.contribute_slot.begin(OperationState::Validating) else {
            return OperationOutcome::Refused;
        };
        let outcome = match self.run_contribute(&guard, form).await {
            Ok(tx) => {
                *form = ContributeForm::default();
                OperationOutcome::Confirmed {
                    tx,
                    message: "Contribution submitted successfully.".to_string(),
                }
            }
            Err(e) => OperationOutcome::failed(kind, e),
        };
        guard.finish(outcome)
    }

    async fn run_contribute(
        &self,
        guard: &SlotGuard<'_>,
        form: &ContributeForm,
    ) -> Result<TxHash, ClientError> {
        let (Some(fundraiser), Some(token)) = (self.fundraiser_address(), self.token_address())
        else {
            return Err(ClientError::validation(
                "Please enter valid contract addresses.",
            ));
        };
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| ClientError::signer("Connect your wallet to contribute."))?;
        if form.amount.trim().is_empty() {
            return Err(ClientError::validation("Enter an amount to contribute."));
        }
        let amount = parse_amount(&form.amount, self.token.decimals().await)?;
        let writer = self
            .contracts
            .token_writer(token)
            .ok_or_else(|| ClientError::signer("Signer not available."))?;

        guard.set(OperationState::Submitting);
        let input = self
            .encryptor
            .encrypt_u64(amount, token, wallet.account())
            .await?;
        let pending = writer
            .confidential_transfer_and_call(fundraiser, input.handle, input.proof, encode_note(&form.note))
            .await?;

        let tx = self.await_confirmation(guard, pending).await?;
        self.refresh(&[Refresh::Contribution, Refresh::TotalRaised]).await;
        info!(tx = %tx, "contribution confirmed");
        Ok(tx)
    }

    /// Mint plaintext tokens to the recipient, or to the connected account
    #[instrument(skip_all)]
    pub async fn mint(&self, form: &mut MintForm) -> OperationOutcome {
        let Some(guard) = self.mint_slot.begin(OperationState::Validating) else {
            return OperationOutcome::Refused;
        };
        let outcome = match self.run_mint(&guard, form).await {
            Ok(tx) => {
                *form = MintForm::default();
                OperationOutcome::Confirmed {
                    tx,
                    message: "Mint completed.".to_string(),
                }
            }
            Err(e) => OperationOutcome::failed(OperationKind::Mint, e),
        };
        guard.finish(outcome)
    }

    async fn run_mint(&self, guard: &SlotGuard<'_>, form: &MintForm) -> Result<TxHash, ClientError> {
        let token = self
            .token_address()
            .ok_or_else(|| ClientError::validation("Please enter a valid token address."))?;
        let wallet = self
            .wallet
            .as_ref()
            .ok_or_else(|| ClientError::signer("Connect your wallet to mint."))?;
        if form.amount.trim().is_empty() {
            return Err(ClientError::validation("Enter an amount to mint."));
        }
        let amount = parse_amount(&form.amount, self.token.decimals().await)?;
        let recipient = if form.recipient.trim().is_empty() {
            wallet.account()
        } else {
            parse_address(&form.recipient)
                .ok_or_else(|| ClientError::validation("Please enter a valid recipient address."))?
        };
        let writer = self
            .contracts
            .token_writer(token)
            .ok_or_else(|| ClientError::signer("Signer not available."))?;

        guard.set(OperationState::Submitting);
        let pending = writer.mint(recipient, amount).await?;

        let tx = self.await_confirmation(guard, pending).await?;
        self.refresh(&[Refresh::Balance]).await;
        info!(tx = %tx, to = %recipient, "mint confirmed");
        Ok(tx)
    }

    /// Owner only. The end time is not checked against the clock here.
    #[instrument(skip_all)]
    pub async fn update_campaign(&self, form: &mut CampaignForm) -> OperationOutcome {
        let Some(guard) = self.update_slot.begin(OperationState::Validating) else {
            return OperationOutcome::Refused;
        };
        let outcome = match self.run_update_campaign(&guard, form).await {
            Ok(tx) => {
                *form = CampaignForm::default();
                OperationOutcome::Confirmed {
                    tx,
                    message: "Campaign updated.".to_string(),
                }
            }
            Err(e) => OperationOutcome::failed(OperationKind::UpdateCampaign, e),
        };
        guard.finish(outcome)
    }

    async fn run_update_campaign(
        &self,
        guard: &SlotGuard<'_>,
        form: &CampaignForm,
    ) -> Result<TxHash, ClientError> {
        let fundraiser = self
            .fundraiser_address()
            .ok_or_else(|| ClientError::validation("Please enter a valid fundraiser address."))?;
        if self.wallet.is_none() {
            return Err(ClientError::signer(
                "Connect your wallet to update the campaign.",
            ));
        }
        let name = form.name.trim();
        if name.is_empty() || form.target.trim().is_empty() || form.end_time.trim().is_empty() {
            return Err(ClientError::validation(
                "Fill in name, target, and end time.",
            ));
        }
        let end_time = parse_end_time(&form.end_time)
            .ok_or_else(|| ClientError::validation("Provide a valid end time."))?;
        let target = match parse_units(&form.target, self.token.decimals().await) {
            Ok(0) | Err(UnitsError::Negative) => {
                return Err(ClientError::validation("Target must be greater than zero."))
            }
            Ok(target) => target,
            Err(e) => return Err(ClientError::Validation(format!("Invalid target: {}", e))),
        };
        let writer = self
            .contracts
            .fundraiser_writer(fundraiser)
            .ok_or_else(|| ClientError::signer("Signer not available."))?;

        guard.set(OperationState::Submitting);
        let pending = writer
            .update_campaign(name.to_string(), target, end_time)
            .await?;

        let tx = self.await_confirmation(guard, pending).await?;
        self.refresh(&[Refresh::CampaignMetadata]).await;
        info!(tx = %tx, "campaign updated");
        Ok(tx)
    }

    /// Owner only. Ends the campaign and withdraws the raised funds.
    #[instrument(skip_all)]
    pub async fn end_campaign(&self) -> OperationOutcome {
        let Some(guard) = self.end_slot.begin(OperationState::Validating) else {
            return OperationOutcome::Refused;
        };
        let outcome = match self.run_end_campaign(&guard).await {
            Ok(tx) => OperationOutcome::Confirmed {
                tx,
                message: "Campaign ended and funds withdrawn.".to_string(),
            },
            Err(e) => OperationOutcome::failed(OperationKind::EndCampaign, e),
        };
        guard.finish(outcome)
    }

    async fn run_end_campaign(&self, guard: &SlotGuard<'_>) -> Result<TxHash, ClientError> {
        let fundraiser = self
            .fundraiser_address()
            .ok_or_else(|| ClientError::validation("Please enter a valid fundraiser address."))?;
        if self.wallet.is_none() {
            return Err(ClientError::signer("Connect your wallet to end the campaign."));
        }
        let writer = self
            .contracts
            .fundraiser_writer(fundraiser)
            .ok_or_else(|| ClientError::signer("Signer not available."))?;

        guard.set(OperationState::Submitting);
        let pending = writer.end_fundraising().await?;

        let tx = self.await_confirmation(guard, pending).await?;
        self.refresh(&[Refresh::TotalRaised, Refresh::CampaignMetadata])
            .await;
        info!(tx = %tx, "campaign ended");
        Ok(tx)
    }

    async fn await_confirmation(
        &self,
        guard: &SlotGuard<'_>,
        pending: PendingTx,
    ) -> Result<TxHash, ClientError> {
        guard.set(OperationState::AwaitingConfirmation { tx: pending.hash() });
        let confirmed = pending.confirmed().await?;
        guard.set(OperationState::Refreshing);
        Ok(confirmed.hash)
    }

    /// Decrypt the connected account's contribution
    pub async fn decrypt_contribution(&self) -> OperationOutcome {
        let handle = self.campaign.contribution().value().await;
        let outcome = self
            .decrypt(
                OperationKind::DecryptContribution,
                handle,
                self.fundraiser_address(),
                "No contribution handle available.",
            )
            .await;
        if let OperationOutcome::Decrypted(value) = outcome {
            self.decrypted.write().await.contribution = Some(value);
        }
        outcome
    }

    /// Decrypt the campaign total. The coprocessor only allows the owner.
    pub async fn decrypt_total(&self) -> OperationOutcome {
        let handle = self.campaign.total_raised().value().await;
        let outcome = self
            .decrypt(
                OperationKind::DecryptTotal,
                handle,
                self.fundraiser_address(),
                "No total handle available.",
            )
            .await;
        if let OperationOutcome::Decrypted(value) = outcome {
            self.decrypted.write().await.total_raised = Some(value);
        }
        outcome
    }

    /// Decrypt the connected account's token balance
    pub async fn decrypt_balance(&self) -> OperationOutcome {
        let handle = self.token.balance().value().await;
        let outcome = self
            .decrypt(
                OperationKind::DecryptBalance,
                handle,
                self.token_address(),
                "No balance handle available.",
            )
            .await;
        if let OperationOutcome::Decrypted(value) = outcome {
            self.decrypted.write().await.balance = Some(value);
        }
        outcome
    }

    #[instrument(skip(self, handle, missing))]
    async fn decrypt(
        &self,
        kind: OperationKind,
        handle: Option<B256>,
        owning_contract: Option<Address>,
        missing: &str,
    ) -> OperationOutcome {
        let Some(guard) = self.slot(kind).begin(OperationState::Validating) else {
            return OperationOutcome::Refused;
        };
        let (Some(handle), Some(contract)) = (handle, owning_contract) else {
            return guard.finish(OperationOutcome::failed(kind, ClientError::validation(missing)));
        };

        guard.set(OperationState::Decrypting);
        let signer = self.wallet.as_ref().map(|w| w.signer());
        let outcome = match self.decryptor.decrypt(handle, contract, signer).await {
            Ok(value) => OperationOutcome::Decrypted(value),
            Err(e) => OperationOutcome::failed(kind, e),
        };
        guard.finish(outcome)
    }
}

fn parse_amount(input: &str, decimals: u8) -> Result<u64, ClientError> {
    match parse_units(input, decimals) {
        Ok(0) | Err(UnitsError::Negative) => Err(ClientError::validation(
            "Amount must be greater than zero.",
        )),
        Ok(amount) => Ok(amount),
        Err(e) => Err(ClientError::Validation(format!("Invalid amount: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_messages() {
        assert_eq!(parse_amount("1.5", 6), Ok(1_500_000));
        assert_eq!(
            parse_amount("0", 6),
            Err(ClientError::validation("Amount must be greater than zero."))
        );
        assert_eq!(
            parse_amount("-3", 6),
            Err(ClientError::validation("Amount must be greater than zero."))
        );
        assert_eq!(
            parse_amount("lots", 6),
            Err(ClientError::validation("Invalid amount: invalid decimal value"))
        );
    }

    #[test]
    fn test_encryption_status_lines() {
        assert_eq!(
            EncryptionStatus::Initializing.to_string(),
            "Initializing encryption service..."
        );
        assert_eq!(
            EncryptionStatus::Error("relayer down".to_string()).to_string(),
            "Encryption error: relayer down"
        );
        assert_eq!(
            EncryptionStatus::Ready.to_string(),
            "Encryption service is ready."
        );
    }
}
