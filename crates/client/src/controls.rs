// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Labels and enablement for the fundraiser controls, derived from a [`ClientSnapshot`]

use crate::{
    format::{self, is_owner, token_mismatch},
    ClientSnapshot, EncryptionStatus, OperationState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: &'static str,
    pub enabled: bool,
}

impl Control {
    fn new(label: &'static str, enabled: bool) -> Self {
        Self { label, enabled }
    }
}

fn busy(state: &OperationState) -> bool {
    !state.is_idle()
}

fn encryption_loading(snapshot: &ClientSnapshot) -> bool {
    snapshot.encryption == EncryptionStatus::Initializing
}

fn campaign_active(snapshot: &ClientSnapshot) -> bool {
    snapshot
        .campaign
        .ready()
        .map(|c| c.is_active)
        .unwrap_or(false)
}

pub fn owner_match(snapshot: &ClientSnapshot) -> bool {
    is_owner(snapshot.account, snapshot.campaign.ready().map(|c| c.owner))
}

pub fn contribute(snapshot: &ClientSnapshot) -> Control {
    let active = campaign_active(snapshot);
    let label = if busy(&snapshot.contribute) {
        "Submitting..."
    } else if active {
        "Submit Contribution"
    } else {
        "Campaign Closed"
    };
    let enabled = snapshot.account.is_some()
        && !busy(&snapshot.contribute)
        && snapshot.fundraiser.is_some()
        && snapshot.token.is_some()
        && active
        && !encryption_loading(snapshot);
    Control::new(label, enabled)
}

pub fn mint(snapshot: &ClientSnapshot) -> Control {
    let label = if busy(&snapshot.mint) {
        "Minting..."
    } else {
        "Mint wETH"
    };
    let enabled = snapshot.account.is_some() && !busy(&snapshot.mint) && snapshot.token.is_some();
    Control::new(label, enabled)
}

pub fn update_campaign(snapshot: &ClientSnapshot) -> Control {
    let owner = owner_match(snapshot);
    let label = if busy(&snapshot.update_campaign) {
        "Updating..."
    } else if owner {
        "Update Campaign"
    } else {
        "Owner Only"
    };
    Control::new(label, owner && !busy(&snapshot.update_campaign))
}

pub fn end_campaign(snapshot: &ClientSnapshot) -> Control {
    let label = if busy(&snapshot.end_campaign) {
        "Ending..."
    } else {
        "End & Withdraw"
    };
    Control::new(
        label,
        owner_match(snapshot) && !busy(&snapshot.end_campaign),
    )
}

pub fn decrypt_total(snapshot: &ClientSnapshot) -> Control {
    let owner = owner_match(snapshot);
    let label = if busy(&snapshot.decrypt_total) {
        "Decrypting..."
    } else if owner {
        "Decrypt Total"
    } else {
        "Owner Only"
    };
    let enabled = owner
        && !busy(&snapshot.decrypt_total)
        && snapshot.total_raised.ready().is_some()
        && !encryption_loading(snapshot);
    Control::new(label, enabled)
}

pub fn decrypt_contribution(snapshot: &ClientSnapshot) -> Control {
    let label = if busy(&snapshot.decrypt_contribution) {
        "Decrypting..."
    } else {
        "Decrypt Contribution"
    };
    let enabled = snapshot.contribution.ready().is_some()
        && !busy(&snapshot.decrypt_contribution)
        && !encryption_loading(snapshot);
    Control::new(label, enabled)
}

pub fn decrypt_balance(snapshot: &ClientSnapshot) -> Control {
    let label = if busy(&snapshot.decrypt_balance) {
        "Decrypting..."
    } else {
        "Decrypt Balance"
    };
    let enabled = snapshot.balance.ready().is_some()
        && !busy(&snapshot.decrypt_balance)
        && !encryption_loading(snapshot);
    Control::new(label, enabled)
}

/// Warning shown next to the token input when the fundraiser was deployed for another token
pub fn token_warning(snapshot: &ClientSnapshot) -> Option<&'static str> {
    if snapshot.token_input.trim().is_empty() {
        return None;
    }
    if snapshot.token.is_none() {
        return Some("Enter a valid address.");
    }
    let campaign_token = snapshot.campaign.ready().map(|c| c.token);
    token_mismatch(campaign_token, &snapshot.token_input)
        .then_some("Token does not match fundraiser contract.")
}

pub fn encryption_line(snapshot: &ClientSnapshot) -> String {
    snapshot.encryption.to_string()
}

pub fn status_label(snapshot: &ClientSnapshot) -> String {
    format::read_label(&snapshot.campaign, |c| {
        format::campaign_status(c).to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecryptedValues, ReadState};
    use alloy::primitives::{address, Address, B256};
    use cloak_contracts::CampaignInfo;

    const OWNER: Address = address!("1111111111111111111111111111111111111111");
    const TOKEN: Address = address!("A8a92e63Ab6517b647949F850233dDF18605fCa0");

    fn snapshot(account: Option<Address>) -> ClientSnapshot {
        ClientSnapshot {
            account,
            fundraiser_input: "0x0d267E11343206544Ce9e028061215CAb355559f".to_string(),
            token_input: TOKEN.to_string(),
            fundraiser: Some(address!("0d267E11343206544Ce9e028061215CAb355559f")),
            token: Some(TOKEN),
            campaign: ReadState::Ready(CampaignInfo {
                name: "Cloak Capital Raise".to_string(),
                target_amount: 1_000_000,
                end_time: 1_900_000_000,
                owner: OWNER,
                is_active: true,
                is_ended: false,
                token: TOKEN,
            }),
            total_raised: ReadState::Ready(B256::repeat_byte(7)),
            contribution: ReadState::Ready(B256::ZERO),
            token_info: ReadState::NotRequested,
            balance: ReadState::NotRequested,
            encryption: EncryptionStatus::Ready,
            decrypted: DecryptedValues::default(),
            contribute: OperationState::default(),
            mint: OperationState::default(),
            update_campaign: OperationState::default(),
            end_campaign: OperationState::default(),
            decrypt_contribution: OperationState::default(),
            decrypt_total: OperationState::default(),
            decrypt_balance: OperationState::default(),
        }
    }

    #[test]
    fn test_owner_controls() {
        let owner = snapshot(Some(OWNER));
        assert_eq!(update_campaign(&owner), Control::new("Update Campaign", true));
        assert_eq!(end_campaign(&owner), Control::new("End & Withdraw", true));
        assert_eq!(decrypt_total(&owner), Control::new("Decrypt Total", true));

        let other = snapshot(Some(Address::repeat_byte(0x22)));
        assert_eq!(update_campaign(&other), Control::new("Owner Only", false));
        assert!(!end_campaign(&other).enabled);
        assert_eq!(decrypt_total(&other), Control::new("Owner Only", false));
    }

    #[test]
    fn test_contribute_control() {
        let mut snap = snapshot(Some(OWNER));
        assert_eq!(contribute(&snap), Control::new("Submit Contribution", true));

        snap.encryption = EncryptionStatus::Initializing;
        assert!(!contribute(&snap).enabled);

        snap.encryption = EncryptionStatus::Ready;
        snap.contribute = OperationState::Submitting;
        assert_eq!(contribute(&snap), Control::new("Submitting...", false));

        let mut closed = snapshot(Some(OWNER));
        if let ReadState::Ready(c) = &mut closed.campaign {
            c.is_active = false;
        }
        assert_eq!(contribute(&closed), Control::new("Campaign Closed", false));

        assert!(!contribute(&snapshot(None)).enabled);
    }

    #[test]
    fn test_decrypt_controls_need_a_handle() {
        let snap = snapshot(Some(OWNER));
        assert!(decrypt_contribution(&snap).enabled);
        assert_eq!(decrypt_balance(&snap), Control::new("Decrypt Balance", false));

        let mut busy = snapshot(Some(OWNER));
        busy.decrypt_contribution = OperationState::Decrypting;
        assert_eq!(
            decrypt_contribution(&busy),
            Control::new("Decrypting...", false)
        );
    }

    #[test]
    fn test_mint_and_token_warning() {
        let mut snap = snapshot(Some(OWNER));
        assert_eq!(mint(&snap), Control::new("Mint wETH", true));
        assert_eq!(token_warning(&snap), None);

        snap.token_input = "0x0d267E11343206544Ce9e028061215CAb355559f".to_string();
        assert_eq!(
            token_warning(&snap),
            Some("Token does not match fundraiser contract.")
        );

        snap.token_input = "0x12".to_string();
        snap.token = None;
        assert_eq!(token_warning(&snap), Some("Enter a valid address."));
        assert!(!mint(&snap).enabled);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&snapshot(None)), "Active");
        assert_eq!(encryption_line(&snapshot(None)), "Encryption service is ready.");
    }
}
