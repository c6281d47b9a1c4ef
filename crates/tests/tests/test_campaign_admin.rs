// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::TxHash;
use anyhow::Result;
use cloak_client::{
    controls, CampaignForm, ClientError, MintForm, OperationKind, OperationOutcome, OperationState,
};
use cloak_contracts::ChainError;
use cloak_test_helpers::{rand_wallet, unix_now, FundraiserFixture};

fn campaign_form(name: &str, target: &str, end_time: &str) -> CampaignForm {
    CampaignForm {
        name: name.to_string(),
        target: target.to_string(),
        end_time: end_time.to_string(),
    }
}

#[tokio::test]
async fn test_zero_target_fails_before_any_call() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let owner = fixture.client(Some(&fixture.owner));
    let end_time = (unix_now() + 3600).to_string();

    let mut form = campaign_form("Round two", "0", &end_time);
    let outcome = owner.update_campaign(&mut form).await;
    assert_eq!(
        outcome.error(),
        Some(&ClientError::validation("Target must be greater than zero."))
    );
    assert!(fixture.chain.sent().is_empty());
    assert_eq!(fixture.chain.reads(), 0);

    let mut form = campaign_form("Round two", "10", "next tuesday");
    assert_eq!(
        owner.update_campaign(&mut form).await.error(),
        Some(&ClientError::validation("Provide a valid end time."))
    );

    let mut form = campaign_form("", "10", &end_time);
    assert_eq!(
        owner.update_campaign(&mut form).await.error(),
        Some(&ClientError::validation("Fill in name, target, and end time."))
    );
    assert!(fixture.chain.sent().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_owner_updates_campaign() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let owner = fixture.client(Some(&fixture.owner));
    owner.refresh_all().await;

    let snapshot = owner.snapshot().await;
    assert_eq!(controls::update_campaign(&snapshot).label, "Update Campaign");
    assert!(controls::end_campaign(&snapshot).enabled);

    let end_time = unix_now() + 30 * 24 * 60 * 60;
    let mut form = campaign_form("Round two", "2.5", &end_time.to_string());
    let outcome = owner.update_campaign(&mut form).await;
    assert_eq!(outcome.message().as_deref(), Some("Campaign updated."));
    assert_eq!(form, CampaignForm::default());

    let campaign = owner
        .campaign()
        .metadata()
        .value()
        .await
        .expect("campaign refreshed");
    assert_eq!(campaign.name, "Round two");
    assert_eq!(campaign.target_amount, 2_500_000);
    assert_eq!(campaign.end_time, end_time);

    Ok(())
}

#[tokio::test]
async fn test_contract_reverts_are_reported_by_name() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let mallory = rand_wallet();
    let client = fixture.client(Some(&mallory));
    client.refresh_all().await;

    let snapshot = client.snapshot().await;
    assert_eq!(controls::update_campaign(&snapshot).label, "Owner Only");
    assert!(!controls::end_campaign(&snapshot).enabled);

    let outcome = client.end_campaign().await;
    assert_eq!(
        outcome.error(),
        Some(&ClientError::Chain(ChainError::Reverted("NotOwner".to_string())))
    );
    assert_eq!(
        outcome.message().as_deref(),
        Some("Transaction reverted: NotOwner")
    );

    // the past end time is only caught by the contract
    let owner = fixture.client(Some(&fixture.owner));
    let mut form = campaign_form("Late", "1", "2001-01-01T00:00");
    assert_eq!(
        owner.update_campaign(&mut form).await.error(),
        Some(&ClientError::Chain(ChainError::Reverted(
            "InvalidEndTime".to_string()
        )))
    );
    assert_eq!(form.name, "Late");

    Ok(())
}

#[tokio::test]
async fn test_unconfirmed_transaction_is_a_timeout() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    let client = fixture.client(Some(&alice));

    let timeout = ChainError::ConfirmationTimeout {
        tx: TxHash::ZERO,
        timeout_secs: 180,
    };
    fixture.chain.fail_next_confirmation(timeout.clone());

    let mut form = MintForm {
        amount: "3".to_string(),
        recipient: String::new(),
    };
    let outcome = client.mint(&mut form).await;
    assert_eq!(outcome.error(), Some(&ClientError::Chain(timeout)));
    assert_eq!(form.amount, "3");

    let state = client.slot(OperationKind::Mint).state();
    assert!(matches!(
        state,
        OperationState::Idle {
            last: Some(OperationOutcome::Failed { .. })
        }
    ));

    // the slot is free again
    assert!(client.mint(&mut form).await.is_success());

    Ok(())
}

#[tokio::test]
async fn test_mint_to_another_recipient() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    let bob = rand_wallet();
    let client = fixture.client(Some(&alice));

    let mut form = MintForm {
        amount: "7".to_string(),
        recipient: bob.account().to_string(),
    };
    assert!(client.mint(&mut form).await.is_success());

    let bobs = fixture.client(Some(&bob));
    bobs.refresh_all().await;
    assert_eq!(
        bobs.decrypt_balance().await,
        OperationOutcome::Decrypted(7_000_000)
    );

    let mut form = MintForm {
        amount: "7".to_string(),
        recipient: "0x1234".to_string(),
    };
    assert_eq!(
        client.mint(&mut form).await.error(),
        Some(&ClientError::validation(
            "Please enter a valid recipient address."
        ))
    );

    Ok(())
}

#[tokio::test]
async fn test_reverted_mint_leaves_balance_unchanged() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 400).await?;
    let client = fixture.client(Some(&alice));

    fixture
        .chain
        .fail_next_confirmation(ChainError::Reverted("Paused".to_string()));
    let mut form = MintForm {
        amount: "1".to_string(),
        recipient: String::new(),
    };
    let outcome = client.mint(&mut form).await;
    assert_eq!(
        outcome.message().as_deref(),
        Some("Transaction reverted: Paused")
    );

    client.refresh_all().await;
    assert_eq!(client.decrypt_balance().await, OperationOutcome::Decrypted(400));

    Ok(())
}
