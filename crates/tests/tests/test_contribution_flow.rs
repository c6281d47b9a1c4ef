// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy::primitives::B256;
use anyhow::Result;
use cloak_client::{
    controls, ClientError, ContributeForm, EncryptionStatus, MintForm, OperationKind,
    OperationOutcome, OperationState, ReadState, Refresh,
};
use cloak_test_helpers::{rand_wallet, FundraiserFixture};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn contribute_form(amount: &str) -> ContributeForm {
    ContributeForm {
        amount: amount.to_string(),
        note: "for the cause".to_string(),
    }
}

#[tokio::test]
async fn test_zero_handle_decrypts_without_a_request() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    let client = fixture.client(Some(&alice));

    client.refresh_all().await;
    assert_eq!(
        client.campaign().contribution().state().await,
        ReadState::Ready(B256::ZERO)
    );

    let outcome = client.decrypt_contribution().await;
    assert_eq!(outcome, OperationOutcome::Decrypted(0));
    assert_eq!(client.decrypted().await.contribution, Some(0));
    assert_eq!(fixture.coprocessor.decrypt_requests(), 0);

    Ok(())
}

#[tokio::test]
async fn test_contribution_round_trips_to_plaintext() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 5000).await?;

    let client = fixture.client(Some(&alice));
    client.refresh_all().await;
    assert_eq!(client.prepare_encryption().await, EncryptionStatus::Ready);

    // 0.0012 at 6 decimals is 1200 base units
    let mut form = contribute_form("0.0012");
    let outcome = client.contribute(&mut form).await;
    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(
        outcome.message().as_deref(),
        Some("Contribution submitted successfully.")
    );
    assert_eq!(form, ContributeForm::default());
    assert_eq!(fixture.chain.sent(), vec!["mint", "confidentialTransferAndCall"]);

    let contribution = client.campaign().contribution().view().await;
    assert!(!contribution.stale);
    assert_ne!(contribution.ready(), Some(&B256::ZERO));

    assert_eq!(
        client.decrypt_contribution().await,
        OperationOutcome::Decrypted(1200)
    );

    let owner = fixture.client(Some(&fixture.owner));
    owner.refresh_all().await;
    assert_eq!(owner.decrypt_total().await, OperationOutcome::Decrypted(1200));
    assert_eq!(owner.decrypted().await.total_raised, Some(1200));

    Ok(())
}

#[tokio::test]
async fn test_total_is_owner_only() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 5000).await?;

    let client = fixture.client(Some(&alice));
    client.refresh_all().await;
    client.prepare_encryption().await;
    assert!(client.contribute(&mut contribute_form("0.001")).await.is_success());

    let snapshot = client.snapshot().await;
    let control = controls::decrypt_total(&snapshot);
    assert_eq!(control.label, "Owner Only");
    assert!(!control.enabled);

    let outcome = client.decrypt_total().await;
    assert!(
        matches!(outcome.error(), Some(ClientError::Decryption(_))),
        "{:?}",
        outcome
    );
    assert_eq!(fixture.coprocessor.decrypt_requests(), 1);
    assert_eq!(client.decrypted().await.total_raised, None);

    Ok(())
}

#[tokio::test]
async fn test_contribution_after_end_leaves_the_zero_handle() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 5000).await?;

    let owner = fixture.client(Some(&fixture.owner));
    owner.refresh_all().await;
    let ended = owner.end_campaign().await;
    assert_eq!(
        ended.message().as_deref(),
        Some("Campaign ended and funds withdrawn.")
    );
    let campaign = owner.campaign().metadata().value().await.expect("campaign read");
    assert!(campaign.is_ended);
    assert!(!campaign.is_active);

    let client = fixture.client(Some(&alice));
    client.refresh_all().await;
    client.prepare_encryption().await;
    assert_eq!(
        controls::contribute(&client.snapshot().await).label,
        "Campaign Closed"
    );

    // the transfer itself is accepted, the fundraiser just does not record it
    let outcome = client.contribute(&mut contribute_form("0.001")).await;
    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(
        client.campaign().contribution().state().await,
        ReadState::Ready(B256::ZERO)
    );

    client.refresh(&[Refresh::Balance]).await;
    assert_eq!(client.decrypt_balance().await, OperationOutcome::Decrypted(5000));

    Ok(())
}

#[tokio::test]
async fn test_contribution_after_end_keeps_the_earlier_contribution() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 5000).await?;

    let client = fixture.client(Some(&alice));
    client.refresh_all().await;
    client.prepare_encryption().await;
    assert!(client.contribute(&mut contribute_form("0.001")).await.is_success());
    let before = client
        .campaign()
        .contribution()
        .value()
        .await
        .expect("contribution read");
    assert_ne!(before, B256::ZERO);

    let owner = fixture.client(Some(&fixture.owner));
    assert!(owner.end_campaign().await.is_success());

    let outcome = client.contribute(&mut contribute_form("0.002")).await;
    assert!(outcome.is_success(), "{:?}", outcome);
    assert_eq!(
        client.campaign().contribution().state().await,
        ReadState::Ready(before)
    );
    assert_eq!(
        client.decrypt_contribution().await,
        OperationOutcome::Decrypted(1000)
    );

    // only the refused second transfer came back
    client.refresh(&[Refresh::Balance]).await;
    assert_eq!(client.decrypt_balance().await, OperationOutcome::Decrypted(4000));

    Ok(())
}

#[tokio::test]
async fn test_concurrent_decrypts_do_not_interfere() -> Result<()> {
    init_tracing();
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    fixture.fund(alice.account(), 5000).await?;

    let client = fixture.client(Some(&alice));
    client.refresh_all().await;
    client.prepare_encryption().await;
    assert!(client.contribute(&mut contribute_form("0.0012")).await.is_success());
    client.refresh(&[Refresh::Balance]).await;

    let (contribution, balance) =
        tokio::join!(client.decrypt_contribution(), client.decrypt_balance());
    assert_eq!(contribution, OperationOutcome::Decrypted(1200));
    assert_eq!(balance, OperationOutcome::Decrypted(3800));
    assert_eq!(fixture.coprocessor.decrypt_requests(), 2);

    let decrypted = client.decrypted().await;
    assert_eq!(decrypted.contribution, Some(1200));
    assert_eq!(decrypted.balance, Some(3800));

    Ok(())
}

#[tokio::test]
async fn test_contribute_needs_a_wallet_and_an_amount() -> Result<()> {
    let fixture = FundraiserFixture::new();

    let disconnected = fixture.client(None);
    let outcome = disconnected.contribute(&mut contribute_form("1")).await;
    assert_eq!(
        outcome.error(),
        Some(&ClientError::signer("Connect your wallet to contribute."))
    );

    let alice = rand_wallet();
    let client = fixture.client(Some(&alice));
    let mut form = contribute_form("");
    assert_eq!(
        client.contribute(&mut form).await.error(),
        Some(&ClientError::validation("Enter an amount to contribute."))
    );
    let mut form = contribute_form("0");
    assert_eq!(
        client.contribute(&mut form).await.error(),
        Some(&ClientError::validation("Amount must be greater than zero."))
    );
    assert_eq!(form.amount, "0");

    assert!(fixture.chain.sent().is_empty());
    assert_eq!(fixture.coprocessor.key_requests(), 0);

    Ok(())
}

#[tokio::test]
async fn test_second_run_of_an_operation_is_refused() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let alice = rand_wallet();
    let client = fixture.client(Some(&alice));

    fixture.chain.hold_confirmations();
    let mut first = MintForm {
        amount: "1".to_string(),
        recipient: String::new(),
    };
    let mut second = first.clone();

    let (first, second) = tokio::join!(client.mint(&mut first), async {
        while !matches!(
            client.slot(OperationKind::Mint).state(),
            OperationState::AwaitingConfirmation { .. }
        ) {
            tokio::task::yield_now().await;
        }
        let refused = client.mint(&mut second).await;
        fixture.chain.release_confirmations();
        refused
    });

    assert_eq!(second, OperationOutcome::Refused);
    assert_eq!(first.message().as_deref(), Some("Mint completed."));
    assert_eq!(fixture.chain.sent(), vec!["mint"]);

    client.refresh(&[Refresh::Balance]).await;
    assert_eq!(
        client.decrypt_balance().await,
        OperationOutcome::Decrypted(1_000_000)
    );

    Ok(())
}

#[tokio::test]
async fn test_encryption_status_follows_the_coprocessor() -> Result<()> {
    let fixture = FundraiserFixture::new();
    let client = fixture.client(None);
    assert_eq!(
        client.encryption_status().await,
        EncryptionStatus::Initializing
    );

    fixture.coprocessor.set_unavailable(Some("relayer down"));
    assert!(matches!(
        client.prepare_encryption().await,
        EncryptionStatus::Error(_)
    ));

    fixture.coprocessor.set_unavailable(None);
    assert_eq!(client.prepare_encryption().await, EncryptionStatus::Ready);
    assert_eq!(
        controls::encryption_line(&client.snapshot().await),
        "Encryption service is ready."
    );

    Ok(())
}
