// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::ClientError;
use alloy::primitives::TxHash;
use std::{
    fmt,
    sync::{Mutex, MutexGuard},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Contribute,
    Mint,
    UpdateCampaign,
    EndCampaign,
    DecryptContribution,
    DecryptTotal,
    DecryptBalance,
}

impl OperationKind {
    /// Shown when a failure carries no message of its own
    pub fn fallback_message(&self) -> &'static str {
        match self {
            OperationKind::Contribute => "Contribution failed.",
            OperationKind::Mint => "Mint failed.",
            OperationKind::UpdateCampaign => "Campaign update failed.",
            OperationKind::EndCampaign => "End campaign failed.",
            OperationKind::DecryptContribution
            | OperationKind::DecryptTotal
            | OperationKind::DecryptBalance => "Decryption failed.",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Contribute => "contribute",
            OperationKind::Mint => "mint",
            OperationKind::UpdateCampaign => "update_campaign",
            OperationKind::EndCampaign => "end_campaign",
            OperationKind::DecryptContribution => "decrypt_contribution",
            OperationKind::DecryptTotal => "decrypt_total",
            OperationKind::DecryptBalance => "decrypt_balance",
        };
        f.write_str(name)
    }
}

/// What came of one invocation of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    /// The same operation was already in flight; nothing was done
    Refused,
    /// A transaction confirmed and the affected reads were refreshed
    Confirmed { tx: TxHash, message: String },
    Decrypted(u64),
    Failed { kind: OperationKind, error: ClientError },
}

impl OperationOutcome {
    pub fn failed(kind: OperationKind, error: impl Into<ClientError>) -> Self {
        Self::Failed {
            kind,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            OperationOutcome::Confirmed { .. } | OperationOutcome::Decrypted(_)
        )
    }

    pub fn error(&self) -> Option<&ClientError> {
        match self {
            OperationOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn tx(&self) -> Option<TxHash> {
        match self {
            OperationOutcome::Confirmed { tx, .. } => Some(*tx),
            _ => None,
        }
    }

    /// The status line for this outcome, if it has one
    pub fn message(&self) -> Option<String> {
        match self {
            OperationOutcome::Refused | OperationOutcome::Decrypted(_) => None,
            OperationOutcome::Confirmed { message, .. } => Some(message.clone()),
            OperationOutcome::Failed { kind, error } => {
                let message = error.to_string();
                if message.trim().is_empty() {
                    Some(kind.fallback_message().to_string())
                } else {
                    Some(message)
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationState {
    Idle { last: Option<OperationOutcome> },
    Validating,
    Submitting,
    AwaitingConfirmation { tx: TxHash },
    Refreshing,
    Decrypting,
}

impl Default for OperationState {
    fn default() -> Self {
        OperationState::Idle { last: None }
    }
}

impl OperationState {
    pub fn is_idle(&self) -> bool {
        matches!(self, OperationState::Idle { .. })
    }
}

/// Holds the state of one operation and refuses a second concurrent run of it
#[derive(Debug)]
pub struct OperationSlot {
    kind: OperationKind,
    state: Mutex<OperationState>,
}

impl OperationSlot {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            state: Mutex::new(OperationState::default()),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn state(&self) -> OperationState {
        self.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        !self.lock().is_idle()
    }

    /// The outcome the last run finished with
    pub fn last(&self) -> Option<OperationOutcome> {
        match &*self.lock() {
            OperationState::Idle { last } => last.clone(),
            _ => None,
        }
    }

    /// Leave `Idle` for `first`. Returns `None` when the operation is already running.
    pub fn begin(&self, first: OperationState) -> Option<SlotGuard<'_>> {
        let mut state = self.lock();
        if !state.is_idle() {
            debug!(operation = %self.kind, "refused, already running");
            return None;
        }
        *state = first;
        Some(SlotGuard {
            slot: self,
            finished: false,
        })
    }

    fn lock(&self) -> MutexGuard<'_, OperationState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A running operation. Dropping it without `finish` returns the slot to `Idle`.
pub struct SlotGuard<'a> {
    slot: &'a OperationSlot,
    finished: bool,
}

impl SlotGuard<'_> {
    pub fn set(&self, state: OperationState) {
        debug!(operation = %self.slot.kind, state = ?state, "operation state");
        *self.slot.lock() = state;
    }

    pub fn finish(mut self, outcome: OperationOutcome) -> OperationOutcome {
        self.finished = true;
        *self.slot.lock() = OperationState::Idle {
            last: Some(outcome.clone()),
        };
        outcome
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            *self.slot.lock() = OperationState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_refuses_reentry() {
        let slot = OperationSlot::new(OperationKind::Mint);
        let guard = slot.begin(OperationState::Validating).expect("idle slot");
        assert!(slot.is_busy());
        assert!(slot.begin(OperationState::Validating).is_none());

        guard.set(OperationState::Submitting);
        assert_eq!(slot.state(), OperationState::Submitting);

        let outcome = guard.finish(OperationOutcome::failed(
            OperationKind::Mint,
            ClientError::validation("Enter an amount to mint."),
        ));
        assert!(!slot.is_busy());
        assert_eq!(slot.last(), Some(outcome));
        assert!(slot.begin(OperationState::Validating).is_some());
    }

    #[test]
    fn test_dropped_guard_returns_to_idle() {
        let slot = OperationSlot::new(OperationKind::EndCampaign);
        {
            let _guard = slot.begin(OperationState::Submitting).expect("idle slot");
        }
        assert_eq!(slot.state(), OperationState::Idle { last: None });
    }

    #[test]
    fn test_messages() {
        let blank = OperationOutcome::failed(
            OperationKind::Contribute,
            ClientError::validation(""),
        );
        assert_eq!(blank.message().as_deref(), Some("Contribution failed."));
        assert_eq!(OperationOutcome::Decrypted(5).message(), None);
        assert!(OperationOutcome::Decrypted(5).is_success());
        assert!(!OperationOutcome::Refused.is_success());
    }
}
