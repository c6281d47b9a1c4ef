// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use cloak_contracts::ChainResult;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::trace;

/// The state of one on-chain read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReadState<T> {
    /// Prerequisites (address, account) are missing so the value is unknown
    #[default]
    NotRequested,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> ReadState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ReadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ReadState::Loading)
    }

    pub fn map<U>(&self, f: impl FnOnce(&T) -> U) -> ReadState<U> {
        match self {
            ReadState::NotRequested => ReadState::NotRequested,
            ReadState::Loading => ReadState::Loading,
            ReadState::Ready(value) => ReadState::Ready(f(value)),
            ReadState::Failed(message) => ReadState::Failed(message.clone()),
        }
    }
}

/// A read state plus whether a write may have changed it since it was read
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct View<T> {
    pub state: ReadState<T>,
    pub stale: bool,
}

impl<T> View<T> {
    pub fn ready(&self) -> Option<&T> {
        self.state.ready()
    }
}

/// A pull-based value. Nothing polls it; it changes only through `refetch` or `reset`.
#[derive(Debug)]
pub struct Query<T> {
    inner: RwLock<Versioned<T>>,
}

/// The view plus the number of refetches and resets started so far
#[derive(Debug)]
struct Versioned<T> {
    view: View<T>,
    generation: u64,
}

impl<T: Clone> Query<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Versioned {
                view: View {
                    state: ReadState::NotRequested,
                    stale: false,
                },
                generation: 0,
            }),
        }
    }

    pub async fn view(&self) -> View<T> {
        self.inner.read().await.view.clone()
    }

    pub async fn state(&self) -> ReadState<T> {
        self.inner.read().await.view.state.clone()
    }

    pub async fn value(&self) -> Option<T> {
        self.inner.read().await.view.ready().cloned()
    }

    /// Mark the value as possibly out of date. The old value stays readable until refetched.
    pub async fn invalidate(&self) {
        self.inner.write().await.view.stale = true;
    }

    /// Forget the value because its prerequisites went away. Reads still in flight are discarded.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.view = View {
            state: ReadState::NotRequested,
            stale: false,
        };
    }

    /// Run `read` and store its outcome, unless a later refetch or reset started
    /// in the meantime. Returns the state the query holds afterwards.
    pub async fn refetch<F>(&self, read: F) -> ReadState<T>
    where
        F: Future<Output = ChainResult<T>>,
    {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.view.state = ReadState::Loading;
            inner.generation
        };

        let state = match read.await {
            Ok(value) => ReadState::Ready(value),
            Err(e) => ReadState::Failed(e.to_string()),
        };

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            trace!(generation, latest = inner.generation, "discarding superseded read");
            return inner.view.state.clone();
        }
        inner.view = View {
            state: state.clone(),
            stale: false,
        };
        state
    }
}

impl<T: Clone> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloak_contracts::ChainError;

    #[tokio::test]
    async fn test_query_lifecycle() {
        let query: Query<u64> = Query::new();
        assert_eq!(query.state().await, ReadState::NotRequested);

        query.refetch(async { Ok(5) }).await;
        assert_eq!(query.value().await, Some(5));

        query.invalidate().await;
        let view = query.view().await;
        assert!(view.stale);
        assert_eq!(view.ready(), Some(&5));

        query.refetch(async { Ok(6) }).await;
        let view = query.view().await;
        assert!(!view.stale);
        assert_eq!(view.ready(), Some(&6));

        query
            .refetch(async { Err(ChainError::Network("connection refused".to_string())) })
            .await;
        assert_eq!(
            query.state().await,
            ReadState::Failed("Network error: connection refused".to_string())
        );

        query.reset().await;
        assert_eq!(query.state().await, ReadState::NotRequested);
    }

    #[tokio::test]
    async fn test_late_read_does_not_overwrite_newer_one() {
        let query: Query<u64> = Query::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = query.refetch(async move {
            let _ = release_rx.await;
            Ok(1)
        });
        let fast = async {
            // let the slow read register first
            tokio::task::yield_now().await;
            let state = query.refetch(async { Ok(2) }).await;
            let _ = release_tx.send(());
            state
        };
        let (slow_state, fast_state) = tokio::join!(slow, fast);

        assert_eq!(fast_state, ReadState::Ready(2));
        assert_eq!(slow_state, ReadState::Ready(2));
        assert_eq!(query.state().await, ReadState::Ready(2));
    }

    #[tokio::test]
    async fn test_reset_discards_read_in_flight() {
        let query: Query<u64> = Query::new();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = query.refetch(async move {
            let _ = release_rx.await;
            Ok(7)
        });
        let reset = async {
            tokio::task::yield_now().await;
            query.reset().await;
            let _ = release_tx.send(());
        };
        let (state, _) = tokio::join!(slow, reset);

        assert_eq!(state, ReadState::NotRequested);
        assert_eq!(query.state().await, ReadState::NotRequested);
    }

    #[test]
    fn test_map_is_exhaustive() {
        let ready: ReadState<u64> = ReadState::Ready(2);
        assert_eq!(ready.map(|v| v * 2), ReadState::Ready(4));
        let failed: ReadState<u64> = ReadState::Failed("x".to_string());
        assert_eq!(failed.map(|v| v * 2), ReadState::Failed("x".to_string()));
        assert!(ReadState::<u64>::Loading.is_loading());
    }
}
