// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Retry coordinator: turns 401s into at most one in-flight token refresh.
//!
//! The first request to hit a 401 while idle starts a refresh cycle; every
//! 401 that lands while the cycle is running joins the waiter queue. When
//! the refresh settles the store is updated (or cleared) first, then every
//! waiter is released in arrival order with the same outcome.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::auth::is_session_endpoint;
use crate::auth::refresh::RefreshClient;
use crate::auth::store::TokenStore;
use crate::client::request::ApiRequest;
use crate::error::ClientError;

type Outcome = Result<String, ClientError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<Outcome>>,
}

/// Shared refresh state machine for one API client.
pub struct RetryCoordinator {
    store: Arc<dyn TokenStore>,
    refresher: RefreshClient,
    refresh_timeout: Duration,
    state: Mutex<RefreshState>,
}

impl RetryCoordinator {
    pub fn new(
        store: Arc<dyn TokenStore>,
        refresher: RefreshClient,
        refresh_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self { store, refresher, refresh_timeout, state: Mutex::new(RefreshState::default()) })
    }

    pub fn is_refreshing(&self) -> bool {
        self.state.lock().refreshing
    }

    /// Number of requests waiting on the current refresh cycle.
    pub fn pending_waiters(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Decide what a failed request should do next.
    ///
    /// Returns the refreshed access token the request should be replayed
    /// with, or the error to surface. Pass-through cases return `err`
    /// unchanged; a failed refresh returns the refresh's own error.
    pub async fn recover(
        self: &Arc<Self>,
        req: &ApiRequest,
        err: ClientError,
    ) -> Result<String, ClientError> {
        if !err.is_unauthorized() || req.is_retried() || is_session_endpoint(req.path()) {
            return Err(err);
        }

        if self.store.refresh_token().is_none() {
            tracing::info!(path = req.path(), "401 with no refresh token, clearing session");
            self.store.clear();
            return Err(err);
        }

        let (tx, rx) = oneshot::channel();
        let start_cycle = {
            let mut state = self.state.lock();
            state.waiters.push_back(tx);
            !std::mem::replace(&mut state.refreshing, true)
        };

        if start_cycle {
            tracing::debug!(path = req.path(), "access token rejected, starting refresh");
            // Runs detached so cancelling the initiating request cannot
            // strand the other waiters.
            let cycle = CycleGuard { coordinator: Arc::clone(self), armed: true };
            tokio::spawn(cycle.run());
        } else {
            tracing::debug!(path = req.path(), "refresh in flight, queued");
        }

        rx.await.unwrap_or(Err(ClientError::RefreshAbandoned))
    }

    async fn refresh_outcome(&self) -> Outcome {
        let refreshed = match tokio::time::timeout(
            self.refresh_timeout,
            self.refresher.refresh(self.store.as_ref()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ClientError::RefreshTimeout(self.refresh_timeout)),
        };

        match refreshed {
            Ok(token) if self.store.set_refreshed_access_token(&token) => {
                tracing::info!("access token refreshed");
                Ok(token)
            }
            Ok(_) => {
                tracing::info!("session ended during refresh, discarding new access token");
                Err(ClientError::NoRefreshToken)
            }
            Err(e) => {
                tracing::warn!(code = e.as_str(), err = %e, "token refresh failed, clearing session");
                self.store.clear();
                Err(e)
            }
        }
    }

    /// Return to idle and release every waiter. `None` drops the senders,
    /// which waiters observe as [`ClientError::RefreshAbandoned`].
    fn settle(&self, outcome: Option<&Outcome>) {
        let waiters = {
            let mut state = self.state.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        tracing::debug!(waiters = waiters.len(), settled = outcome.is_some(), "refresh cycle done");
        if let Some(outcome) = outcome {
            for tx in waiters {
                let _ = tx.send(outcome.clone());
            }
        }
    }
}

/// One refresh cycle. Armed from the moment the cycle is claimed, so a task
/// dropped before or during the refresh (runtime shutdown) still returns the
/// coordinator to idle.
struct CycleGuard {
    coordinator: Arc<RetryCoordinator>,
    armed: bool,
}

impl CycleGuard {
    async fn run(mut self) {
        let outcome = self.coordinator.refresh_outcome().await;
        self.armed = false;
        self.coordinator.settle(Some(&outcome));
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("refresh cycle dropped before settling");
            self.coordinator.settle(None);
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
