//! Authenticated request wrapper
//!
//! Every CMS call goes through [`AuthenticatedExecutor`], which attaches the
//! stored access token and applies a single refresh-then-retry policy on
//! HTTP 401. The policy is an explicit state machine:
//!
//! ```text
//! Idle --Start--> Requesting --Completed--> Succeeded
//!                     |--Failed--> Failed
//!                     `--Unauthorized--> Refreshing --Refreshed--> Retrying
//!                                            |--RefreshFailed(fallback)--> FallingBack
//!                                            `--RefreshFailed(none)--> Failed
//! Retrying | FallingBack --Completed--> Succeeded, otherwise Failed
//! ```
//!
//! `Retrying` never leads back to `Refreshing`, so one operation refreshes at
//! most once.

use crate::error::{ClientError, ClientResult};
use crate::refresh::TokenRefresher;
use crate::store::TokenStore;
use nccms_core::TokenKind;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Position of one operation in the retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// Nothing sent yet
    Idle,
    /// First attempt in flight
    Requesting,
    /// First attempt was refused, refresh in flight
    Refreshing,
    /// Second attempt in flight with the new token
    Retrying,
    /// Refresh failed, unauthenticated fallback in flight
    FallingBack,
    /// Terminal: a result was produced
    Succeeded,
    /// Terminal: an error was surfaced
    Failed,
}

impl AuthState {
    /// Whether no further events are accepted
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Observations that drive [`AuthState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// Operation begins
    Start,
    /// The in-flight call returned successfully
    Completed,
    /// The in-flight call returned HTTP 401
    Unauthorized,
    /// The in-flight call failed otherwise
    Failed,
    /// A new access token was stored
    Refreshed,
    /// The refresh routine did not produce a token
    RefreshFailed {
        /// Whether the caller supplied a fallback
        has_fallback: bool,
    },
}

/// Transition table; `None` marks an illegal transition
#[must_use]
pub const fn transition(state: AuthState, event: AuthEvent) -> Option<AuthState> {
    use AuthEvent as E;
    use AuthState as S;

    match (state, event) {
        (S::Idle, E::Start) => Some(S::Requesting),
        (S::Requesting, E::Unauthorized) => Some(S::Refreshing),
        (S::Refreshing, E::Refreshed) => Some(S::Retrying),
        (S::Refreshing, E::RefreshFailed { has_fallback: true }) => Some(S::FallingBack),
        (S::Refreshing, E::RefreshFailed { has_fallback: false }) => Some(S::Failed),
        (S::Requesting | S::Retrying | S::FallingBack, E::Completed) => Some(S::Succeeded),
        (S::Requesting | S::Retrying | S::FallingBack, E::Failed)
        | (S::Retrying | S::FallingBack, E::Unauthorized) => Some(S::Failed),
        _ => None,
    }
}

/// One operation's walk through the state machine
#[derive(Debug, Clone)]
pub struct AuthFlow {
    state: AuthState,
    history: Vec<AuthState>,
}

impl Default for AuthFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthFlow {
    /// Fresh flow in [`AuthState::Idle`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AuthState::Idle,
            history: vec![AuthState::Idle],
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> AuthState {
        self.state
    }

    /// Every state visited, in order
    #[must_use]
    pub fn history(&self) -> &[AuthState] {
        &self.history
    }

    /// Apply `event`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::IllegalTransition`] when the table has no entry.
    pub fn fire(&mut self, event: AuthEvent) -> ClientResult<AuthState> {
        let next = transition(self.state, event).ok_or(ClientError::IllegalTransition {
            from: self.state,
            event,
        })?;
        debug!(from = ?self.state, ?event, to = ?next, "Auth transition");
        self.state = next;
        self.history.push(next);
        Ok(next)
    }

    /// Record how the in-flight call ended and hand its result back
    fn settle<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        let event = match &result {
            Ok(_) => AuthEvent::Completed,
            Err(e) if e.is_unauthorized() => AuthEvent::Unauthorized,
            Err(_) => AuthEvent::Failed,
        };
        self.fire(event)?;
        result
    }
}

/// Runs CMS calls under the refresh-then-retry policy
#[derive(Debug, Clone)]
pub struct AuthenticatedExecutor {
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
}

type NoFallback<T> = fn() -> std::future::Ready<ClientResult<T>>;

impl AuthenticatedExecutor {
    /// Create an executor over `store`, renewing tokens with `refresher`
    #[must_use]
    pub fn new(store: Arc<dyn TokenStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self { store, refresher }
    }

    /// Run `primary`, which receives the current access token
    ///
    /// A 401 that survives a refresh, or that cannot be refreshed, is
    /// returned as is.
    pub async fn execute<T, P, Fut>(&self, primary: P) -> ClientResult<T>
    where
        P: Fn(Option<String>) -> Fut + Send + Sync,
        Fut: Future<Output = ClientResult<T>> + Send,
        T: Send,
    {
        self.run(primary, None::<NoFallback<T>>).await
    }

    /// Run `primary`; if a 401 cannot be refreshed, run `fallback` instead
    pub async fn execute_with_fallback<T, P, Fut, F, FFut>(
        &self,
        primary: P,
        fallback: F,
    ) -> ClientResult<T>
    where
        P: Fn(Option<String>) -> Fut + Send + Sync,
        Fut: Future<Output = ClientResult<T>> + Send,
        F: FnOnce() -> FFut + Send,
        FFut: Future<Output = ClientResult<T>> + Send,
        T: Send,
    {
        self.run(primary, Some(fallback)).await
    }

    async fn run<T, P, Fut, F, FFut>(&self, primary: P, fallback: Option<F>) -> ClientResult<T>
    where
        P: Fn(Option<String>) -> Fut + Send + Sync,
        Fut: Future<Output = ClientResult<T>> + Send,
        F: FnOnce() -> FFut + Send,
        FFut: Future<Output = ClientResult<T>> + Send,
        T: Send,
    {
        let mut flow = AuthFlow::new();
        flow.fire(AuthEvent::Start)?;

        let refused = match primary(self.store.get(TokenKind::Access)).await {
            Err(e) if e.is_unauthorized() => e,
            other => return flow.settle(other),
        };
        flow.fire(AuthEvent::Unauthorized)?;

        if self.refresher.refresh().await?.is_success() {
            flow.fire(AuthEvent::Refreshed)?;
            let retried = primary(self.store.get(TokenKind::Access)).await;
            return flow.settle(retried);
        }

        flow.fire(AuthEvent::RefreshFailed {
            has_fallback: fallback.is_some(),
        })?;
        match fallback {
            Some(fallback) => flow.settle(fallback().await),
            None => Err(refused),
        }
    }
}
