//! Optimistic local updates with all-or-nothing rollback

use crate::error::ClientResult;
use std::future::Future;
use tracing::warn;

/// Apply `mutate` to `state` immediately, then run the remote `effect`
///
/// `effect` receives a copy of the updated state. If it fails, `state` is
/// restored to its exact pre-mutation snapshot and the error is returned;
/// no partial result is kept.
///
/// # Errors
///
/// Returns the error produced by `effect`.
pub async fn apply<T, R, M, E, Fut>(state: &mut T, mutate: M, effect: E) -> ClientResult<R>
where
    T: Clone,
    M: FnOnce(&mut T),
    E: FnOnce(T) -> Fut,
    Fut: Future<Output = ClientResult<R>>,
{
    let snapshot = state.clone();
    mutate(state);

    match effect(state.clone()).await {
        Ok(result) => Ok(result),
        Err(e) => {
            warn!(error = %e, "Remote update failed, restoring previous state");
            *state = snapshot;
            Err(e)
        }
    }
}
