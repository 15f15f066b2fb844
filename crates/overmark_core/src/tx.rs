//! Async transaction wrapper for persistence callbacks.
//!
//! # Responsibility
//! - Run caller-supplied async operations without letting failures escape.
//! - Hold transitional overlay states for the lifetime of one call.
//!
//! # Invariants
//! - `execute_async` always resolves to a `TxResult`; errors and panics are
//!   both captured, whether raised while building the future or while
//!   polling it.
//! - A `TransitionGuard` dropped without `finish` leaves the overlay in
//!   `error`, never in `saving`/`resolving`.

use crate::errors::{CallbackError, OverlayError, OverlayErrorKind};
use crate::logging::panic_payload_summary;
use crate::model::overlay::OverlayState;
use crate::store::action::CommentAction;
use crate::store::handle::CommentStore;
use log::{error, warn};
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

const MAX_PANIC_MESSAGE_CHARS: usize = 160;

/// Normalized outcome of one wrapped operation.
#[derive(Debug, Clone, Default)]
pub struct TxResult {
    pub error: Option<OverlayError>,
}

impl TxResult {
    pub fn ok() -> Self {
        Self { error: None }
    }

    pub fn failed(error: OverlayError) -> Self {
        Self { error: Some(error) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs `operation`, converting every failure into `TxResult::error`.
///
/// Callback errors are wrapped as `UnknownError` with the callback's error as
/// source; callers re-label them with `OverlayError::into_kind`.
pub async fn execute_async<F, Fut>(operation: F) -> TxResult
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), CallbackError>>,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(future) => future,
        Err(payload) => return TxResult::failed(panic_error(payload.as_ref())),
    };

    match (CatchUnwind {
        inner: Box::pin(future),
    })
    .await
    {
        Ok(Ok(())) => TxResult::ok(),
        Ok(Err(err)) => TxResult::failed(OverlayError::unknown().with_source(err)),
        Err(payload) => TxResult::failed(panic_error(payload.as_ref())),
    }
}

struct CatchUnwind<Fut> {
    inner: Pin<Box<Fut>>,
}

impl<Fut: Future> Future for CatchUnwind<Fut> {
    type Output = Result<Fut::Output, Box<dyn Any + Send>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match panic::catch_unwind(AssertUnwindSafe(|| this.inner.as_mut().poll(cx))) {
            Ok(Poll::Pending) => Poll::Pending,
            Ok(Poll::Ready(output)) => Poll::Ready(Ok(output)),
            Err(payload) => Poll::Ready(Err(payload)),
        }
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> OverlayError {
    error!("event=tx_panic module=tx status=error");
    OverlayError::new(
        OverlayErrorKind::Unknown,
        format!(
            "callback panicked: {}",
            panic_payload_summary(payload, MAX_PANIC_MESSAGE_CHARS)
        ),
    )
}

/// Scoped transitional overlay state.
///
/// Acquisition switches the overlay to `state`; `finish` sets the settled
/// state. Dropping an unfinished guard settles on `error`.
pub struct TransitionGuard {
    store: CommentStore,
    state: OverlayState,
    finished: bool,
}

impl TransitionGuard {
    pub fn acquire(store: &CommentStore, state: OverlayState) -> Self {
        store.dispatch(CommentAction::ChangeOverlayState(state));
        Self {
            store: store.clone(),
            state,
            finished: false,
        }
    }

    /// Settles the overlay on `to` and disarms the guard.
    pub fn finish(mut self, to: OverlayState) {
        self.finished = true;
        self.store.dispatch(CommentAction::ChangeOverlayState(to));
    }
}

impl Drop for TransitionGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!(
            "event=transition_abandoned module=tx status=error state={}",
            self.state
        );
        self.store
            .dispatch(CommentAction::ChangeOverlayState(OverlayState::Error));
    }
}
