/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Fire-once completion signals and the dispatch handle that observes them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::diagnostics::{DiagnosticEvent, emit_event};
use crate::intent::Action;
use crate::registries::{CHANNEL_INTENT_COMPLETION_FIRED, CHANNEL_INTENT_DISPATCH_CANCELLED};

const STATE_PENDING: u8 = 0;
const STATE_DONE: u8 = 1;
const STATE_CANCELLED: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// The destination has not signalled completion yet.
    Pending,
    Done,
    Cancelled,
}

#[derive(Debug)]
struct DispatchShared {
    id: Uuid,
    state: AtomicU8,
    token: CancellationToken,
}

impl DispatchShared {
    fn state(&self) -> DispatchState {
        match self.state.load(Ordering::Acquire) {
            STATE_DONE => DispatchState::Done,
            STATE_CANCELLED => DispatchState::Cancelled,
            _ => DispatchState::Pending,
        }
    }
}

pub(crate) type OnDone = Box<dyn FnOnce() + Send>;

/// Signal handed to a handler or navigation host.
///
/// Consuming `complete` makes a second firing impossible. Dropping a
/// completion without calling it leaves the dispatch pending forever.
pub struct Completion {
    shared: Arc<DispatchShared>,
    on_done: Option<OnDone>,
}

impl Completion {
    pub(crate) fn new(on_done: Option<OnDone>) -> Self {
        Self {
            shared: Arc::new(DispatchShared {
                id: Uuid::new_v4(),
                state: AtomicU8::new(STATE_PENDING),
                token: CancellationToken::new(),
            }),
            on_done,
        }
    }

    /// A completion with no outer callback, plus the handle observing it.
    ///
    /// Useful for invoking a handler directly outside of an intent.
    pub fn detached() -> (Dispatch, Completion) {
        let completion = Self::new(None);
        let dispatch = Dispatch::new(completion.shared.clone(), Action::PerformBlock);
        (dispatch, completion)
    }

    pub(crate) fn dispatch(&self, action: Action) -> Dispatch {
        Dispatch::new(self.shared.clone(), action)
    }

    pub fn dispatch_id(&self) -> Uuid {
        self.shared.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Token cancelled by [`Dispatch::cancel`]. Long-running handlers can
    /// select on it to abandon their work early.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shared.token.clone()
    }

    /// Marks the dispatch done and runs the outer callback, unless the
    /// dispatch was cancelled first.
    pub fn complete(mut self) {
        if self.shared.token.is_cancelled() {
            log::debug!("intent dispatch {} completed after cancel; ignoring", self.shared.id);
            return;
        }
        if self
            .shared
            .state
            .compare_exchange(STATE_PENDING, STATE_DONE, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_INTENT_COMPLETION_FIRED,
            byte_len: 0,
        });
        if let Some(on_done) = self.on_done.take() {
            on_done();
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("id", &self.shared.id)
            .field("state", &self.shared.state())
            .field("has_on_done", &self.on_done.is_some())
            .finish()
    }
}

/// Handle for a submitted intent.
#[derive(Debug, Clone)]
pub struct Dispatch {
    shared: Arc<DispatchShared>,
    action: Action,
}

impl Dispatch {
    fn new(shared: Arc<DispatchShared>, action: Action) -> Self {
        Self { shared, action }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    /// The concrete action that ran; never `Auto`.
    pub fn action(&self) -> Action {
        self.action
    }

    pub fn state(&self) -> DispatchState {
        self.shared.state()
    }

    pub fn is_done(&self) -> bool {
        self.state() == DispatchState::Done
    }

    /// Cancels a pending dispatch. Returns `false` if it already finished or
    /// was cancelled.
    pub fn cancel(&self) -> bool {
        let cancelled = self
            .shared
            .state
            .compare_exchange(
                STATE_PENDING,
                STATE_CANCELLED,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if cancelled {
            self.shared.token.cancel();
            log::debug!("intent dispatch {} cancelled", self.shared.id);
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_INTENT_DISPATCH_CANCELLED,
                byte_len: 0,
            });
        }
        cancelled
    }
}
