/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Diagnostics channel events emitted by resolution and dispatch.
//!
//! Events go to a process-wide sender installed once by the embedder. Tests
//! install a per-thread sender so parallel tests do not observe each other.

use std::collections::HashMap;
use std::sync::OnceLock;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEvent {
    MessageSent {
        channel_id: &'static str,
        byte_len: usize,
    },
    MessageReceived {
        channel_id: &'static str,
        latency_us: u64,
    },
}

impl DiagnosticEvent {
    pub fn channel_id(&self) -> &'static str {
        match self {
            Self::MessageSent { channel_id, .. } | Self::MessageReceived { channel_id, .. } => {
                channel_id
            }
        }
    }
}

static GLOBAL_DIAGNOSTICS_TX: OnceLock<Sender<DiagnosticEvent>> = OnceLock::new();

#[cfg(any(test, feature = "test-utils"))]
thread_local! {
    static THREAD_DIAGNOSTICS_TX: std::cell::RefCell<Option<Sender<DiagnosticEvent>>> =
        const { std::cell::RefCell::new(None) };
}

/// Installs the process-wide sink. Returns `false` if one was already set.
pub fn install_global_sender(sender: Sender<DiagnosticEvent>) -> bool {
    GLOBAL_DIAGNOSTICS_TX.set(sender).is_ok()
}

/// Routes events emitted on the current thread to `sender` instead of the
/// global sink. Passing `None` restores global routing.
#[cfg(any(test, feature = "test-utils"))]
pub fn install_thread_sender(sender: Option<Sender<DiagnosticEvent>>) {
    THREAD_DIAGNOSTICS_TX.with(|slot| {
        *slot.borrow_mut() = sender;
    });
}

pub(crate) fn emit_event(event: DiagnosticEvent) {
    #[cfg(any(test, feature = "test-utils"))]
    {
        let mut event = Some(event);
        THREAD_DIAGNOSTICS_TX.with(|slot| {
            if let Some(tx) = slot.borrow().as_ref()
                && let Some(payload) = event.take()
            {
                let _ = tx.send(payload);
            }
        });
        let Some(event) = event else {
            return;
        };
        emit_to_global(event);
    }

    #[cfg(not(any(test, feature = "test-utils")))]
    emit_to_global(event);
}

fn emit_to_global(event: DiagnosticEvent) {
    if let Some(tx) = GLOBAL_DIAGNOSTICS_TX.get() {
        let _ = tx.send(event);
    }
}

/// Per-channel counters accumulated from a diagnostics receiver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub message_counts: HashMap<&'static str, u64>,
    pub message_bytes_sent: HashMap<&'static str, u64>,
    pub message_latency_us: HashMap<&'static str, u64>,
}

impl DiagnosticsSnapshot {
    pub fn channel_count(&self, channel_id: &str) -> u64 {
        self.message_counts.get(channel_id).copied().unwrap_or(0)
    }
}

pub struct DiagnosticsState {
    receiver: Receiver<DiagnosticEvent>,
    snapshot: DiagnosticsSnapshot,
}

impl DiagnosticsState {
    pub fn new(receiver: Receiver<DiagnosticEvent>) -> Self {
        Self {
            receiver,
            snapshot: DiagnosticsSnapshot::default(),
        }
    }

    /// Creates a state wired to the current thread's sender.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn install_for_thread() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        install_thread_sender(Some(tx));
        Self::new(rx)
    }

    pub fn drain(&mut self) {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => self.record(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    pub fn snapshot(&mut self) -> DiagnosticsSnapshot {
        self.drain();
        self.snapshot.clone()
    }

    fn record(&mut self, event: DiagnosticEvent) {
        let channel_id = event.channel_id();
        *self.snapshot.message_counts.entry(channel_id).or_insert(0) += 1;
        match event {
            DiagnosticEvent::MessageSent { byte_len, .. } => {
                *self
                    .snapshot
                    .message_bytes_sent
                    .entry(channel_id)
                    .or_insert(0) += byte_len as u64;
            }
            DiagnosticEvent::MessageReceived { latency_us, .. } => {
                *self
                    .snapshot
                    .message_latency_us
                    .entry(channel_id)
                    .or_insert(0) += latency_us;
            }
        }
    }
}
