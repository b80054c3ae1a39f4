/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Screens and navigation hosts for tests.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec::ExtraData;
use crate::intent::{Action, Completion, NavigationHost, NavigationOptions};
use crate::registries::{Screen, ScreenFactory};

#[derive(Debug, Clone, PartialEq)]
pub struct TestScreen {
    id: String,
    extra_data: Option<ExtraData>,
    preferred: Option<Action>,
}

impl TestScreen {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            extra_data: None,
            preferred: None,
        }
    }

    pub fn with_preferred(mut self, action: Action) -> Self {
        self.preferred = Some(action);
        self
    }

    pub fn factory(id: &str) -> ScreenFactory {
        let id = id.to_string();
        Arc::new(move || Box::new(TestScreen::new(&id)) as Box<dyn Screen>)
    }
}

impl Screen for TestScreen {
    fn screen_id(&self) -> &str {
        &self.id
    }

    fn extra_data(&self) -> Option<&ExtraData> {
        self.extra_data.as_ref()
    }

    fn set_extra_data(&mut self, extra: Option<ExtraData>) {
        self.extra_data = extra;
    }

    fn preferred_action(&self) -> Option<Action> {
        self.preferred
    }
}

/// What a [`RecordingHost`] saw for one navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedNavigation {
    pub action: Action,
    pub screen_id: String,
    pub extra_data: Option<ExtraData>,
    pub options: NavigationOptions,
}

/// Host that records navigations instead of showing anything.
///
/// By default every navigation completes immediately. A deferred host parks
/// completions until [`RecordingHost::complete_pending`] is called.
#[derive(Debug)]
pub struct RecordingHost {
    can_push: bool,
    deferred: bool,
    records: Mutex<Vec<RecordedNavigation>>,
    pending: Mutex<Vec<Completion>>,
}

impl RecordingHost {
    pub fn new(can_push: bool) -> Arc<Self> {
        Arc::new(Self::build(can_push, false))
    }

    pub fn deferred(can_push: bool) -> Arc<Self> {
        Arc::new(Self::build(can_push, true))
    }

    fn build(can_push: bool, deferred: bool) -> Self {
        Self {
            can_push,
            deferred,
            records: Mutex::new(Vec::new()),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<RecordedNavigation> {
        self.records.lock().clone()
    }

    /// Fires every parked completion. Returns how many there were.
    pub fn complete_pending(&self) -> usize {
        let pending: Vec<Completion> = std::mem::take(&mut *self.pending.lock());
        let count = pending.len();
        for completion in pending {
            completion.complete();
        }
        count
    }

    fn record(
        &self,
        action: Action,
        screen: Box<dyn Screen>,
        options: &NavigationOptions,
        completion: Completion,
    ) {
        self.records.lock().push(RecordedNavigation {
            action,
            screen_id: screen.screen_id().to_string(),
            extra_data: screen.extra_data().cloned(),
            options: *options,
        });
        if self.deferred {
            self.pending.lock().push(completion);
        } else {
            completion.complete();
        }
    }
}

impl NavigationHost for RecordingHost {
    fn can_push(&self) -> bool {
        self.can_push
    }

    fn present(&self, screen: Box<dyn Screen>, options: &NavigationOptions, completion: Completion) {
        self.record(Action::Present, screen, options, completion);
    }

    fn push(&self, screen: Box<dyn Screen>, options: &NavigationOptions, completion: Completion) {
        self.record(Action::Push, screen, options, completion);
    }
}
