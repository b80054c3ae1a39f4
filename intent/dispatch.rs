/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::time::Instant;

use super::completion::OnDone;
use super::{Action, Completion, Dispatch, Intent, NavigationHost, NavigationOptions, Target};
use crate::codec::ExtraData;
use crate::diagnostics::{DiagnosticEvent, emit_event};
use crate::error::IntentError;
use crate::registries::{
    CHANNEL_INTENT_DISPATCH_FAILED, CHANNEL_INTENT_DISPATCH_STARTED,
    CHANNEL_INTENT_DISPATCH_SUCCEEDED, HandlerFn, Namespace, Screen, ScreenFactory,
};

enum PendingScreen {
    Factory(ScreenFactory),
    Built(Box<dyn Screen>),
}

impl PendingScreen {
    fn build(self) -> Box<dyn Screen> {
        match self {
            Self::Factory(factory) => factory(),
            Self::Built(screen) => screen,
        }
    }
}

impl Intent {
    /// Runs the intent's action.
    ///
    /// Fails without side effects when resolution failed or the action
    /// cannot be carried out; no screen is built in that case.
    pub fn submit(self) -> Result<Dispatch, IntentError> {
        self.dispatch(None)
    }

    /// Like [`Intent::submit`], then runs `on_done` once the destination
    /// signals completion. `on_done` never runs if the submit fails.
    pub fn submit_with_completion<F>(self, on_done: F) -> Result<Dispatch, IntentError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.dispatch(Some(Box::new(on_done)))
    }

    fn dispatch(self, on_done: Option<OnDone>) -> Result<Dispatch, IntentError> {
        let started = Instant::now();
        let host = self.host();
        let label = self.log_label().to_string();
        let Intent {
            target,
            extra_data,
            action,
            options,
            ..
        } = self;

        let result = target.and_then(|target| {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_INTENT_DISPATCH_STARTED,
                byte_len: label.len(),
            });
            match target {
                Target::Screen { factory, .. } => navigate(
                    PendingScreen::Factory(factory),
                    extra_data,
                    action,
                    &options,
                    host,
                    on_done,
                ),
                Target::Instance(screen) => navigate(
                    PendingScreen::Built(screen),
                    extra_data,
                    action,
                    &options,
                    host,
                    on_done,
                ),
                Target::Handler { handler, .. } | Target::Block(handler) => {
                    perform_block(handler, extra_data, action, on_done)
                }
            }
        });

        let latency_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(dispatch) => {
                log::debug!(
                    "intent dispatch {} key='{label}' requested={action:?} performed={:?}",
                    dispatch.id(),
                    dispatch.action()
                );
                emit_event(DiagnosticEvent::MessageReceived {
                    channel_id: CHANNEL_INTENT_DISPATCH_SUCCEEDED,
                    latency_us,
                });
            }
            Err(error) => {
                log::warn!("intent dispatch key='{label}' action={action:?} failed: {error}");
                emit_event(DiagnosticEvent::MessageReceived {
                    channel_id: CHANNEL_INTENT_DISPATCH_FAILED,
                    latency_us,
                });
            }
        }
        result
    }
}

fn perform_block(
    handler: HandlerFn,
    extra_data: Option<ExtraData>,
    action: Action,
    on_done: Option<OnDone>,
) -> Result<Dispatch, IntentError> {
    if matches!(action, Action::Present | Action::Push) {
        return Err(IntentError::UnsupportedAction {
            action,
            namespace: Namespace::Handler,
        });
    }

    let completion = Completion::new(on_done);
    let dispatch = completion.dispatch(Action::PerformBlock);
    handler(extra_data, completion);
    Ok(dispatch)
}

fn navigate(
    screen: PendingScreen,
    extra_data: Option<ExtraData>,
    action: Action,
    options: &NavigationOptions,
    host: Option<Arc<dyn NavigationHost>>,
    on_done: Option<OnDone>,
) -> Result<Dispatch, IntentError> {
    if action == Action::PerformBlock {
        return Err(IntentError::HandlerMissing);
    }
    let Some(host) = host else {
        return Err(IntentError::NoNavigationHost);
    };
    if action == Action::Push && !host.can_push() {
        return Err(IntentError::NoNavigationHost);
    }

    let mut screen = screen.build();
    let action = match action {
        Action::Auto => auto_action(screen.preferred_action(), host.can_push()),
        explicit => explicit,
    };
    screen.set_extra_data(extra_data);

    let completion = Completion::new(on_done);
    let dispatch = completion.dispatch(action);
    match action {
        Action::Push => host.push(screen, options, completion),
        _ => host.present(screen, options, completion),
    }
    Ok(dispatch)
}

/// A screen's own `Present` preference wins; otherwise push when possible.
fn auto_action(preferred: Option<Action>, can_push: bool) -> Action {
    match preferred {
        Some(Action::Present) => Action::Present,
        _ if can_push => Action::Push,
        _ => Action::Present,
    }
}
