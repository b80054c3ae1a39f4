/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! String-keyed intent routing.
//!
//! Screens and callback handlers are registered under short keys in an
//! [`IntentContext`]. An [`Intent`] is built from a key or from a destination
//! url such as `com.app.router://profile?extraData={"id":"7"}`, then
//! submitted to present or push a fresh screen on a [`NavigationHost`] or to
//! run a handler.

pub mod codec;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod intent;
pub mod registries;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use codec::ExtraData;
pub use config::ContextConfig;
pub use error::IntentError;
pub use intent::{
    Action, Completion, Destination, Dispatch, DispatchState, Intent, NavigationHost,
    NavigationOptions, ParsedUrl, Resolution, StackPolicy, format_url,
};
pub use registries::{HandlerFn, IntentContext, Namespace, Screen, ScreenFactory};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
