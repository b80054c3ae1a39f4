/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::intent::Completion;
use crate::registries::Screen;

/// How a push treats the screens already on the host's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackPolicy {
    #[default]
    Keep,
    /// Pop everything above an existing instance of the same screen.
    ClearTop,
    /// Reuse the top screen if it already is the destination.
    SingleTop,
    /// Replace the whole stack with the destination.
    RootTop,
    /// Replace the current top screen.
    ClearLast,
}

/// Options passed through to the navigation host untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationOptions {
    pub animated: bool,
    pub stack_policy: StackPolicy,
    /// Wrap a presented screen in its own navigation stack.
    pub wrap_in_stack: bool,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            animated: true,
            stack_policy: StackPolicy::Keep,
            wrap_in_stack: false,
        }
    }
}

/// The surface that actually shows screens.
///
/// Implementations own the presentation mechanics and must fire the given
/// [`Completion`] once the navigation has finished.
pub trait NavigationHost: Send + Sync {
    /// Whether the host has a stack that `push` can grow.
    fn can_push(&self) -> bool;

    fn present(&self, screen: Box<dyn Screen>, options: &NavigationOptions, completion: Completion);

    fn push(&self, screen: Box<dyn Screen>, options: &NavigationOptions, completion: Completion);
}
