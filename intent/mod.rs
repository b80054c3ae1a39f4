/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Intents: a resolved destination, its payload and the requested action.
//!
//! An intent resolves once, when it is built. Building never fails; a failed
//! resolution is kept inside the intent and reported by `submit` without
//! touching any screen, handler or host. Submitting consumes the intent, so
//! an intent is dispatched at most once.

pub(crate) mod completion;
mod dispatch;
pub(crate) mod host;
pub(crate) mod resolver;

use std::sync::Arc;

use crate::codec::ExtraData;
use crate::error::IntentError;
use crate::registries::{HandlerFn, IntentContext, Namespace, Screen, ScreenFactory};

pub use completion::{Completion, Dispatch, DispatchState};
pub use host::{NavigationHost, NavigationOptions, StackPolicy};
pub use resolver::{Destination, EXTRA_DATA_PARAM, ParsedUrl, Resolution, format_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    /// `PerformBlock` for handlers; for screens `Push` when the host can
    /// push and `Present` otherwise.
    #[default]
    Auto,
    Present,
    Push,
    PerformBlock,
}

enum Target {
    Screen { key: String, factory: ScreenFactory },
    Instance(Box<dyn Screen>),
    Handler { key: String, handler: HandlerFn },
    Block(HandlerFn),
}

impl Target {
    fn from_destination(key: String, destination: Destination) -> Self {
        match destination {
            Destination::Screen(factory) => Self::Screen { key, factory },
            Destination::Handler(handler) => Self::Handler { key, handler },
        }
    }

    fn namespace(&self) -> Namespace {
        match self {
            Self::Screen { .. } | Self::Instance(_) => Namespace::Router,
            Self::Handler { .. } | Self::Block(_) => Namespace::Handler,
        }
    }

    fn key(&self) -> Option<&str> {
        match self {
            Self::Screen { key, .. } | Self::Handler { key, .. } => Some(key),
            Self::Instance(screen) => Some(screen.screen_id()),
            Self::Block(_) => None,
        }
    }
}

pub struct Intent {
    target: Result<Target, IntentError>,
    extra_data: Option<ExtraData>,
    action: Action,
    options: NavigationOptions,
    source: Option<Arc<dyn NavigationHost>>,
    root_host: Option<Arc<dyn NavigationHost>>,
}

impl Intent {
    fn with_target(
        target: Result<Target, IntentError>,
        extra_data: Option<ExtraData>,
        root_host: Option<Arc<dyn NavigationHost>>,
    ) -> Self {
        Self {
            target,
            extra_data,
            action: Action::Auto,
            options: NavigationOptions::default(),
            source: None,
            root_host,
        }
    }

    /// Looks `key` up in `namespace` of `ctx`.
    pub fn from_key(
        ctx: &IntentContext,
        namespace: Namespace,
        key: &str,
        extra_data: Option<ExtraData>,
    ) -> Self {
        let target = ctx
            .lookup(namespace, key)
            .map(|destination| Target::from_destination(key.to_string(), destination));
        Self::with_target(target, extra_data, ctx.root_host())
    }

    pub fn from_url(ctx: &IntentContext, url: &str) -> Self {
        match ctx.resolve_url(url) {
            Ok(resolution) => Self::with_target(
                Ok(Target::from_destination(resolution.key, resolution.destination)),
                resolution.extra_data,
                ctx.root_host(),
            ),
            Err(error) => Self::with_target(Err(error), None, ctx.root_host()),
        }
    }

    /// Wraps an already constructed screen; no registry lookup happens.
    pub fn for_screen(screen: Box<dyn Screen>, extra_data: Option<ExtraData>) -> Self {
        Self::with_target(Ok(Target::Instance(screen)), extra_data, None)
    }

    /// Wraps a block to run; no registry lookup happens.
    pub fn for_block<F>(block: F, extra_data: Option<ExtraData>) -> Self
    where
        F: Fn(Option<ExtraData>, Completion) + Send + Sync + 'static,
    {
        Self::with_target(Ok(Target::Block(Arc::new(block))), extra_data, None)
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Host to navigate from, taking precedence over the context's root host.
    pub fn with_source(mut self, source: Arc<dyn NavigationHost>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_options(mut self, options: NavigationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_ok()
    }

    /// Why resolution failed, if it did.
    pub fn error(&self) -> Option<&IntentError> {
        self.target.as_ref().err()
    }

    pub fn namespace(&self) -> Option<Namespace> {
        self.target.as_ref().ok().map(Target::namespace)
    }

    pub fn key(&self) -> Option<&str> {
        self.target.as_ref().ok().and_then(Target::key)
    }

    pub fn extra_data(&self) -> Option<&ExtraData> {
        self.extra_data.as_ref()
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    /// Name used in dispatch log lines.
    fn log_label(&self) -> &str {
        match &self.target {
            Ok(target) => target.key().unwrap_or("<block>"),
            Err(IntentError::DestinationNotFound { key, .. }) => key,
            Err(_) => "<unresolved>",
        }
    }

    fn host(&self) -> Option<Arc<dyn NavigationHost>> {
        self.source.clone().or_else(|| self.root_host.clone())
    }
}

impl std::fmt::Debug for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Intent")
            .field("namespace", &self.namespace())
            .field("key", &self.key())
            .field("error", &self.error())
            .field("extra_data", &self.extra_data)
            .field("action", &self.action)
            .field("options", &self.options)
            .field("has_host", &self.host().is_some())
            .finish()
    }
}
