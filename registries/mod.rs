/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The intent context: screen and handler registries plus scheme config.
//!
//! A context has a single logical owner. Registration, lookup and dispatch
//! are expected to run on one designated thread; the shared default context
//! is wrapped in a lock only so it can live in a `static`.

pub(crate) mod atomic;

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use parking_lot::RwLock;

use crate::codec::ExtraData;
use crate::config::ContextConfig;
use crate::diagnostics::{DiagnosticEvent, emit_event};
use crate::error::IntentError;
use crate::intent::host::NavigationHost;
use crate::intent::resolver::{self, Destination, ParsedUrl, Resolution};
use atomic::{HandlerRegistry, SchemeTable, ScreenRegistry};

pub use atomic::handler::HandlerFn;
pub use atomic::scheme::Namespace;
pub use atomic::screen::{Screen, ScreenFactory};

pub const CHANNEL_SCREEN_REGISTERED: &str = "registry.screen.registered";
pub const CHANNEL_SCREEN_UNREGISTERED: &str = "registry.screen.unregistered";
pub const CHANNEL_HANDLER_REGISTERED: &str = "registry.handler.registered";
pub const CHANNEL_HANDLER_UNREGISTERED: &str = "registry.handler.unregistered";
pub const CHANNEL_SCHEME_CHANGED: &str = "registry.scheme.changed";
pub const CHANNEL_LOOKUP_SUCCEEDED: &str = "registry.lookup.succeeded";
pub const CHANNEL_LOOKUP_FAILED: &str = "registry.lookup.failed";
pub const CHANNEL_INTENT_RESOLVE_STARTED: &str = "registry.intent.resolve_started";
pub const CHANNEL_INTENT_RESOLVE_SUCCEEDED: &str = "registry.intent.resolve_succeeded";
pub const CHANNEL_INTENT_RESOLVE_FAILED: &str = "registry.intent.resolve_failed";
pub const CHANNEL_INTENT_DISPATCH_STARTED: &str = "registry.intent.dispatch_started";
pub const CHANNEL_INTENT_DISPATCH_SUCCEEDED: &str = "registry.intent.dispatch_succeeded";
pub const CHANNEL_INTENT_DISPATCH_FAILED: &str = "registry.intent.dispatch_failed";
pub const CHANNEL_INTENT_COMPLETION_FIRED: &str = "registry.intent.completion_fired";
pub const CHANNEL_INTENT_DISPATCH_CANCELLED: &str = "registry.intent.dispatch_cancelled";

static DEFAULT_CONTEXT: OnceLock<RwLock<IntentContext>> = OnceLock::new();

pub struct IntentContext {
    screens: ScreenRegistry,
    handlers: HandlerRegistry,
    schemes: SchemeTable,
    root_host: Option<Arc<dyn NavigationHost>>,
}

impl IntentContext {
    pub fn new(config: &ContextConfig) -> Self {
        Self {
            screens: ScreenRegistry::default(),
            handlers: HandlerRegistry::default(),
            schemes: SchemeTable::from_config(config),
            root_host: None,
        }
    }

    /// The process-wide default context, built from the environment on
    /// first access.
    pub fn shared() -> &'static RwLock<IntentContext> {
        DEFAULT_CONTEXT.get_or_init(|| {
            let config = ContextConfig::from_env();
            log::debug!(
                "intent context: default instance created app_id='{}' router='{}' handler='{}'",
                config.app_id,
                config.router_scheme(),
                config.handler_scheme()
            );
            RwLock::new(Self::new(&config))
        })
    }

    pub fn register_screen<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn Screen> + Send + Sync + 'static,
    {
        self.register_screen_factory(key, Arc::new(factory));
    }

    pub fn register_screen_factory(&mut self, key: &str, factory: ScreenFactory) {
        if self.screens.register(key, factory) {
            log::debug!("intent context: screen '{key}' replaced");
        }
        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_SCREEN_REGISTERED,
            byte_len: key.len(),
        });
    }

    /// Registers every `(key, factory)` pair; later pairs win on duplicate keys.
    pub fn register_screens<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, ScreenFactory)>,
        K: AsRef<str>,
    {
        for (key, factory) in entries {
            self.register_screen_factory(key.as_ref(), factory);
        }
    }

    pub fn unregister_screen(&mut self, key: &str) {
        if self.screens.unregister(key) {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_SCREEN_UNREGISTERED,
                byte_len: key.len(),
            });
        }
    }

    pub fn screen_factory(&self, key: &str) -> Option<ScreenFactory> {
        self.screens.get(key)
    }

    pub fn screen_keys(&self) -> Vec<String> {
        self.screens.keys()
    }

    pub fn register_handler<F>(&mut self, key: &str, handler: F)
    where
        F: Fn(Option<ExtraData>, crate::intent::Completion) + Send + Sync + 'static,
    {
        self.register_handler_fn(key, Arc::new(handler));
    }

    pub fn register_handler_fn(&mut self, key: &str, handler: HandlerFn) {
        if self.handlers.register(key, handler) {
            log::debug!("intent context: handler '{key}' replaced");
        }
        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_HANDLER_REGISTERED,
            byte_len: key.len(),
        });
    }

    pub fn register_handlers<I, K>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, HandlerFn)>,
        K: AsRef<str>,
    {
        for (key, handler) in entries {
            self.register_handler_fn(key.as_ref(), handler);
        }
    }

    pub fn unregister_handler(&mut self, key: &str) {
        if self.handlers.unregister(key) {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_HANDLER_UNREGISTERED,
                byte_len: key.len(),
            });
        }
    }

    pub fn handler(&self, key: &str) -> Option<HandlerFn> {
        self.handlers.get(key)
    }

    pub fn handler_keys(&self) -> Vec<String> {
        self.handlers.keys()
    }

    pub fn router_scheme(&self) -> &str {
        self.schemes.router_scheme()
    }

    pub fn handler_scheme(&self) -> &str {
        self.schemes.handler_scheme()
    }

    /// Takes effect for later resolutions only; built intents keep their
    /// resolved destination.
    pub fn set_router_scheme(&mut self, scheme: impl Into<String>) {
        self.schemes.set_router_scheme(scheme);
        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_SCHEME_CHANGED,
            byte_len: self.schemes.router_scheme().len(),
        });
    }

    pub fn set_handler_scheme(&mut self, scheme: impl Into<String>) {
        self.schemes.set_handler_scheme(scheme);
        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_SCHEME_CHANGED,
            byte_len: self.schemes.handler_scheme().len(),
        });
    }

    pub fn scheme_for(&self, namespace: Namespace) -> &str {
        self.schemes.scheme_for(namespace)
    }

    /// Host used by intents that were not given an explicit source.
    pub fn root_host(&self) -> Option<Arc<dyn NavigationHost>> {
        self.root_host.clone()
    }

    pub fn set_root_host(&mut self, host: Option<Arc<dyn NavigationHost>>) {
        self.root_host = host;
    }

    /// Pure lookup of `key` in `namespace`.
    pub fn lookup(&self, namespace: Namespace, key: &str) -> Result<Destination, IntentError> {
        let destination = match namespace {
            Namespace::Router => self.screens.get(key).map(Destination::Screen),
            Namespace::Handler => self.handlers.get(key).map(Destination::Handler),
        };

        let Some(destination) = destination else {
            emit_event(DiagnosticEvent::MessageSent {
                channel_id: CHANNEL_LOOKUP_FAILED,
                byte_len: key.len(),
            });
            return Err(IntentError::DestinationNotFound {
                namespace,
                key: key.to_string(),
            });
        };

        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_LOOKUP_SUCCEEDED,
            byte_len: key.len(),
        });
        Ok(destination)
    }

    /// Splits `url` into namespace, key and payload without a registry lookup.
    pub fn parse_url(&self, url: &str) -> Result<ParsedUrl, IntentError> {
        resolver::parse_url(&self.schemes, url)
    }

    /// Parses `url` against this context's schemes and looks up its key.
    ///
    /// Fails before any destination is touched; the registries are never
    /// mutated.
    pub fn resolve_url(&self, url: &str) -> Result<Resolution, IntentError> {
        let started = Instant::now();
        emit_event(DiagnosticEvent::MessageSent {
            channel_id: CHANNEL_INTENT_RESOLVE_STARTED,
            byte_len: url.len(),
        });

        let result = resolver::parse_url(&self.schemes, url).and_then(|parsed| {
            let destination = self.lookup(parsed.namespace, &parsed.key)?;
            Ok(Resolution {
                namespace: parsed.namespace,
                key: parsed.key,
                destination,
                extra_data: parsed.extra_data,
            })
        });

        let latency_us = started.elapsed().as_micros() as u64;
        match &result {
            Ok(resolution) => {
                log::debug!(
                    "intent resolve url='{url}' namespace={} key='{}' payload={}",
                    resolution.namespace,
                    resolution.key,
                    resolution.extra_data.is_some()
                );
                emit_event(DiagnosticEvent::MessageReceived {
                    channel_id: CHANNEL_INTENT_RESOLVE_SUCCEEDED,
                    latency_us,
                });
            }
            Err(error) => {
                log::warn!("intent resolve url='{url}' failed: {error}");
                emit_event(DiagnosticEvent::MessageReceived {
                    channel_id: CHANNEL_INTENT_RESOLVE_FAILED,
                    latency_us,
                });
            }
        }

        result
    }

    pub fn router_url(&self, key: &str, extra: Option<&ExtraData>) -> Result<String, IntentError> {
        resolver::format_url(self.schemes.router_scheme(), key, extra)
    }

    pub fn handler_url(&self, key: &str, extra: Option<&ExtraData>) -> Result<String, IntentError> {
        resolver::format_url(self.schemes.handler_scheme(), key, extra)
    }
}

impl Default for IntentContext {
    fn default() -> Self {
        Self::new(&ContextConfig::default())
    }
}

impl std::fmt::Debug for IntentContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntentContext")
            .field("screens", &self.screens)
            .field("handlers", &self.handlers)
            .field("schemes", &self.schemes)
            .field("root_host", &self.root_host.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::diagnostics::DiagnosticsState;
    use crate::test_utils::TestScreen;

    fn counted_factory(counter: Arc<AtomicUsize>) -> impl Fn() -> Box<dyn Screen> + Send + Sync {
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(TestScreen::new("counted")) as Box<dyn Screen>
        }
    }

    #[test]
    fn namespaces_do_not_collide_on_shared_key() {
        let mut ctx = IntentContext::default();
        ctx.register_screen("profile", || Box::new(TestScreen::new("profile")));
        ctx.register_handler("profile", |_extra, completion| completion.complete());

        assert!(matches!(
            ctx.lookup(Namespace::Router, "profile"),
            Ok(Destination::Screen(_))
        ));
        assert!(matches!(
            ctx.lookup(Namespace::Handler, "profile"),
            Ok(Destination::Handler(_))
        ));

        ctx.unregister_handler("profile");
        assert!(ctx.screen_factory("profile").is_some());
        assert!(ctx.handler("profile").is_none());
    }

    #[test]
    fn lookup_of_unregistered_key_fails_without_constructing() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut ctx = IntentContext::default();
        ctx.register_screen("profile", counted_factory(counter.clone()));

        let error = ctx
            .lookup(Namespace::Router, "missing")
            .expect_err("missing key");
        assert_eq!(
            error,
            IntentError::DestinationNotFound {
                namespace: Namespace::Router,
                key: "missing".to_string(),
            }
        );
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn resolve_url_decodes_payload_for_registered_screen() {
        let mut ctx = IntentContext::default();
        ctx.register_screen("profile", || Box::new(TestScreen::new("profile")));

        let resolution = ctx
            .resolve_url(r#"com.app.router://profile?extraData={"id":"7"}"#)
            .expect("profile should resolve");

        assert_eq!(resolution.namespace, Namespace::Router);
        assert_eq!(resolution.key, "profile");
        assert_eq!(
            resolution.extra_data.as_ref().and_then(|extra| extra.get("id")),
            Some(&json!("7"))
        );
    }

    #[test]
    fn scheme_change_applies_to_subsequent_resolutions() {
        let mut ctx = IntentContext::default();
        ctx.register_handler("logout", |_extra, completion| completion.complete());
        ctx.set_handler_scheme("func");

        assert!(ctx.resolve_url("func://logout").is_ok());
        assert!(matches!(
            ctx.resolve_url("com.app.func://logout"),
            Err(IntentError::UnknownScheme { .. })
        ));
    }

    #[test]
    fn bulk_registration_lists_sorted_keys() {
        let mut ctx = IntentContext::default();
        ctx.register_screens([
            ("settings", TestScreen::factory("settings")),
            ("entry", TestScreen::factory("entry")),
            ("settings", TestScreen::factory("settings-v2")),
        ]);

        assert_eq!(ctx.screen_keys(), vec!["entry".to_string(), "settings".to_string()]);
        let factory = ctx.screen_factory("settings").expect("settings registered");
        assert_eq!(factory().screen_id(), "settings-v2");
    }

    #[test]
    fn resolution_emits_started_and_outcome_channels() {
        let mut diagnostics = DiagnosticsState::install_for_thread();
        let mut ctx = IntentContext::default();
        ctx.register_screen("profile", || Box::new(TestScreen::new("profile")));

        let _ = ctx.resolve_url("com.app.router://profile");
        let _ = ctx.resolve_url("com.app.router://missing");

        let snapshot = diagnostics.snapshot();
        assert_eq!(snapshot.channel_count(CHANNEL_INTENT_RESOLVE_STARTED), 2);
        assert_eq!(snapshot.channel_count(CHANNEL_INTENT_RESOLVE_SUCCEEDED), 1);
        assert_eq!(snapshot.channel_count(CHANNEL_INTENT_RESOLVE_FAILED), 1);
        assert_eq!(snapshot.channel_count(CHANNEL_LOOKUP_FAILED), 1);
        assert_eq!(snapshot.channel_count(CHANNEL_SCREEN_REGISTERED), 1);

        crate::diagnostics::install_thread_sender(None);
    }

    #[test]
    fn router_url_round_trips_through_resolution() {
        let mut ctx = IntentContext::default();
        ctx.register_screen("user profile", || Box::new(TestScreen::new("profile")));
        let serde_json::Value::Object(extra) = json!({"name": "a+b c", "n": 3}) else {
            unreachable!();
        };

        let url = ctx.router_url("user profile", Some(&extra)).expect("url should format");
        let resolution = ctx.resolve_url(&url).expect("formatted url should resolve");

        assert_eq!(resolution.key, "user profile");
        assert_eq!(resolution.extra_data, Some(extra));
    }
}
