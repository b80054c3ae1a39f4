/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use intent_router::diagnostics::{DiagnosticsState, install_thread_sender};
use intent_router::registries::{
    CHANNEL_INTENT_COMPLETION_FIRED, CHANNEL_INTENT_DISPATCH_SUCCEEDED,
    CHANNEL_INTENT_RESOLVE_FAILED,
};
use intent_router::test_utils::{RecordingHost, TestScreen};
use intent_router::{
    Action, ContextConfig, DispatchState, ExtraData, Intent, IntentContext, IntentError,
    Namespace, VERSION,
};
use serde_json::{Value, json};

struct ScenarioHarness {
    ctx: IntentContext,
    host: Arc<RecordingHost>,
    screens_built: Arc<AtomicUsize>,
    diagnostics: DiagnosticsState,
}

impl ScenarioHarness {
    fn new() -> Self {
        let diagnostics = DiagnosticsState::install_for_thread();
        let host = RecordingHost::new(true);
        let mut ctx = IntentContext::new(&ContextConfig::default());
        ctx.set_root_host(Some(host.clone()));

        Self {
            ctx,
            host,
            screens_built: Arc::new(AtomicUsize::new(0)),
            diagnostics,
        }
    }

    fn register_counted_screen(&mut self, key: &'static str) {
        let built = self.screens_built.clone();
        self.ctx.register_screen(key, move || {
            built.fetch_add(1, Ordering::SeqCst);
            Box::new(TestScreen::new(key))
        });
    }

    fn screens_built(&self) -> usize {
        self.screens_built.load(Ordering::SeqCst)
    }
}

impl Drop for ScenarioHarness {
    fn drop(&mut self) {
        install_thread_sender(None);
    }
}

fn object(value: Value) -> ExtraData {
    match value {
        Value::Object(map) => map,
        _ => ExtraData::new(),
    }
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn profile_url_delivers_payload_to_a_fresh_screen() {
    let mut harness = ScenarioHarness::new();
    harness.register_counted_screen("profile");

    let intent = Intent::from_url(
        &harness.ctx,
        r#"com.app.router://profile?extraData={"id":"7"}"#,
    );
    assert_eq!(intent.namespace(), Some(Namespace::Router));

    let dispatch = intent.submit().expect("profile should dispatch");

    let records = harness.host.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].screen_id, "profile");
    assert_eq!(records[0].extra_data, Some(object(json!({"id": "7"}))));
    assert_eq!(dispatch.action(), Action::Push);
    assert_eq!(harness.screens_built(), 1);
}

#[test]
fn logout_handler_fires_outer_completion_exactly_once() {
    let mut harness = ScenarioHarness::new();
    let received = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let received_in_handler = received.clone();
    harness.ctx.register_handler("logout", move |extra, completion| {
        received_in_handler.lock().push(extra);
        completion.complete();
    });
    let fired = Arc::new(AtomicUsize::new(0));
    let fired_in_callback = fired.clone();

    let dispatch = Intent::from_url(&harness.ctx, "com.app.func://logout")
        .with_action(Action::PerformBlock)
        .submit_with_completion(move || {
            fired_in_callback.fetch_add(1, Ordering::SeqCst);
        })
        .expect("logout should dispatch");

    assert_eq!(received.lock().as_slice(), &[None]);
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(dispatch.state(), DispatchState::Done);
    assert!(!dispatch.cancel());
    assert_eq!(
        harness.diagnostics.snapshot().channel_count(CHANNEL_INTENT_COMPLETION_FIRED),
        1
    );
}

#[test]
fn unresolvable_urls_fail_without_building_screens() {
    let mut harness = ScenarioHarness::new();
    harness.register_counted_screen("profile");

    let unknown = Intent::from_url(&harness.ctx, "unknown://x");
    let missing = Intent::from_url(&harness.ctx, "com.app.router://missing");

    assert_eq!(
        unknown.submit().expect_err("unknown scheme"),
        IntentError::UnknownScheme {
            scheme: "unknown".to_string(),
        }
    );
    assert_eq!(
        missing.submit().expect_err("unregistered key"),
        IntentError::DestinationNotFound {
            namespace: Namespace::Router,
            key: "missing".to_string(),
        }
    );
    assert_eq!(harness.screens_built(), 0);
    assert!(harness.host.records().is_empty());

    let snapshot = harness.diagnostics.snapshot();
    assert_eq!(snapshot.channel_count(CHANNEL_INTENT_RESOLVE_FAILED), 2);
    assert_eq!(snapshot.channel_count(CHANNEL_INTENT_DISPATCH_SUCCEEDED), 0);
}

#[test]
fn auto_on_handler_ignores_available_host() {
    let mut harness = ScenarioHarness::new();
    harness
        .ctx
        .register_handler("refresh", |_extra, completion| completion.complete());

    let dispatch = Intent::from_key(&harness.ctx, Namespace::Handler, "refresh", None)
        .submit()
        .expect("refresh should dispatch");

    assert_eq!(dispatch.action(), Action::PerformBlock);
    assert!(harness.host.records().is_empty());
}

#[test]
fn formatted_handler_url_round_trips_through_dispatch() {
    let mut harness = ScenarioHarness::new();
    let received = Arc::new(parking_lot::Mutex::new(None));
    let received_in_handler = received.clone();
    harness.ctx.register_handler("share item", move |extra, completion| {
        *received_in_handler.lock() = extra;
        completion.complete();
    });
    let extra = object(json!({"title": "a & b", "tags": ["x", "y"]}));

    let url = harness
        .ctx
        .handler_url("share item", Some(&extra))
        .expect("url should format");
    Intent::from_url(&harness.ctx, &url)
        .submit()
        .expect("formatted url should dispatch");

    assert_eq!(received.lock().clone(), Some(extra));
}

#[test]
fn shared_context_allows_registration_from_inside_a_handler() {
    let key = "scenario.shared.bootstrap";
    let follow_up = "scenario.shared.follow_up";
    IntentContext::shared()
        .write()
        .register_handler(key, move |_extra, completion| {
            IntentContext::shared()
                .write()
                .register_handler(follow_up, |_extra, completion| completion.complete());
            completion.complete();
        });

    let intent = {
        let ctx = IntentContext::shared().read();
        Intent::from_key(&ctx, Namespace::Handler, key, None)
    };
    let dispatch = intent.submit().expect("bootstrap should dispatch");

    assert!(dispatch.is_done());
    assert!(IntentContext::shared().read().handler(follow_up).is_some());

    let mut ctx = IntentContext::shared().write();
    ctx.unregister_handler(key);
    ctx.unregister_handler(follow_up);
}
