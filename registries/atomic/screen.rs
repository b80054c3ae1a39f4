/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::ExtraData;
use crate::intent::Action;

/// A navigable destination.
///
/// Every screen owns a settable `extraData` slot; the dispatcher fills it
/// before handing the screen to the navigation host.
pub trait Screen {
    fn screen_id(&self) -> &str;

    fn extra_data(&self) -> Option<&ExtraData>;

    fn set_extra_data(&mut self, extra: Option<ExtraData>);

    /// Action this screen wants when the intent leaves the choice to `Auto`.
    fn preferred_action(&self) -> Option<Action> {
        None
    }
}

/// Builds a fresh screen for every dispatch. Instances are never reused.
pub type ScreenFactory = Arc<dyn Fn() -> Box<dyn Screen> + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct ScreenRegistry {
    factories: HashMap<String, ScreenFactory>,
}

impl ScreenRegistry {
    /// Inserts or replaces the factory for `key`. Returns `true` on replace.
    pub(crate) fn register(&mut self, key: &str, factory: ScreenFactory) -> bool {
        self.factories.insert(key.to_string(), factory).is_some()
    }

    pub(crate) fn unregister(&mut self, key: &str) -> bool {
        self.factories.remove(key).is_some()
    }

    pub(crate) fn get(&self, key: &str) -> Option<ScreenFactory> {
        self.factories.get(key).cloned()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.factories.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for ScreenRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestScreen;

    #[test]
    fn register_replaces_existing_factory() {
        let mut registry = ScreenRegistry::default();
        assert!(!registry.register("profile", TestScreen::factory("first")));
        assert!(registry.register("profile", TestScreen::factory("second")));

        let factory = registry.get("profile").expect("profile should be registered");
        assert_eq!(factory().screen_id(), "second");
        assert_eq!(registry.keys().len(), 1);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = ScreenRegistry::default();
        registry.register("profile", TestScreen::factory("profile"));

        assert!(registry.unregister("profile"));
        assert!(!registry.unregister("profile"));
        assert!(registry.get("profile").is_none());
    }

    #[test]
    fn factory_builds_a_fresh_instance_each_call() {
        let mut registry = ScreenRegistry::default();
        registry.register("profile", TestScreen::factory("profile"));
        let factory = registry.get("profile").expect("registered");

        let mut first = factory();
        first.set_extra_data(Some(ExtraData::new()));
        let second = factory();

        assert!(first.extra_data().is_some());
        assert!(second.extra_data().is_none());
    }

    #[test]
    fn empty_key_is_accepted() {
        let mut registry = ScreenRegistry::default();
        registry.register("", TestScreen::factory("blank"));
        assert_eq!(registry.keys(), vec![String::new()]);
    }
}
