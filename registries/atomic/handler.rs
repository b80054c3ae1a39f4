/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::collections::HashMap;
use std::sync::Arc;

use crate::codec::ExtraData;
use crate::intent::Completion;

/// A named callback. It receives the payload and a completion signal that it
/// must fire when its own work is finished.
pub type HandlerFn = Arc<dyn Fn(Option<ExtraData>, Completion) + Send + Sync>;

#[derive(Clone, Default)]
pub(crate) struct HandlerRegistry {
    handlers: HashMap<String, HandlerFn>,
}

impl HandlerRegistry {
    /// Inserts or replaces the handler for `key`. Returns `true` on replace.
    pub(crate) fn register(&mut self, key: &str, handler: HandlerFn) -> bool {
        self.handlers.insert(key.to_string(), handler).is_some()
    }

    pub(crate) fn unregister(&mut self, key: &str) -> bool {
        self.handlers.remove(key).is_some()
    }

    pub(crate) fn get(&self, key: &str) -> Option<HandlerFn> {
        self.handlers.get(key).cloned()
    }

    pub(crate) fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.handlers.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
