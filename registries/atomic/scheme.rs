/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::config::ContextConfig;

/// The two independent key spaces of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Screen factories, addressed through the router scheme.
    Router,
    /// Callback handlers, addressed through the handler scheme.
    Handler,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Router => f.write_str("router"),
            Self::Handler => f.write_str("handler"),
        }
    }
}

/// Maps destination-url schemes onto namespaces.
///
/// Matching is exact and case-sensitive. If both schemes are configured to
/// the same string the router namespace wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchemeTable {
    router_scheme: String,
    handler_scheme: String,
}

impl SchemeTable {
    pub(crate) fn new(router_scheme: impl Into<String>, handler_scheme: impl Into<String>) -> Self {
        Self {
            router_scheme: router_scheme.into(),
            handler_scheme: handler_scheme.into(),
        }
    }

    pub(crate) fn from_config(config: &ContextConfig) -> Self {
        Self::new(config.router_scheme(), config.handler_scheme())
    }

    pub(crate) fn router_scheme(&self) -> &str {
        &self.router_scheme
    }

    pub(crate) fn handler_scheme(&self) -> &str {
        &self.handler_scheme
    }

    pub(crate) fn set_router_scheme(&mut self, scheme: impl Into<String>) {
        self.router_scheme = scheme.into();
    }

    pub(crate) fn set_handler_scheme(&mut self, scheme: impl Into<String>) {
        self.handler_scheme = scheme.into();
    }

    pub(crate) fn scheme_for(&self, namespace: Namespace) -> &str {
        match namespace {
            Namespace::Router => &self.router_scheme,
            Namespace::Handler => &self.handler_scheme,
        }
    }

    pub(crate) fn namespace_for(&self, scheme: &str) -> Option<Namespace> {
        if scheme == self.router_scheme {
            return Some(Namespace::Router);
        }
        if scheme == self.handler_scheme {
            return Some(Namespace::Handler);
        }
        None
    }
}

impl Default for SchemeTable {
    fn default() -> Self {
        Self::from_config(&ContextConfig::default())
    }
}
