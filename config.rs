/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Context configuration: application id and the two destination schemes.

use std::env;

use log::warn;
use serde::Deserialize;

pub const DEFAULT_APP_ID: &str = "com.app";
pub const ROUTER_SCHEME_SUFFIX: &str = ".router";
pub const HANDLER_SCHEME_SUFFIX: &str = ".func";

pub const ENV_APP_ID: &str = "INTENT_ROUTER_APP_ID";
pub const ENV_ROUTER_SCHEME: &str = "INTENT_ROUTER_ROUTER_SCHEME";
pub const ENV_HANDLER_SCHEME: &str = "INTENT_ROUTER_HANDLER_SCHEME";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    pub app_id: String,
    /// Overrides `<app_id>.router` when set.
    pub router_scheme: Option<String>,
    /// Overrides `<app_id>.func` when set.
    pub handler_scheme: Option<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self::for_app(DEFAULT_APP_ID)
    }
}

impl ContextConfig {
    pub fn for_app(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            router_scheme: None,
            handler_scheme: None,
        }
    }

    pub fn router_scheme(&self) -> String {
        self.router_scheme
            .clone()
            .unwrap_or_else(|| format!("{}{ROUTER_SCHEME_SUFFIX}", self.app_id))
    }

    pub fn handler_scheme(&self) -> String {
        self.handler_scheme
            .clone()
            .unwrap_or_else(|| format!("{}{HANDLER_SCHEME_SUFFIX}", self.app_id))
    }

    /// Reads the configuration from the process environment, falling back to
    /// [`DEFAULT_APP_ID`] and the derived schemes.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(app_id) = non_blank_env(ENV_APP_ID) {
            config.app_id = app_id;
        }
        config.router_scheme = non_blank_env(ENV_ROUTER_SCHEME);
        config.handler_scheme = non_blank_env(ENV_HANDLER_SCHEME);
        config
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

fn non_blank_env(key: &str) -> Option<String> {
    let Ok(value) = env::var(key) else {
        return None;
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        warn!("{key} is set but blank; using the default");
        return None;
    }
    Some(trimmed.to_string())
}
