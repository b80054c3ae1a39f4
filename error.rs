/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use crate::intent::Action;
use crate::registries::Namespace;

/// Failure kinds for resolution and dispatch.
///
/// None of these are fatal to the owning context: a failed lookup or
/// dispatch leaves the registries untouched and is reported once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    MalformedUrl { url: String },
    UnknownScheme { scheme: String },
    MissingKey,
    InvalidPayload { reason: String },
    DestinationNotFound { namespace: Namespace, key: String },
    NoNavigationHost,
    HandlerMissing,
    UnsupportedAction { action: Action, namespace: Namespace },
}

impl std::fmt::Display for IntentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedUrl { url } => write!(f, "malformed destination url '{url}'"),
            Self::UnknownScheme { scheme } => write!(f, "unknown destination scheme '{scheme}'"),
            Self::MissingKey => write!(f, "destination url has an empty key"),
            Self::InvalidPayload { reason } => write!(f, "invalid extraData payload: {reason}"),
            Self::DestinationNotFound { namespace, key } => {
                write!(f, "no {namespace} destination registered for key '{key}'")
            }
            Self::NoNavigationHost => write!(f, "no usable navigation host for dispatch"),
            Self::HandlerMissing => write!(f, "destination has no handler to perform"),
            Self::UnsupportedAction { action, namespace } => {
                write!(f, "action {action:?} is not supported for {namespace} destinations")
            }
        }
    }
}

impl std::error::Error for IntentError {}

impl IntentError {
    /// Stable short name, used as the diagnostics payload for failures.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedUrl { .. } => "malformed_url",
            Self::UnknownScheme { .. } => "unknown_scheme",
            Self::MissingKey => "missing_key",
            Self::InvalidPayload { .. } => "invalid_payload",
            Self::DestinationNotFound { .. } => "destination_not_found",
            Self::NoNavigationHost => "no_navigation_host",
            Self::HandlerMissing => "handler_missing",
            Self::UnsupportedAction { .. } => "unsupported_action",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_not_found_display_names_namespace_and_key() {
        let error = IntentError::DestinationNotFound {
            namespace: Namespace::Router,
            key: "missing".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "no router destination registered for key 'missing'"
        );
        assert_eq!(error.kind(), "destination_not_found");
    }
}
