/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Destination urls: `<scheme>://<key>?extraData=<url-encoded json>`.
//!
//! The scheme picks the namespace, the host is the registry key and the
//! optional `extraData` query parameter carries the JSON payload. Path,
//! fragment and other query parameters are ignored.

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use url::Url;

use crate::codec::{ExtraData, decode_extra_data, encode_extra_data};
use crate::error::IntentError;
use crate::registries::atomic::SchemeTable;
use crate::registries::{HandlerFn, Namespace, ScreenFactory};

pub const EXTRA_DATA_PARAM: &str = "extraData";

/// Characters escaped when a key is written into the host component.
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b':')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in the `extraData` value; `+` is escaped so it is
/// never read back as a form-encoded space.
const PAYLOAD_ENCODE_SET: &AsciiSet = &KEY_ENCODE_SET.add(b'&').add(b'+').add(b'=');

/// A resolved registry entry.
#[derive(Clone)]
pub enum Destination {
    Screen(ScreenFactory),
    Handler(HandlerFn),
}

impl Destination {
    pub fn namespace(&self) -> Namespace {
        match self {
            Self::Screen(_) => Namespace::Router,
            Self::Handler(_) => Namespace::Handler,
        }
    }
}

impl std::fmt::Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Screen(_) => f.write_str("Destination::Screen(..)"),
            Self::Handler(_) => f.write_str("Destination::Handler(..)"),
        }
    }
}

/// The syntactic parts of a destination url.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub namespace: Namespace,
    pub key: String,
    pub extra_data: Option<ExtraData>,
}

/// A parsed url whose key was found in the registry.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub namespace: Namespace,
    pub key: String,
    pub destination: Destination,
    pub extra_data: Option<ExtraData>,
}

pub(crate) fn parse_url(schemes: &SchemeTable, raw: &str) -> Result<ParsedUrl, IntentError> {
    let malformed = || IntentError::MalformedUrl {
        url: raw.to_string(),
    };

    // `Url` lowercases schemes, so the raw prefix is what gets matched.
    let Some((scheme, rest)) = raw.split_once(':') else {
        return Err(malformed());
    };
    if scheme.is_empty() || !rest.starts_with("//") {
        return Err(malformed());
    }
    let parsed = Url::parse(raw).map_err(|_| malformed())?;

    let namespace = schemes
        .namespace_for(scheme)
        .ok_or_else(|| IntentError::UnknownScheme {
            scheme: scheme.to_string(),
        })?;

    let host = parsed.host_str().unwrap_or_default();
    if host.is_empty() {
        return Err(IntentError::MissingKey);
    }
    let key = percent_decode_str(host)
        .decode_utf8()
        .map_err(|_| malformed())?
        .into_owned();

    let extra_data = parsed
        .query()
        .and_then(extra_data_value)
        .map(|value| {
            let json = percent_decode_str(value).decode_utf8().map_err(|error| {
                IntentError::InvalidPayload {
                    reason: error.to_string(),
                }
            })?;
            decode_extra_data(&json)
        })
        .transpose()?;

    Ok(ParsedUrl {
        namespace,
        key,
        extra_data,
    })
}

/// Raw value of the first `extraData` pair. `+` is kept as a literal plus.
fn extra_data_value(query: &str) -> Option<&str> {
    query.split('&').find_map(|pair| {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        (name == EXTRA_DATA_PARAM).then_some(value)
    })
}

/// Builds a destination url that parses back to `key` and `extra`.
pub fn format_url(
    scheme: &str,
    key: &str,
    extra: Option<&ExtraData>,
) -> Result<String, IntentError> {
    if scheme.is_empty() {
        return Err(IntentError::MalformedUrl {
            url: format!("://{key}"),
        });
    }
    if key.is_empty() {
        return Err(IntentError::MissingKey);
    }

    let mut url = format!("{scheme}://{}", utf8_percent_encode(key, KEY_ENCODE_SET));
    if let Some(extra) = extra {
        let json = encode_extra_data(extra)?;
        url.push('?');
        url.push_str(EXTRA_DATA_PARAM);
        url.push('=');
        url.extend(utf8_percent_encode(&json, PAYLOAD_ENCODE_SET));
    }
    Ok(url)
}
