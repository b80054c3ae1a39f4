/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! JSON encode/decode for the `extraData` payload carried by intents.

use serde_json::Value;

use crate::error::IntentError;

/// Invocation parameters handed to a destination.
pub type ExtraData = serde_json::Map<String, Value>;

/// Decodes a JSON document into a payload mapping.
///
/// Anything other than a JSON object is rejected, since destinations read
/// their parameters by name.
pub fn decode_extra_data(raw: &str) -> Result<ExtraData, IntentError> {
    let value: Value = serde_json::from_str(raw).map_err(|error| IntentError::InvalidPayload {
        reason: error.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(IntentError::InvalidPayload {
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

pub fn encode_extra_data(extra: &ExtraData) -> Result<String, IntentError> {
    serde_json::to_string(extra).map_err(|error| IntentError::InvalidPayload {
        reason: error.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
