// Copyright 2026 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Narrows the combined document down to a single key.
//!
//! A key expression is split on `.`. A single segment is searched for in the
//! combined document. Several segments are a path, fetched directly from the
//! service root.

use crate::imds::{Client, IDENTITY_DOCUMENT_PATH};
use crate::token::Token;
use serde_json::Value;

const DYNAMIC: &str = "dynamic";

/// Printed on stderr whenever a key expression is resolved as a path.
pub const PATH_ADVISORY: &str =
    "NOTE: If the intended result is not published, try only single key instead of full path";

/// The outcome of resolving a key expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The key used in the output document.
    ///
    /// This is the expression itself for single segments, and the segments
    /// joined with `/` for paths.
    pub key: String,
    /// The resolved value, `None` if the key was not found.
    pub value: Option<Value>,
}

impl Resolution {
    /// Returns true if the key was not found.
    pub fn is_missing(&self) -> bool {
        self.value.as_ref().is_none_or(Value::is_null)
    }
}

/// Searches `value` depth-first for a mapping key equal to `key`.
///
/// Mapping entries are visited in insertion order and each value is searched
/// before moving on to the next sibling. Array elements are visited in index
/// order. A direct match is returned as is, even if it is `null`. A `null`
/// found deeper down does not stop the search.
pub fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key {
                    return Some(v);
                }
                if let Some(found) = find_key(v, key).filter(|f| !f.is_null()) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_key(item, key).filter(|f| !f.is_null())),
        _ => None,
    }
}

/// Resolves `expression` against `document`, the combined document.
///
/// Paths starting with `dynamic` are not resolved segment by segment. They
/// return the whole identity document, as text.
pub async fn resolve(
    client: &Client,
    token: Option<&Token>,
    expression: &str,
    document: &Value,
) -> Resolution {
    let segments = expression.split('.').collect::<Vec<_>>();
    let resolution = match segments.as_slice() {
        [key] => Resolution {
            key: key.to_string(),
            value: find_key(document, key).cloned(),
        },
        [first, ..] => {
            let path = segments.join("/");
            let fetch = if *first == DYNAMIC {
                IDENTITY_DOCUMENT_PATH
            } else {
                path.as_str()
            };
            let value = client.get_value(fetch, token).await;
            eprintln!("{PATH_ADVISORY}");
            Resolution {
                key: path,
                value: Some(Value::String(value)),
            }
        }
        // `split()` always yields at least one segment.
        [] => Resolution {
            key: String::new(),
            value: None,
        },
    };

    tracing::info!("Searching for key: {} in combined JSON", resolution.key);
    if resolution.is_missing() {
        tracing::warn!(
            "Key '{}' not found in metadata or dynamic document",
            resolution.key
        );
    }
    resolution
}
