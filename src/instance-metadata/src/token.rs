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

//! The session token used to authorize reads from the metadata service.

/// A short-lived session token returned by `PUT /api/token`.
///
/// The token is fetched once per run and never refreshed or persisted. It is
/// only used as the value of the token header on subsequent reads.
#[derive(Clone, PartialEq)]
pub struct Token {
    token: String,
}

impl Token {
    pub(crate) fn new<T: Into<String>>(token: T) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The token value, as sent in the token header.
    pub fn as_str(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("token", &"[censored]")
            .finish()
    }
}
