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

use crate::Result;
use crate::token::Token;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde_json::{Value, json};

/// A client for the EC2 Instance Metadata Service (IMDS).
///
/// Every request is bounded by a short timeout. The client never retries,
/// callers decide whether a failure becomes an error or an in-band value.
#[derive(Clone, Debug)]
pub struct Client {
    endpoint: String,
    inner: ReqwestClient,
}

impl Client {
    /// Creates a new client for the metadata service.
    ///
    /// The `AWS_EC2_METADATA_SERVICE_ENDPOINT` environment variable takes
    /// precedence over `endpoint_override`.
    pub fn new(endpoint_override: Option<String>) -> Result<Self> {
        let endpoint = Self::resolve_endpoint(endpoint_override);
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let inner = ReqwestClient::builder()
            .timeout(super::REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { endpoint, inner })
    }

    fn resolve_endpoint(endpoint_override: Option<String>) -> String {
        if let Ok(endpoint) = std::env::var(super::METADATA_ENDPOINT_ENV_VAR) {
            endpoint
        } else if let Some(e) = endpoint_override {
            e
        } else {
            super::METADATA_ROOT.to_string()
        }
    }

    /// The service root, all request paths are relative to it.
    pub fn base_url(&self) -> String {
        format!("{}/{}", self.endpoint, super::API_VERSION)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url(), path)
    }

    /// Creates a GET request, attaching the session token if there is one.
    fn get(&self, path: &str, token: Option<&Token>) -> RequestBuilder {
        tracing::debug!("GET {path}");
        let request = self.inner.get(self.url(path));
        token
            .into_iter()
            .fold(request, |r, t| r.header(super::TOKEN_HEADER, t.as_str()))
    }

    /// Requests a new session token.
    pub async fn try_token(&self) -> Result<Token> {
        let response = self
            .inner
            .put(self.url(super::TOKEN_PATH))
            .header(super::TOKEN_TTL_HEADER, super::TOKEN_TTL_SECONDS)
            .send()
            .await?
            .error_for_status()?;
        let token = response.text().await?;
        Ok(Token::new(token))
    }

    /// Requests a new session token, reporting failures on stderr.
    ///
    /// Returns `None` if the token cannot be obtained. Subsequent reads then
    /// go out without the token header.
    pub async fn token(&self) -> Option<Token> {
        match self.try_token().await {
            Ok(token) => Some(token),
            Err(e) => {
                eprintln!("Failed to get token: {e}");
                None
            }
        }
    }

    /// Fetches `path` and returns the response body with surrounding
    /// whitespace removed.
    pub async fn try_get(&self, path: &str, token: Option<&Token>) -> Result<String> {
        let response = self.get(path, token).send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(text.trim().to_string())
    }

    /// Fetches `path`, converting any failure into an `"Error: ..."` value.
    ///
    /// The result of a failed fetch cannot be told apart from a real value
    /// starting with `Error:`. Use [try_get][Client::try_get] when that
    /// matters.
    pub async fn get_value(&self, path: &str, token: Option<&Token>) -> String {
        self.try_get(path, token).await.unwrap_or_else(|e| e.in_band())
    }

    /// Fetches and parses the instance identity document.
    pub async fn try_identity_document(&self, token: Option<&Token>) -> Result<Value> {
        let response = self
            .get(super::IDENTITY_DOCUMENT_PATH, token)
            .send()
            .await?
            .error_for_status()?;
        let document = response.json::<Value>().await?;
        Ok(document)
    }

    /// Fetches the instance identity document.
    ///
    /// On failure this returns `{"error": "<description>"}`, so callers always
    /// have a document to merge.
    pub async fn identity_document(&self, token: Option<&Token>) -> Value {
        match self.try_identity_document(token).await {
            Ok(document) => document,
            Err(e) => json!({ "error": e.to_string() }),
        }
    }
}
