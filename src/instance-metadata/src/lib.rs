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

//! Dump or query the metadata of an EC2 instance.
//!
//! The [EC2 Instance Metadata Service] (IMDS) exposes the configuration of an
//! instance as a tree of plain text listings. This crate requests a session
//! token, walks the `meta-data/` tree, fetches the instance identity document,
//! and optionally narrows the result to a single key.
//!
//! Fetch failures do not stop a run. They are recorded inside the document as
//! `"Error: ..."` values, or as `{"error": "..."}` for the identity document.
//!
//! ```no_run
//! # async fn sample() -> instance_metadata::Result<()> {
//! use instance_metadata::imds::Client;
//! let client = Client::new(None)?;
//! let output = instance_metadata::collect(&client, Some("instance-id")).await;
//! println!("{}", instance_metadata::output::render(&output)?);
//! # Ok(()) }
//! ```
//!
//! [EC2 Instance Metadata Service]: https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/instancedata-data-retrieval.html

pub mod errors;
pub mod imds;
pub mod output;
pub mod resolver;
pub mod token;
pub mod tree;

pub use errors::Error;

/// A `Result` alias where the `Err` case is [Error].
pub type Result<T> = std::result::Result<T, Error>;

/// Runs every fetch and returns the final document.
///
/// Without a key this is `{"meta-data": ..., "dynamic": ...}`. With a key it
/// is a single `{key: value}` mapping, see [resolver::resolve].
pub async fn collect(client: &imds::Client, key: Option<&str>) -> serde_json::Value {
    let token = client.token().await;
    let token = token.as_ref();

    let metadata = tree::walk(client, "", token).await;
    let identity = client.identity_document(token).await;
    let document = output::combined(metadata, identity);

    let resolution = match key.filter(|k| !k.is_empty()) {
        Some(key) => Some(resolver::resolve(client, token, key, &document).await),
        None => {
            tracing::info!("No specific key provided. Fetching full metadata");
            None
        }
    };
    output::assemble(document, resolution)
}
