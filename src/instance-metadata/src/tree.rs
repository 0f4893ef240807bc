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

//! Walks the `meta-data/` tree of the metadata service.
//!
//! The service describes directories as plain text: one entry per line, and
//! entries ending in `/` are subdirectories. Anything that does not look like
//! a listing is a leaf value.

use crate::imds::{Client, METADATA_PREFIX};
use crate::token::Token;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

const SEPARATOR: char = '/';

/// A node in the metadata tree.
#[derive(Clone, Debug, PartialEq)]
pub enum MetadataNode {
    /// A leaf value, with surrounding whitespace removed.
    Leaf(String),
    /// A directory. Entries keep the order of the listing, keys are unique.
    Directory(Vec<(String, MetadataNode)>),
}

impl MetadataNode {
    /// Creates an empty directory.
    pub fn directory() -> Self {
        MetadataNode::Directory(Vec::new())
    }

    /// Adds `node` under `key`.
    ///
    /// A repeated key keeps its original position and takes the new value.
    /// Does nothing on a leaf.
    pub fn insert<K: Into<String>>(&mut self, key: K, node: MetadataNode) {
        let MetadataNode::Directory(entries) = self else {
            return;
        };
        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = node,
            None => entries.push((key, node)),
        }
    }

    /// Returns the child stored under `key`, if this is a directory.
    pub fn get(&self, key: &str) -> Option<&MetadataNode> {
        match self {
            MetadataNode::Leaf(_) => None,
            MetadataNode::Directory(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
        }
    }

    /// Returns the value if this is a leaf.
    pub fn as_leaf(&self) -> Option<&str> {
        match self {
            MetadataNode::Leaf(v) => Some(v),
            MetadataNode::Directory(_) => None,
        }
    }
}

impl Serialize for MetadataNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetadataNode::Leaf(v) => serializer.serialize_str(v),
            MetadataNode::Directory(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

impl From<MetadataNode> for Value {
    fn from(node: MetadataNode) -> Self {
        match node {
            MetadataNode::Leaf(v) => Value::String(v),
            MetadataNode::Directory(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Returns true if `text` is a directory listing rather than a leaf value.
///
/// A single line that does not end in `/` is always a leaf.
pub fn is_listing(text: &str) -> bool {
    text.contains('\n') || text.ends_with(SEPARATOR)
}

/// Splits a listing into `(key, path segment)` pairs.
///
/// Subdirectory keys drop the trailing `/`, their path segment keeps it.
/// Blank lines are skipped, they would otherwise point back at the listing
/// itself.
pub fn listing_entries(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| (entry.trim_end_matches(SEPARATOR), entry))
}

/// Fetches `meta-data/{prefix}` and everything below it.
///
/// Fetches run one after the other, in listing order. A failed fetch becomes
/// an `"Error: ..."` leaf and the walk continues with the next entry.
pub async fn walk(client: &Client, prefix: &str, token: Option<&Token>) -> MetadataNode {
    let path = format!("{METADATA_PREFIX}{prefix}");
    let text = match client.try_get(&path, token).await {
        Ok(text) => text,
        Err(e) => return MetadataNode::Leaf(e.in_band()),
    };
    if !is_listing(&text) {
        return MetadataNode::Leaf(text);
    }

    let mut directory = MetadataNode::directory();
    for (key, segment) in listing_entries(&text) {
        let child = Box::pin(walk(client, &format!("{prefix}{segment}"), token)).await;
        directory.insert(key, child);
    }
    directory
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{Expectation, Server, matchers::*, responders::*};
    use serde_json::json;
    use serial_test::parallel;
    use test_case::test_case;

    fn test_client(server: &Server) -> Client {
        Client::new(Some(format!("http://{}", server.addr()))).unwrap()
    }

    fn expect_get(server: &Server, path: &str, body: &'static str) {
        server.expect(
            Expectation::matching(all_of![
                request::method("GET"),
                request::path(format!("/latest/meta-data/{path}")),
            ])
            .respond_with(status_code(200).body(body)),
        );
    }

    #[test_case("i-0123456789abcdef0", false; "single line")]
    #[test_case("placement/", true; "single subdirectory")]
    #[test_case("ami-id\ninstance-id", true; "multiple lines")]
    #[test_case("0=my-key", false; "single entry without separator")]
    #[test_case("a/b", false; "separator in the middle")]
    fn listing_heuristic(text: &str, want: bool) {
        assert_eq!(is_listing(text), want, "{text:?}");
    }

    #[test]
    fn listing_entries_split() {
        let got = listing_entries("ami-id\n  placement/ \n\nnetwork/\r\nhostname").collect::<Vec<_>>();
        assert_eq!(
            got,
            vec![
                ("ami-id", "ami-id"),
                ("placement", "placement/"),
                ("network", "network/"),
                ("hostname", "hostname"),
            ]
        );
    }

    #[test]
    fn insert_keeps_first_position() {
        let mut dir = MetadataNode::directory();
        dir.insert("a", MetadataNode::Leaf("1".into()));
        dir.insert("b", MetadataNode::Leaf("2".into()));
        dir.insert("a", MetadataNode::Leaf("3".into()));
        assert_eq!(
            dir,
            MetadataNode::Directory(vec![
                ("a".into(), MetadataNode::Leaf("3".into())),
                ("b".into(), MetadataNode::Leaf("2".into())),
            ])
        );

        let mut leaf = MetadataNode::Leaf("x".into());
        leaf.insert("a", MetadataNode::Leaf("1".into()));
        assert_eq!(leaf, MetadataNode::Leaf("x".into()));
    }

    #[test]
    fn serialize_keeps_order() -> anyhow::Result<()> {
        let mut dir = MetadataNode::directory();
        dir.insert("zone", MetadataNode::Leaf("us-east-1a".into()));
        dir.insert("region", MetadataNode::Leaf("us-east-1".into()));
        let got = serde_json::to_string(&dir)?;
        assert_eq!(got, r#"{"zone":"us-east-1a","region":"us-east-1"}"#);
        assert_eq!(
            Value::from(dir),
            json!({"zone": "us-east-1a", "region": "us-east-1"})
        );
        Ok(())
    }

    #[tokio::test]
    #[parallel]
    async fn walk_leaf() {
        let server = Server::run();
        expect_get(&server, "instance-id", "  i-0123456789abcdef0 \n");

        let client = test_client(&server);
        let got = walk(&client, "instance-id", None).await;
        assert_eq!(got, MetadataNode::Leaf("i-0123456789abcdef0".into()));
    }

    #[tokio::test]
    #[parallel]
    async fn walk_tree() {
        let server = Server::run();
        expect_get(&server, "", "ami-id\nplacement/\n");
        expect_get(&server, "ami-id", "ami-12345678");
        expect_get(&server, "placement/", "availability-zone\nregion");
        expect_get(&server, "placement/availability-zone", "us-east-1a");
        expect_get(&server, "placement/region", "us-east-1");

        let client = test_client(&server);
        let got = walk(&client, "", None).await;
        assert_eq!(
            Value::from(got.clone()),
            json!({
                "ami-id": "ami-12345678",
                "placement": {
                    "availability-zone": "us-east-1a",
                    "region": "us-east-1",
                },
            })
        );
        assert!(matches!(got.get("placement"), Some(MetadataNode::Directory(_))));
    }

    #[tokio::test]
    #[parallel]
    async fn walk_single_subdirectory() {
        let server = Server::run();
        expect_get(&server, "", "public-keys/");
        expect_get(&server, "public-keys/", "0=my-key");

        let client = test_client(&server);
        let got = walk(&client, "", None).await;
        // The single-line listing `0=my-key` is a leaf, not a directory.
        assert_eq!(
            Value::from(got),
            json!({"public-keys": "0=my-key"})
        );
    }

    #[tokio::test]
    #[parallel]
    async fn walk_multiline_leaf_is_directory() {
        let server = Server::run();
        expect_get(&server, "user-data", "line-1\nline-2");
        expect_get(&server, "user-dataline-1", "one");
        expect_get(&server, "user-dataline-2", "two");

        let client = test_client(&server);
        let got = walk(&client, "user-data", None).await;
        assert_eq!(Value::from(got), json!({"line-1": "one", "line-2": "two"}));
    }

    #[tokio::test]
    #[parallel]
    async fn walk_error_becomes_leaf() {
        let server = Server::run();
        expect_get(&server, "", "ami-id\nhostname");
        expect_get(&server, "ami-id", "ami-12345678");
        server.expect(
            Expectation::matching(request::path("/latest/meta-data/hostname"))
                .respond_with(status_code(404)),
        );

        let client = test_client(&server);
        let got = walk(&client, "", None).await;
        assert_eq!(
            got.get("ami-id").and_then(MetadataNode::as_leaf),
            Some("ami-12345678")
        );
        let hostname = got.get("hostname").and_then(MetadataNode::as_leaf).unwrap();
        assert!(hostname.starts_with("Error: "), "{hostname}");
    }

    #[tokio::test]
    #[parallel]
    async fn walk_forwards_token() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::path("/latest/meta-data/"),
                request::headers(contains(("x-aws-ec2-metadata-token", "test-token"))),
            ])
            .respond_with(status_code(200).body("ami-id\nplacement/\n")),
        );
        server.expect(
            Expectation::matching(all_of![
                request::path("/latest/meta-data/ami-id"),
                request::headers(contains(("x-aws-ec2-metadata-token", "test-token"))),
            ])
            .respond_with(status_code(200).body("ami-12345678")),
        );
        server.expect(
            Expectation::matching(all_of![
                request::path("/latest/meta-data/placement/"),
                request::headers(contains(("x-aws-ec2-metadata-token", "test-token"))),
            ])
            .respond_with(status_code(200).body("region")),
        );

        let client = test_client(&server);
        let token = Token::new("test-token");
        let got = walk(&client, "", Some(&token)).await;
        assert_eq!(
            Value::from(got),
            json!({"ami-id": "ami-12345678", "placement": "region"})
        );
    }
}
