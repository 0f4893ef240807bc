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

//! Builds, saves and prints the final document.

use crate::resolver::Resolution;
use crate::tree::MetadataNode;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::path::Path;

/// Where the final document is saved. Prior contents are overwritten.
pub const OUTPUT_FILE: &str = "/tmp/instance_metadata.json";

/// Combines the metadata tree and the identity document.
pub fn combined(metadata: MetadataNode, identity: Value) -> Value {
    let mut document = Map::new();
    document.insert("meta-data".to_string(), Value::from(metadata));
    document.insert("dynamic".to_string(), identity);
    Value::Object(document)
}

/// Picks the final document: the resolved key, or the whole combined document.
pub fn assemble(document: Value, resolution: Option<Resolution>) -> Value {
    match resolution {
        None => document,
        Some(Resolution { key, value }) => {
            let mut output = Map::new();
            output.insert(key, value.unwrap_or(Value::Null));
            Value::Object(output)
        }
    }
}

/// Formats `output` as indented JSON.
pub fn render(output: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(output)?)
}

/// Saves `output` to `path` and returns the text that was written.
pub async fn save(path: &Path, output: &Value) -> Result<String> {
    let contents = render(output)?;
    tokio::fs::write(path, &contents)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("Metadata saved to {}", path.display());
    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    type TestResult = anyhow::Result<()>;

    fn tree() -> MetadataNode {
        let mut placement = MetadataNode::directory();
        placement.insert("region", MetadataNode::Leaf("us-east-1".into()));
        let mut root = MetadataNode::directory();
        root.insert("placement", placement);
        root.insert("ami-id", MetadataNode::Leaf("ami-12345678".into()));
        root
    }

    #[test]
    fn combined_layout() {
        let got = combined(tree(), json!({"error": "test-only"}));
        assert_eq!(
            got,
            json!({
                "meta-data": {
                    "placement": { "region": "us-east-1" },
                    "ami-id": "ami-12345678",
                },
                "dynamic": { "error": "test-only" },
            })
        );
        let keys = got.as_object().unwrap().keys().collect::<Vec<_>>();
        assert_eq!(keys, vec!["meta-data", "dynamic"]);
    }

    #[test]
    fn assemble_full_document() {
        let document = combined(tree(), json!({}));
        assert_eq!(assemble(document.clone(), None), document);
    }

    #[test]
    fn assemble_resolution() {
        let document = combined(tree(), json!({}));
        let got = assemble(
            document.clone(),
            Some(Resolution {
                key: "ami-id".into(),
                value: Some(json!("ami-12345678")),
            }),
        );
        assert_eq!(got, json!({"ami-id": "ami-12345678"}));

        let got = assemble(
            document,
            Some(Resolution {
                key: "instance-id".into(),
                value: None,
            }),
        );
        assert_eq!(got, json!({"instance-id": null}));
    }

    #[test]
    fn render_indents() -> TestResult {
        let got = render(&json!({"b": {"c": "1"}, "a": null}))?;
        assert_eq!(got, "{\n  \"b\": {\n    \"c\": \"1\"\n  },\n  \"a\": null\n}");
        Ok(())
    }

    #[tokio::test]
    async fn save_overwrites() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("instance_metadata.json");
        std::fs::write(&path, "previous contents that are longer than the new ones")?;

        let output = json!({"ami-id": "ami-12345678"});
        let got = save(&path, &output).await?;
        assert_eq!(got, render(&output)?);
        assert_eq!(std::fs::read_to_string(&path)?, got);
        Ok(())
    }

    #[tokio::test]
    async fn save_unwritable_path() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("no-such-dir").join("out.json");
        let err = save(&path, &json!({})).await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }), "{err:?}");
        assert!(err.to_string().contains("no-such-dir"), "{err}");
        Ok(())
    }
}
