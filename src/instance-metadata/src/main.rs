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

const DESCRIPTION: &str = concat!(
    "Fetches all the instance metadata and the dynamic instance identity document,",
    " or a single key from them. The result is printed and saved to",
    " /tmp/instance_metadata.json.\n\n",
    "The KEY can be:\n",
    "  - a metadata key, e.g. `instance-id`\n",
    "  - a key from the dynamic identity document, e.g. `accountId`\n",
    "  - a full path, e.g. `meta-data.placement.availability-zone`\n",
    "Paths starting with `dynamic.` return the whole identity document."
);

const EXAMPLES: &str = concat!(
    "Examples:\n",
    "  # Fetch all metadata\n",
    "  instance-metadata\n\n",
    "  # Fetch instance ID\n",
    "  instance-metadata instance-id\n\n",
    "  # Fetch accountId from dynamic document\n",
    "  instance-metadata accountId\n\n",
    "  # Fetch using full path\n",
    "  instance-metadata meta-data.public-ipv4"
);

use clap::Parser;
use instance_metadata::imds::Client;
use instance_metadata::output;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    enable_tracing();

    let args = Args::parse();
    tracing::debug!("{args:?}");

    let client = Client::new(None)?;
    let document = instance_metadata::collect(&client, args.key.as_deref()).await;
    let contents = output::save(Path::new(output::OUTPUT_FILE), &document).await?;
    println!("{contents}");
    Ok(())
}

fn enable_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Dump or query the metadata of an EC2 instance.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION, after_help = EXAMPLES)]
struct Args {
    /// The key to fetch, use `.` to separate path segments.
    ///
    /// Fetches everything if omitted or empty.
    key: Option<String>,
}
