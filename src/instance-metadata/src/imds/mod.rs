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

//! Constants and a client for the EC2 Instance Metadata Service (IMDS).

use std::time::Duration;

pub(crate) mod client;

pub use client::Client;

pub(crate) const METADATA_ROOT: &str = "http://169.254.169.254";
pub(crate) const METADATA_ENDPOINT_ENV_VAR: &str = "AWS_EC2_METADATA_SERVICE_ENDPOINT";
pub(crate) const API_VERSION: &str = "latest";

pub(crate) const TOKEN_PATH: &str = "api/token";
pub(crate) const TOKEN_HEADER: &str = "x-aws-ec2-metadata-token";
pub(crate) const TOKEN_TTL_HEADER: &str = "x-aws-ec2-metadata-token-ttl-seconds";
pub(crate) const TOKEN_TTL_SECONDS: &str = "21600";

/// The prefix of every path walked by the metadata tree.
pub const METADATA_PREFIX: &str = "meta-data/";
/// The path of the instance identity document, relative to the service root.
pub const IDENTITY_DOCUMENT_PATH: &str = "dynamic/instance-identity/document";

/// Bounds every request, so runs outside EC2 fail fast instead of hanging.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
