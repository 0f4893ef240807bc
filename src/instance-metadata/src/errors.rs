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

use std::path::PathBuf;

/// Represents an error talking to the metadata service or writing the result.
///
/// Most fetch failures never surface as this type. The tool converts them into
/// in-band values (`"Error: ..."` strings and `{"error": "..."}` markers) so it
/// always produces a document. The type is still exposed through the `try_*`
/// functions, which lets callers tell a failure apart from a real value.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request could not be sent, timed out, returned a non-success
    /// status, or its body could not be decoded.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The output document could not be serialized.
    #[error("cannot serialize output document: {0}")]
    Serde(#[from] serde_json::Error),

    /// The output document could not be written.
    #[error("cannot write output to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if the error was caused by a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }

    /// Returns the HTTP status code, if the service replied with a non-success
    /// status.
    pub fn http_status(&self) -> Option<http::StatusCode> {
        match self {
            Error::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Formats the error the way fetch failures appear inside the output
    /// document.
    pub fn in_band(&self) -> String {
        format!("Error: {self}")
    }
}
