// Copyright 2025 Fedboard Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Storage error types

use fedboard_core::ValidationError;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A round with this id already exists
    #[error("round already exists: {0}")]
    Conflict(String),

    /// The document failed schema validation
    #[error("invalid document: {0}")]
    Invalid(#[from] ValidationError),

    /// The backing log could not be read or written
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backing log exists but is not a log this crate wrote
    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("invalid store uri: {0}")]
    InvalidUri(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
