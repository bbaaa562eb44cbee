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

//! Query error taxonomy

use fedboard_storage::StoreError;
use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

/// Failure classes surfaced to the API layer.
///
/// Store failures are always mapped to one of these; raw store text is kept
/// for logs only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// The backing store could not be reached or read
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl QueryError {
    /// Whether the caller may retry the same request later
    pub fn is_transient(&self) -> bool {
        matches!(self, QueryError::StoreUnavailable(_))
    }
}

impl From<StoreError> for QueryError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(round_id) => {
                QueryError::Conflict(format!("round {} already exists", round_id))
            }
            StoreError::Invalid(reason) => QueryError::Validation(reason.to_string()),
            StoreError::InvalidUri(reason) => QueryError::Validation(reason),
            StoreError::Unavailable(_) | StoreError::Corrupt(_) | StoreError::Serialization(_) => {
                tracing::error!(error = %e, "Round store failure");
                QueryError::StoreUnavailable(e.to_string())
            }
        }
    }
}
