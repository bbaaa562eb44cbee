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

//! Validation errors for round and sample payloads

use thiserror::Error;

/// Reasons a training round or metrics snapshot is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("round_id must not be empty")]
    EmptyRoundId,

    #[error("client_id must not be empty")]
    EmptyClientId,

    #[error("round {0} has no client metrics")]
    NoClients(String),

    /// A client reported more than one snapshot in the same round
    #[error("client {client_id} appears more than once in round {round_id}")]
    DuplicateClient { round_id: String, client_id: String },

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}
