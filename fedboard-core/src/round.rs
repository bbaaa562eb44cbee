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

//! Training rounds
//!
//! A [`TrainingRound`] is written once with its complete client list and is
//! never mutated afterwards. Rounds are totally ordered by
//! [`TrainingRound::recency_cmp`]: `created_at` first, then `round_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::{Metrics, ValidationError};

/// One client's metrics snapshot inside a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMetrics {
    pub client_id: String,
    pub metrics: Metrics,
}

impl ClientMetrics {
    pub fn new(client_id: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            client_id: client_id.into(),
            metrics,
        }
    }
}

/// One completed federated training round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRound {
    pub round_id: String,
    pub created_at: DateTime<Utc>,
    pub clients: Vec<ClientMetrics>,
}

impl TrainingRound {
    pub fn new(
        round_id: impl Into<String>,
        created_at: DateTime<Utc>,
        clients: Vec<ClientMetrics>,
    ) -> Self {
        Self {
            round_id: round_id.into(),
            created_at,
            clients,
        }
    }

    /// The snapshot reported by `client_id`, if it took part in this round
    pub fn client(&self, client_id: &str) -> Option<&ClientMetrics> {
        self.clients.iter().find(|c| c.client_id == client_id)
    }

    pub fn contains_client(&self, client_id: &str) -> bool {
        self.client(client_id).is_some()
    }

    /// Total order used for "latest" and "best" queries.
    ///
    /// `Greater` means `self` is more recent than `other`.
    pub fn recency_cmp(&self, other: &Self) -> Ordering {
        self.created_at
            .cmp(&other.created_at)
            .then_with(|| self.round_id.cmp(&other.round_id))
    }

    /// Checks the per-document invariants: a non-empty id, at least one
    /// client, unique non-empty client ids and in-range metrics.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.round_id.trim().is_empty() {
            return Err(ValidationError::EmptyRoundId);
        }
        if self.clients.is_empty() {
            return Err(ValidationError::NoClients(self.round_id.clone()));
        }

        let mut seen = HashSet::with_capacity(self.clients.len());
        for entry in &self.clients {
            if entry.client_id.trim().is_empty() {
                return Err(ValidationError::EmptyClientId);
            }
            if !seen.insert(entry.client_id.as_str()) {
                return Err(ValidationError::DuplicateClient {
                    round_id: self.round_id.clone(),
                    client_id: entry.client_id.clone(),
                });
            }
            entry.metrics.validate()?;
        }
        Ok(())
    }
}

/// Insert payload for a round; `created_at` is stamped by the writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTrainingRound {
    pub round_id: String,
    pub clients: Vec<ClientMetrics>,
}

impl NewTrainingRound {
    pub fn new(round_id: impl Into<String>, clients: Vec<ClientMetrics>) -> Self {
        Self {
            round_id: round_id.into(),
            clients,
        }
    }

    /// Stamp the round with its creation time and validate it
    pub fn into_round(self, created_at: DateTime<Utc>) -> Result<TrainingRound, ValidationError> {
        let round = TrainingRound {
            round_id: self.round_id,
            created_at,
            clients: self.clients,
        };
        round.validate()?;
        Ok(round)
    }
}
