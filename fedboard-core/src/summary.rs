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

//! Dashboard summaries computed by the query service.
//!
//! All values keep the unit of record: accuracy and F1 are fractions, never
//! percentages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Metrics;

/// Mean metrics over every `(round, client)` entry in the store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of distinct rounds, not of client entries
    pub total_rounds: usize,
    pub avg_accuracy: f64,
    pub avg_f1_score: f64,
    pub avg_loss: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedMetrics {
    pub accuracy: f64,
    pub f1_score: f64,
    pub loss: f64,
}

/// Mean of each client's most recent snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragedLatestRound {
    /// `None` when no client has reported yet
    pub averaged_metrics: Option<AveragedMetrics>,
    pub client_count: usize,
}

/// The single client entry with the highest F1 score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestRound {
    pub round: String,
    pub client_id: String,
    pub metrics: Metrics,
    pub created_at: DateTime<Utc>,
}
