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

//! Fedboard Core
//!
//! Data model shared by the round store, the query service, the HTTP API and
//! the client SDK: training rounds with their per-client metric snapshots,
//! performance samples, dashboard summaries and the role policy.

pub mod error;
pub mod metrics;
pub mod performance;
pub mod policy;
pub mod round;
pub mod summary;

pub use error::ValidationError;
pub use metrics::Metrics;
pub use performance::PerformanceSample;
pub use policy::{authorize, Decision, Resource, Role};
pub use round::{ClientMetrics, NewTrainingRound, TrainingRound};
pub use summary::{AggregateStats, AveragedLatestRound, AveragedMetrics, BestRound};
