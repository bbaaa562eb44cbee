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

//! Fedboard Storage Layer
//!
//! Document persistence for training rounds and performance samples.
//!
//! ## Layout
//!
//! A store directory holds one append-only record log per collection:
//!
//! ```text
//! <dir>/training_rounds.log   TrainingRound documents
//! <dir>/performance.log       PerformanceSample documents
//! ```
//!
//! Each log starts with a 4-byte magic and a little-endian `u32` version,
//! followed by framed records:
//!
//! ```text
//! [type: u8][len: u32 LE][json payload: len bytes][crc32: u32 LE]
//! ```
//!
//! Logs are replayed into memory on open. The round store keeps a unique
//! `round_id` index and a `client_id` membership index over the replayed
//! documents. `memory://` stores skip the log entirely.

pub mod error;
pub mod log;
pub mod performance_store;
pub mod round_store;
pub mod uri;

pub use error::{StoreError, StoreResult};
pub use performance_store::PerformanceStore;
pub use round_store::{LogRoundStore, RoundStore};
pub use uri::{StoreUri, PERFORMANCE_LOG_FILE, ROUNDS_LOG_FILE};
