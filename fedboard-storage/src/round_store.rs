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

//! Round Store
//!
//! Insert-only persistence for [`TrainingRound`] documents with two access
//! paths besides the full scan: point lookup by `round_id` and membership
//! lookup by embedded `client_id`. Results carry no ordering guarantee.

use fedboard_core::TrainingRound;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::log::RecordLog;
use crate::uri::{StoreUri, ROUNDS_LOG_FILE, ROUNDS_MAGIC};
use crate::{StoreError, StoreResult};

/// Storage seam for training rounds
pub trait RoundStore: Send + Sync {
    /// Insert a whole round; an existing `round_id` is a conflict
    fn insert(&self, round: TrainingRound) -> StoreResult<()>;

    fn get(&self, round_id: &str) -> StoreResult<Option<TrainingRound>>;

    /// Every round with an entry for `client_id`
    fn find_by_client(&self, client_id: &str) -> StoreResult<Vec<TrainingRound>>;

    fn scan(&self) -> StoreResult<Vec<TrainingRound>>;

    /// Distinct client ids across all rounds, sorted
    fn client_ids(&self) -> StoreResult<Vec<String>>;

    fn count(&self) -> StoreResult<usize>;

    /// Remove every round; returns how many were removed
    fn clear(&self) -> StoreResult<usize>;
}

#[derive(Default)]
struct RoundIndex {
    rounds: Vec<TrainingRound>,
    by_id: HashMap<String, usize>,
    by_client: BTreeMap<String, Vec<usize>>,
}

impl RoundIndex {
    fn push(&mut self, round: TrainingRound) {
        let slot = self.rounds.len();
        self.by_id.insert(round.round_id.clone(), slot);
        for entry in &round.clients {
            self.by_client
                .entry(entry.client_id.clone())
                .or_default()
                .push(slot);
        }
        self.rounds.push(round);
    }
}

/// Round store backed by an optional [`RecordLog`].
///
/// Without a log the store lives only in memory. Writers hold the index lock
/// across the log append, so readers never see a round that is not durable
/// and never see a half-applied clear.
pub struct LogRoundStore {
    log: Option<RecordLog>,
    index: RwLock<RoundIndex>,
}

impl LogRoundStore {
    pub fn in_memory() -> Self {
        Self {
            log: None,
            index: RwLock::new(RoundIndex::default()),
        }
    }

    /// Open (or create) the round log inside `dir` and replay it
    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let log = RecordLog::open(dir.as_ref().join(ROUNDS_LOG_FILE), ROUNDS_MAGIC)?;

        let mut index = RoundIndex::default();
        for round in log.replay::<TrainingRound>()? {
            if index.by_id.contains_key(&round.round_id) {
                tracing::warn!(round_id = %round.round_id, "Duplicate round in log, keeping first");
                continue;
            }
            index.push(round);
        }
        tracing::info!(
            path = ?log.path(),
            rounds = index.rounds.len(),
            "Round store opened"
        );

        Ok(Self {
            log: Some(log),
            index: RwLock::new(index),
        })
    }

    pub fn open_uri(uri: &StoreUri) -> StoreResult<Self> {
        match uri {
            StoreUri::Memory => Ok(Self::in_memory()),
            StoreUri::File(dir) => Self::open(dir),
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.log.is_some()
    }
}

impl RoundStore for LogRoundStore {
    fn insert(&self, round: TrainingRound) -> StoreResult<()> {
        round.validate()?;

        let mut index = self.index.write();
        if index.by_id.contains_key(&round.round_id) {
            return Err(StoreError::Conflict(round.round_id));
        }
        if let Some(log) = &self.log {
            log.append(&round)?;
        }
        tracing::debug!(round_id = %round.round_id, clients = round.clients.len(), "Round inserted");
        index.push(round);
        Ok(())
    }

    fn get(&self, round_id: &str) -> StoreResult<Option<TrainingRound>> {
        let index = self.index.read();
        Ok(index
            .by_id
            .get(round_id)
            .map(|&slot| index.rounds[slot].clone()))
    }

    fn find_by_client(&self, client_id: &str) -> StoreResult<Vec<TrainingRound>> {
        let index = self.index.read();
        Ok(index
            .by_client
            .get(client_id)
            .map(|slots| slots.iter().map(|&slot| index.rounds[slot].clone()).collect())
            .unwrap_or_default())
    }

    fn scan(&self) -> StoreResult<Vec<TrainingRound>> {
        Ok(self.index.read().rounds.clone())
    }

    fn client_ids(&self) -> StoreResult<Vec<String>> {
        Ok(self.index.read().by_client.keys().cloned().collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.index.read().rounds.len())
    }

    fn clear(&self) -> StoreResult<usize> {
        let mut index = self.index.write();
        if let Some(log) = &self.log {
            log.reset()?;
        }
        let removed = index.rounds.len();
        *index = RoundIndex::default();
        tracing::info!(removed, "Round store cleared");
        Ok(removed)
    }
}
