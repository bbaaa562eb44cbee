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

//! Query engine for the metrics dashboard
//!
//! [`MetricsQuery`] owns all ordering and aggregation. The round store hands
//! back rounds in no particular order; every listing here is sorted by the
//! recency key (`created_at`, then `round_id`).

use chrono::{DateTime, Utc};
use fedboard_core::{
    AggregateStats, AveragedLatestRound, BestRound, Metrics, NewTrainingRound, TrainingRound,
};
use fedboard_storage::RoundStore;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

use crate::aggregation::MetricsAccumulator;
use crate::{Page, QueryError, QueryResult, SortOrder};

/// Read model over a [`RoundStore`].
///
/// Cheap to clone and safe to share across request handlers.
#[derive(Clone)]
pub struct MetricsQuery {
    store: Arc<dyn RoundStore>,
}

impl MetricsQuery {
    pub fn new(store: Arc<dyn RoundStore>) -> Self {
        Self { store }
    }

    /// Every round, newest first
    pub fn list_all_rounds(&self) -> QueryResult<Vec<TrainingRound>> {
        let mut rounds = self.store.scan()?;
        sort_rounds(&mut rounds, SortOrder::Desc);
        debug!(count = rounds.len(), "Listed all rounds");
        Ok(rounds)
    }

    /// Rounds in which `client_id` reported metrics.
    ///
    /// An unknown client yields an empty list; a blank id is a validation
    /// error.
    pub fn list_rounds_for_client(
        &self,
        client_id: &str,
        order: SortOrder,
    ) -> QueryResult<Vec<TrainingRound>> {
        let client_id = require_id("clientId", client_id)?;
        let mut rounds = self.store.find_by_client(client_id)?;
        sort_rounds(&mut rounds, order);
        debug!(client_id, %order, count = rounds.len(), "Listed rounds for client");
        Ok(rounds)
    }

    pub fn list_rounds_for_client_page(
        &self,
        client_id: &str,
        order: SortOrder,
        page: Page,
    ) -> QueryResult<Vec<TrainingRound>> {
        Ok(page.apply(self.list_rounds_for_client(client_id, order)?))
    }

    pub fn get_round(&self, round_id: &str) -> QueryResult<TrainingRound> {
        let round_id = require_id("roundId", round_id)?;
        self.store
            .get(round_id)?
            .ok_or_else(|| QueryError::NotFound(format!("round {} not found", round_id)))
    }

    /// Means over every `(round, client)` entry in the store.
    ///
    /// `total_rounds` counts distinct rounds. `None` on an empty store.
    pub fn compute_aggregate(&self) -> QueryResult<Option<AggregateStats>> {
        let rounds = self.store.scan()?;
        let distinct: HashSet<&str> = rounds.iter().map(|r| r.round_id.as_str()).collect();
        let acc: MetricsAccumulator = rounds
            .iter()
            .flat_map(|r| r.clients.iter().map(|c| &c.metrics))
            .collect();

        Ok(acc.averaged().map(|avg| AggregateStats {
            total_rounds: distinct.len(),
            avg_accuracy: avg.accuracy,
            avg_f1_score: avg.f1_score,
            avg_loss: avg.loss,
        }))
    }

    /// The `(round, client)` entry with the highest F1 score.
    ///
    /// Ties go to the more recent round, then to the lexically smaller
    /// client id.
    pub fn compute_best_global_round(&self) -> QueryResult<Option<BestRound>> {
        let rounds = self.store.scan()?;
        let best = rounds
            .iter()
            .flat_map(|r| r.clients.iter().map(move |c| (r, c)))
            .max_by(|(ra, ca), (rb, cb)| {
                ca.metrics
                    .f1_score
                    .total_cmp(&cb.metrics.f1_score)
                    .then_with(|| ra.recency_cmp(rb))
                    .then_with(|| cb.client_id.cmp(&ca.client_id))
            });

        Ok(best.map(|(round, entry)| BestRound {
            round: round.round_id.clone(),
            client_id: entry.client_id.clone(),
            metrics: entry.metrics,
            created_at: round.created_at,
        }))
    }

    /// Mean of each client's most recent snapshot, one snapshot per client
    pub fn compute_averaged_latest_round(&self) -> QueryResult<AveragedLatestRound> {
        let rounds = self.store.scan()?;
        let latest = latest_per_client(&rounds);
        let acc: MetricsAccumulator = latest.values().map(|(_, metrics)| *metrics).collect();

        Ok(AveragedLatestRound {
            averaged_metrics: acc.averaged(),
            client_count: latest.len(),
        })
    }

    /// Distinct rounds that are the latest round of at least one client,
    /// newest first
    pub fn latest_rounds(&self) -> QueryResult<Vec<TrainingRound>> {
        let rounds = self.store.scan()?;
        let wanted: HashSet<&str> = latest_per_client(&rounds)
            .values()
            .map(|(round, _)| round.round_id.as_str())
            .collect();

        let mut latest: Vec<TrainingRound> = rounds
            .iter()
            .filter(|r| wanted.contains(r.round_id.as_str()))
            .cloned()
            .collect();
        sort_rounds(&mut latest, SortOrder::Desc);
        Ok(latest)
    }

    /// Sorted distinct client ids
    pub fn list_client_ids(&self) -> QueryResult<Vec<String>> {
        Ok(self.store.client_ids()?)
    }

    pub fn round_count(&self) -> QueryResult<usize> {
        Ok(self.store.count()?)
    }

    /// Insert a round stamped with the current time
    pub fn insert_round(&self, round: NewTrainingRound) -> QueryResult<TrainingRound> {
        self.insert_round_at(round, Utc::now())
    }

    pub fn insert_round_at(
        &self,
        round: NewTrainingRound,
        created_at: DateTime<Utc>,
    ) -> QueryResult<TrainingRound> {
        let round = round
            .into_round(created_at)
            .map_err(|e| QueryError::Validation(e.to_string()))?;
        self.store.insert(round.clone())?;
        info!(round_id = %round.round_id, clients = round.clients.len(), "Round recorded");
        Ok(round)
    }

    /// Remove every round; all-or-nothing
    pub fn clear_rounds(&self) -> QueryResult<usize> {
        Ok(self.store.clear()?)
    }
}

fn require_id<'a>(name: &str, value: &'a str) -> QueryResult<&'a str> {
    if value.trim().is_empty() {
        return Err(QueryError::Validation(format!("{} must not be empty", name)));
    }
    Ok(value)
}

fn sort_rounds(rounds: &mut [TrainingRound], order: SortOrder) {
    match order {
        SortOrder::Asc => rounds.sort_by(|a, b| a.recency_cmp(b)),
        SortOrder::Desc => rounds.sort_by(|a, b| b.recency_cmp(a)),
    }
}

/// For each client, the most recent round it reported in and its snapshot
fn latest_per_client(rounds: &[TrainingRound]) -> HashMap<&str, (&TrainingRound, &Metrics)> {
    let mut latest: HashMap<&str, (&TrainingRound, &Metrics)> = HashMap::new();
    for round in rounds {
        for entry in &round.clients {
            let newer = match latest.get(entry.client_id.as_str()) {
                Some((current, _)) => round.recency_cmp(current) == Ordering::Greater,
                None => true,
            };
            if newer {
                latest.insert(entry.client_id.as_str(), (round, &entry.metrics));
            }
        }
    }
    latest
}
