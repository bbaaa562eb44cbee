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

//! Client directory cache
//!
//! The dashboard's client selector asks for the distinct client list on
//! every page load. [`ClientDirectory`] serves it from memory for a short
//! TTL and is invalidated whenever rounds are written or cleared.
//!
//! A load that read the store before an invalidation is never cached: every
//! invalidation bumps a generation, and a load only fills the cache if the
//! generation it started under is still current.

use fedboard_query::{MetricsQuery, QueryError};
use moka::sync::Cache;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

pub struct ClientDirectory {
    query: MetricsQuery,
    cache: Cache<(), Arc<Vec<String>>>,
    generation: Mutex<u64>,
}

impl ClientDirectory {
    pub fn new(query: MetricsQuery, ttl: Duration) -> Self {
        Self {
            query,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            generation: Mutex::new(0),
        }
    }

    /// Sorted distinct client ids, loaded from the store on a miss
    pub fn client_ids(&self) -> Result<Arc<Vec<String>>, QueryError> {
        if let Some(ids) = self.cache.get(&()) {
            return Ok(ids);
        }

        let started = *self.generation.lock();
        let ids = Arc::new(self.query.list_client_ids()?);

        let generation = self.generation.lock();
        if *generation == started {
            self.cache.insert((), Arc::clone(&ids));
        } else {
            tracing::debug!("Client directory load raced an invalidation, not caching");
        }
        Ok(ids)
    }

    pub fn invalidate(&self) {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.cache.invalidate(&());
        tracing::debug!(generation = *generation, "Client directory invalidated");
    }

    pub fn is_cached(&self) -> bool {
        self.cache.contains_key(&())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fedboard_core::{ClientMetrics, Metrics, NewTrainingRound};
    use fedboard_core::TrainingRound;
    use fedboard_storage::{LogRoundStore, RoundStore, StoreResult};
    use std::thread;

    /// Round store whose client listing takes a while to come back
    struct SlowListing {
        inner: LogRoundStore,
        delay: Duration,
    }

    impl RoundStore for SlowListing {
        fn insert(&self, round: TrainingRound) -> StoreResult<()> {
            self.inner.insert(round)
        }

        fn get(&self, round_id: &str) -> StoreResult<Option<TrainingRound>> {
            self.inner.get(round_id)
        }

        fn find_by_client(&self, client_id: &str) -> StoreResult<Vec<TrainingRound>> {
            self.inner.find_by_client(client_id)
        }

        fn scan(&self) -> StoreResult<Vec<TrainingRound>> {
            self.inner.scan()
        }

        fn client_ids(&self) -> StoreResult<Vec<String>> {
            let ids = self.inner.client_ids()?;
            thread::sleep(self.delay);
            Ok(ids)
        }

        fn count(&self) -> StoreResult<usize> {
            self.inner.count()
        }

        fn clear(&self) -> StoreResult<usize> {
            self.inner.clear()
        }
    }

    fn round(id: &str, client: &str) -> NewTrainingRound {
        NewTrainingRound::new(
            id,
            vec![ClientMetrics::new(client, Metrics::basic(0.5, 0.5, 0.5))],
        )
    }

    #[test]
    fn test_cached_until_invalidated() {
        let query = MetricsQuery::new(Arc::new(LogRoundStore::in_memory()));
        let directory = ClientDirectory::new(query.clone(), Duration::from_secs(600));

        query.insert_round_at(round("r1", "c1"), Utc::now()).unwrap();
        assert_eq!(*directory.client_ids().unwrap(), vec!["c1"]);
        assert!(directory.is_cached());

        // stale until invalidated
        query.insert_round_at(round("r2", "c2"), Utc::now()).unwrap();
        assert_eq!(*directory.client_ids().unwrap(), vec!["c1"]);

        directory.invalidate();
        assert!(!directory.is_cached());
        assert_eq!(*directory.client_ids().unwrap(), vec!["c1", "c2"]);
    }

    #[test]
    fn test_load_overlapping_clear_is_not_cached() {
        let store = Arc::new(SlowListing {
            inner: LogRoundStore::in_memory(),
            delay: Duration::from_millis(300),
        });
        let query = MetricsQuery::new(store);
        query.insert_round_at(round("r1", "c1"), Utc::now()).unwrap();
        let directory = Arc::new(ClientDirectory::new(query.clone(), Duration::from_secs(600)));

        let loader = {
            let directory = Arc::clone(&directory);
            thread::spawn(move || directory.client_ids().unwrap())
        };

        // the loader has read the store and is still sleeping
        thread::sleep(Duration::from_millis(100));
        query.clear_rounds().unwrap();
        directory.invalidate();

        assert_eq!(*loader.join().unwrap(), vec!["c1"]);
        assert!(!directory.is_cached());
        assert!(directory.client_ids().unwrap().is_empty());
    }
}
