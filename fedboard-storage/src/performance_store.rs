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

//! Performance sample collection

use fedboard_core::PerformanceSample;
use parking_lot::RwLock;
use std::path::Path;

use crate::log::RecordLog;
use crate::uri::{StoreUri, PERFORMANCE_LOG_FILE, PERFORMANCE_MAGIC};
use crate::StoreResult;

/// Flat list of [`PerformanceSample`] documents, unrelated to rounds
pub struct PerformanceStore {
    log: Option<RecordLog>,
    samples: RwLock<Vec<PerformanceSample>>,
}

impl PerformanceStore {
    pub fn in_memory() -> Self {
        Self {
            log: None,
            samples: RwLock::new(Vec::new()),
        }
    }

    pub fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let log = RecordLog::open(dir.as_ref().join(PERFORMANCE_LOG_FILE), PERFORMANCE_MAGIC)?;
        let samples: Vec<PerformanceSample> = log.replay()?;
        tracing::info!(path = ?log.path(), samples = samples.len(), "Performance store opened");

        Ok(Self {
            log: Some(log),
            samples: RwLock::new(samples),
        })
    }

    pub fn open_uri(uri: &StoreUri) -> StoreResult<Self> {
        match uri {
            StoreUri::Memory => Ok(Self::in_memory()),
            StoreUri::File(dir) => Self::open(dir),
        }
    }

    pub fn insert(&self, sample: PerformanceSample) -> StoreResult<()> {
        sample.validate()?;

        let mut samples = self.samples.write();
        if let Some(log) = &self.log {
            log.append(&sample)?;
        }
        samples.push(sample);
        Ok(())
    }

    /// Samples in insertion order
    pub fn list(&self) -> Vec<PerformanceSample> {
        self.samples.read().clone()
    }

    pub fn count(&self) -> usize {
        self.samples.read().len()
    }

    /// Delete every sample; returns how many were removed
    pub fn clear(&self) -> StoreResult<usize> {
        let mut samples = self.samples.write();
        if let Some(log) = &self.log {
            log.reset()?;
        }
        let removed = samples.len();
        samples.clear();
        tracing::info!(removed, "Performance samples cleared");
        Ok(removed)
    }
}
