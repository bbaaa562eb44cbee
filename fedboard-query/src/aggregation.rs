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

//! Aggregation accumulators
//!
//! Means over metric snapshots. An accumulator that saw nothing yields
//! `None` instead of dividing by zero.

use fedboard_core::{AveragedMetrics, Metrics};

/// Running arithmetic mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mean {
    pub sum: f64,
    pub count: u64,
}

impl Mean {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn value(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Means of accuracy, F1 and loss over a set of snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsAccumulator {
    accuracy: Mean,
    f1_score: Mean,
    loss: Mean,
}

impl MetricsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metrics: &Metrics) {
        self.accuracy.push(metrics.accuracy);
        self.f1_score.push(metrics.f1_score);
        self.loss.push(metrics.loss);
    }

    /// Number of snapshots folded in so far
    pub fn count(&self) -> u64 {
        self.accuracy.count
    }

    pub fn averaged(&self) -> Option<AveragedMetrics> {
        Some(AveragedMetrics {
            accuracy: self.accuracy.value()?,
            f1_score: self.f1_score.value()?,
            loss: self.loss.value()?,
        })
    }
}

impl<'a> FromIterator<&'a Metrics> for MetricsAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a Metrics>>(iter: I) -> Self {
        let mut acc = Self::new();
        for metrics in iter {
            acc.push(metrics);
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_has_no_mean() {
        assert_eq!(Mean::default().value(), None);
        assert_eq!(MetricsAccumulator::new().averaged(), None);
    }

    #[test]
    fn test_means() {
        let samples = [
            Metrics::basic(0.5, 0.4, 1.0),
            Metrics::basic(0.9, 0.8, 0.0),
        ];
        let acc: MetricsAccumulator = samples.iter().collect();
        assert_eq!(acc.count(), 2);

        let avg = acc.averaged().unwrap();
        assert!((avg.accuracy - 0.7).abs() < 1e-12);
        assert!((avg.f1_score - 0.6).abs() < 1e-12);
        assert!((avg.loss - 0.5).abs() < 1e-12);
    }
}
