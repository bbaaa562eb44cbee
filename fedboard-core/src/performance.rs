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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics::check_fraction;
use crate::ValidationError;

/// Flat performance record used by the database self-test and clear
/// utilities. Independent of [`crate::TrainingRound`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub round: u32,
    pub accuracy: f64,
    pub f1_score: f64,
    pub loss: f64,
    pub precision: f64,
    pub recall: f64,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl PerformanceSample {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_fraction("accuracy", self.accuracy)?;
        check_fraction("f1Score", self.f1_score)?;
        check_fraction("precision", self.precision)?;
        check_fraction("recall", self.recall)?;
        if !self.loss.is_finite() {
            return Err(ValidationError::NonFinite { field: "loss" });
        }
        if self.loss < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "loss",
                value: self.loss,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case_wire_and_default_timestamp() {
        let sample: PerformanceSample = serde_json::from_str(
            r#"{"round":3,"accuracy":0.9,"f1Score":0.88,"loss":0.2,"precision":0.9,"recall":0.86}"#,
        )
        .unwrap();
        assert_eq!(sample.round, 3);
        assert_eq!(sample.f1_score, 0.88);
        assert!(sample.validate().is_ok());

        let json = serde_json::to_value(&sample).unwrap();
        assert!(json.get("f1Score").is_some());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_validate_rejects_bad_recall() {
        let sample = PerformanceSample {
            round: 1,
            accuracy: 0.5,
            f1_score: 0.5,
            loss: 0.5,
            precision: 0.5,
            recall: 2.0,
            timestamp: Utc::now(),
        };
        assert!(matches!(
            sample.validate(),
            Err(ValidationError::OutOfRange { field: "recall", .. })
        ));
    }
}
