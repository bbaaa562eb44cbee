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

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Classification metrics reported by one client for one round.
///
/// Accuracy, F1, precision and recall are fractions in `[0, 1]`; loss is
/// non-negative. Precision and recall are only present when the training
/// process reported them, and are never filled in by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub f1_score: f64,
    pub loss: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
}

impl Metrics {
    /// Metrics without precision/recall
    pub fn basic(accuracy: f64, f1_score: f64, loss: f64) -> Self {
        Self {
            accuracy,
            f1_score,
            loss,
            precision: None,
            recall: None,
        }
    }

    pub fn with_precision_recall(mut self, precision: f64, recall: f64) -> Self {
        self.precision = Some(precision);
        self.recall = Some(recall);
        self
    }

    pub fn has_precision_recall(&self) -> bool {
        self.precision.is_some() && self.recall.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_fraction("accuracy", self.accuracy)?;
        check_fraction("f1_score", self.f1_score)?;
        check_finite("loss", self.loss)?;
        if self.loss < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "loss",
                value: self.loss,
                min: 0.0,
                max: f64::INFINITY,
            });
        }
        if let Some(precision) = self.precision {
            check_fraction("precision", precision)?;
        }
        if let Some(recall) = self.recall {
            check_fraction("recall", recall)?;
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite { field })
    }
}

pub(crate) fn check_fraction(field: &'static str, value: f64) -> Result<(), ValidationError> {
    check_finite(field, value)?;
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_skipped_when_absent() {
        let json = serde_json::to_value(Metrics::basic(0.8, 0.75, 0.3)).unwrap();
        assert!(json.get("precision").is_none());
        assert!(json.get("recall").is_none());

        let parsed: Metrics =
            serde_json::from_str(r#"{"accuracy":0.8,"f1_score":0.75,"loss":0.3}"#).unwrap();
        assert!(!parsed.has_precision_recall());
    }

    #[test]
    fn test_precision_recall_round_trip() {
        let m = Metrics::basic(0.9, 0.85, 0.1).with_precision_recall(0.88, 0.82);
        let parsed: Metrics = serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
        assert_eq!(parsed, m);
        assert!(parsed.has_precision_recall());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(Metrics::basic(0.0, 1.0, 0.0).validate().is_ok());
        assert!(matches!(
            Metrics::basic(1.2, 0.5, 0.1).validate(),
            Err(ValidationError::OutOfRange { field: "accuracy", .. })
        ));
        assert!(matches!(
            Metrics::basic(0.5, 0.5, -0.1).validate(),
            Err(ValidationError::OutOfRange { field: "loss", .. })
        ));
        assert!(matches!(
            Metrics::basic(0.5, f64::NAN, 0.1).validate(),
            Err(ValidationError::NonFinite { field: "f1_score" })
        ));
        assert!(Metrics::basic(0.5, 0.5, 0.1)
            .with_precision_recall(1.5, 0.5)
            .validate()
            .is_err());
    }
}
