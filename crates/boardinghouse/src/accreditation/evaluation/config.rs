use serde::{Deserialize, Serialize};

/// Percentage cut-offs applied by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    pub accredited_percentage: f64,
    pub failing_percentage: f64,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            accredited_percentage: 70.0,
            failing_percentage: 50.0,
        }
    }
}
