use serde::{Deserialize, Serialize};

use super::config::ClassificationThresholds;
use super::ScoreResult;

/// Accreditation outcome for an evaluated boarding house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccreditationStatus {
    Accredited,
    Conditional,
    NotAccredited,
}

impl AccreditationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            AccreditationStatus::Accredited => "Accredited",
            AccreditationStatus::Conditional => "Conditional",
            AccreditationStatus::NotAccredited => "Not Accredited",
        }
    }
}

/// Derived decision and the rationale shown to the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccreditationDecision {
    pub status: AccreditationStatus,
    pub description: String,
}

impl AccreditationDecision {
    pub fn summary(&self) -> String {
        format!("{}: {}", self.status.label(), self.description)
    }
}

/// Critical failures are checked only after the accredited branch, so they
/// override any percentage.
pub(crate) fn classify(
    score: &ScoreResult,
    thresholds: &ClassificationThresholds,
    shortfalls: &[String],
) -> AccreditationDecision {
    if score.percentage >= thresholds.accredited_percentage && !score.has_critical_failure {
        return AccreditationDecision {
            status: AccreditationStatus::Accredited,
            description: format!(
                "Scored {:.1}% ({}/{}), meeting the {:.0}% accreditation threshold with all critical requirements satisfied.",
                score.percentage,
                score.total_score,
                score.max_score,
                thresholds.accredited_percentage
            ),
        };
    }

    if score.has_critical_failure {
        let failed: Vec<&str> = score
            .critical_failures
            .iter()
            .map(|failure| failure.label.as_str())
            .collect();
        return AccreditationDecision {
            status: AccreditationStatus::NotAccredited,
            description: format!(
                "Critical requirement not acceptable: {}. Accreditation is withheld regardless of the {:.1}% score.",
                failed.join(", "),
                score.percentage
            ),
        };
    }

    if score.percentage < thresholds.failing_percentage {
        return AccreditationDecision {
            status: AccreditationStatus::NotAccredited,
            description: format!(
                "Scored {:.1}% ({}/{}), below the {:.0}% minimum.",
                score.percentage,
                score.total_score,
                score.max_score,
                thresholds.failing_percentage
            ),
        };
    }

    let mut description = format!(
        "Scored {:.1}% ({}/{}); improvements are required before full accreditation.",
        score.percentage, score.total_score, score.max_score
    );
    if !shortfalls.is_empty() {
        description.push_str(&format!(" Address: {}.", shortfalls.join(", ")));
    }

    AccreditationDecision {
        status: AccreditationStatus::Conditional,
        description,
    }
}
