mod config;
mod policy;
mod rules;

pub use config::ClassificationThresholds;
pub use policy::{AccreditationDecision, AccreditationStatus};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::domain::EvaluationCriteria;
use super::rubric::RubricSchema;

/// Stateless evaluator that applies the rubric and thresholds to a matrix.
#[derive(Debug, Clone)]
pub struct EvaluationEngine {
    rubric: Arc<RubricSchema>,
    thresholds: ClassificationThresholds,
}

impl EvaluationEngine {
    pub fn new(rubric: Arc<RubricSchema>, thresholds: ClassificationThresholds) -> Self {
        Self { rubric, thresholds }
    }

    pub fn rubric(&self) -> &RubricSchema {
        &self.rubric
    }

    pub fn thresholds(&self) -> ClassificationThresholds {
        self.thresholds
    }

    pub fn score(&self, criteria: &EvaluationCriteria) -> ScoreResult {
        rules::score_criteria(&self.rubric, criteria)
    }

    pub fn classify(&self, score: &ScoreResult) -> AccreditationDecision {
        policy::classify(score, &self.thresholds, &[])
    }

    /// Score and classify in one pass; conditional rationales list the items
    /// still below acceptable.
    pub fn evaluate(&self, criteria: &EvaluationCriteria) -> EvaluationOutcome {
        let score = self.score(criteria);
        let shortfalls = rules::shortfalls(&self.rubric, criteria);
        let decision = policy::classify(&score, &self.thresholds, &shortfalls);
        EvaluationOutcome { score, decision }
    }
}

/// Score the matrix against the rubric. Never fails.
pub fn score_criteria(rubric: &RubricSchema, criteria: &EvaluationCriteria) -> ScoreResult {
    rules::score_criteria(rubric, criteria)
}

/// Map a score to a decision using the given thresholds.
pub fn classify(score: &ScoreResult, thresholds: &ClassificationThresholds) -> AccreditationDecision {
    policy::classify(score, thresholds, &[])
}

/// Per-section subtotal, in rubric order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub section: String,
    pub label: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
}

/// Critical item rated `not_acceptable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalFailure {
    pub section: String,
    pub item: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative: Option<String>,
}

/// Derived score; recomputed whenever the matrix changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub per_section: Vec<SectionScore>,
    pub has_critical_failure: bool,
    pub critical_failures: Vec<CriticalFailure>,
}

impl ScoreResult {
    pub fn section(&self, key: &str) -> Option<&SectionScore> {
        self.per_section.iter().find(|entry| entry.section == key)
    }
}

/// Score plus decision, returned by previews and stored with records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationOutcome {
    pub score: ScoreResult,
    pub decision: AccreditationDecision,
}
