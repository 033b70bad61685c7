//! Boarding-house accreditation: rubric, questionnaire, scoring, and the
//! records kept for each evaluated facility.

pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod router;
pub mod rubric;
pub mod service;
pub(crate) mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    AccreditationForm, AccreditationId, AccreditationSubmission, Answer, EvaluationCriteria,
    EvaluationItem, EvaluationStatus, SubmissionStage,
};
pub use evaluation::{
    classify, score_criteria, AccreditationDecision, AccreditationStatus,
    ClassificationThresholds, EvaluationEngine, EvaluationOutcome, ScoreResult, SectionScore,
};
pub use repository::{
    AccreditationRecord, AccreditationRepository, AccreditationStatusView, AccreditationSummary,
    RepositoryError,
};
pub use router::accreditation_router;
pub use rubric::{RubricError, RubricSchema};
pub use service::{AccreditationService, AccreditationServiceError};
pub use validation::ValidationError;
