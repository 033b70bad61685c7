use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::domain::{
    AccreditationForm, AccreditationId, AccreditationSubmission, RecordTimestamps, SubmissionStage,
};
use super::evaluation::{ClassificationThresholds, EvaluationEngine, EvaluationOutcome};
use super::repository::{
    AccreditationRecord, AccreditationRepository, AccreditationSummary, RepositoryError,
};
use super::rubric::RubricSchema;
use super::validation::{FormGuard, ValidationError};

/// Service composing the form guard, repository, and evaluation engine.
pub struct AccreditationService<R> {
    guard: FormGuard,
    repository: Arc<R>,
    engine: EvaluationEngine,
    sequence: AtomicU64,
}

impl<R> AccreditationService<R>
where
    R: AccreditationRepository + 'static,
{
    pub fn new(
        repository: Arc<R>,
        rubric: Arc<RubricSchema>,
        thresholds: ClassificationThresholds,
    ) -> Self {
        Self {
            guard: FormGuard::new(rubric.clone()),
            repository,
            engine: EvaluationEngine::new(rubric, thresholds),
            sequence: AtomicU64::new(1),
        }
    }

    pub fn rubric(&self) -> &RubricSchema {
        self.engine.rubric()
    }

    fn next_id(&self) -> AccreditationId {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        AccreditationId(format!("acc-{id:06}"))
    }

    /// Score a questionnaire without storing it.
    pub fn evaluate(
        &self,
        form: AccreditationForm,
    ) -> Result<EvaluationOutcome, AccreditationServiceError> {
        let form = self.guard.normalize(form, SubmissionStage::Draft)?;
        Ok(self.engine.evaluate(&form.evaluation_criteria))
    }

    /// Validate, evaluate, and store a new questionnaire.
    pub fn submit(
        &self,
        submission: AccreditationSubmission,
    ) -> Result<AccreditationRecord, AccreditationServiceError> {
        let AccreditationSubmission { stage, form } = submission;
        let form = self.guard.normalize(form, stage)?;
        let outcome = self.engine.evaluate(&form.evaluation_criteria);

        let record = AccreditationRecord {
            id: self.next_id(),
            stage,
            form,
            outcome,
            timestamps: RecordTimestamps::now(),
        };

        let stored = self.repository.insert(record)?;
        info!(
            id = %stored.id.0,
            stage = stored.stage.label(),
            status = stored.effective_status().label(),
            percentage = stored.outcome.score.percentage,
            "accreditation stored"
        );
        Ok(stored)
    }

    /// Replace the questionnaire of an existing record and re-evaluate it.
    pub fn update(
        &self,
        id: &AccreditationId,
        submission: AccreditationSubmission,
    ) -> Result<AccreditationRecord, AccreditationServiceError> {
        let existing = self.get(id)?;
        let AccreditationSubmission { stage, form } = submission;
        let form = self.guard.normalize(form, stage)?;
        let outcome = self.engine.evaluate(&form.evaluation_criteria);

        let record = AccreditationRecord {
            id: existing.id,
            stage,
            form,
            outcome,
            timestamps: existing.timestamps.touched(),
        };

        self.repository.update(record.clone())?;
        debug!(id = %record.id.0, "accreditation updated");
        Ok(record)
    }

    /// Fetch a stored questionnaire for API responses.
    pub fn get(&self, id: &AccreditationId) -> Result<AccreditationRecord, AccreditationServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// All stored questionnaires, oldest first.
    pub fn list(&self) -> Result<Vec<AccreditationRecord>, AccreditationServiceError> {
        let mut records = self.repository.list()?;
        records.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(records)
    }

    pub fn summary(&self) -> Result<AccreditationSummary, AccreditationServiceError> {
        let records = self.repository.list()?;
        Ok(AccreditationSummary::from_records(&records))
    }
}

/// Error raised by the accreditation service.
#[derive(Debug, thiserror::Error)]
pub enum AccreditationServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
