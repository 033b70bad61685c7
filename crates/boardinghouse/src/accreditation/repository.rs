use serde::{Deserialize, Serialize};

use super::domain::{AccreditationForm, AccreditationId, RecordTimestamps, SubmissionStage};
use super::evaluation::{AccreditationStatus, EvaluationOutcome};

/// Repository record containing the questionnaire, its evaluation, and
/// lifecycle metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccreditationRecord {
    pub id: AccreditationId,
    pub stage: SubmissionStage,
    pub form: AccreditationForm,
    pub outcome: EvaluationOutcome,
    pub timestamps: RecordTimestamps,
}

impl AccreditationRecord {
    pub fn derived_status(&self) -> AccreditationStatus {
        self.outcome.decision.status
    }

    /// Manual override when the evaluator set one, otherwise the derived
    /// decision.
    pub fn effective_status(&self) -> AccreditationStatus {
        self.form
            .evaluation_status
            .unwrap_or_else(|| self.derived_status())
    }

    pub fn status_view(&self) -> AccreditationStatusView {
        AccreditationStatusView {
            id: self.id.clone(),
            boarding_house_name: self.form.general.boarding_house_name.clone(),
            stage: self.stage.label(),
            derived_status: self.derived_status(),
            effective_status: self.effective_status(),
            overridden: self
                .form
                .evaluation_status
                .is_some_and(|status| status != self.derived_status()),
            percentage: self.outcome.score.percentage,
            has_critical_failure: self.outcome.score.has_critical_failure,
            rationale: self.outcome.decision.description.clone(),
            updated_at: self.timestamps.updated_at,
        }
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait AccreditationRepository: Send + Sync {
    fn insert(&self, record: AccreditationRecord) -> Result<AccreditationRecord, RepositoryError>;
    fn update(&self, record: AccreditationRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &AccreditationId) -> Result<Option<AccreditationRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<AccreditationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Sanitized representation of a record's exposed status.
#[derive(Debug, Clone, Serialize)]
pub struct AccreditationStatusView {
    pub id: AccreditationId,
    pub boarding_house_name: String,
    pub stage: &'static str,
    pub derived_status: AccreditationStatus,
    pub effective_status: AccreditationStatus,
    pub overridden: bool,
    pub percentage: f64,
    pub has_critical_failure: bool,
    pub rationale: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Dashboard counts over submitted records; drafts are counted apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccreditationSummary {
    pub total: usize,
    pub accredited: usize,
    pub conditional: usize,
    pub not_accredited: usize,
    pub drafts: usize,
}

impl AccreditationSummary {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AccreditationRecord>) -> Self {
        let mut summary = Self::default();
        for record in records {
            if record.stage == SubmissionStage::Draft {
                summary.drafts += 1;
                continue;
            }
            summary.total += 1;
            match record.effective_status() {
                AccreditationStatus::Accredited => summary.accredited += 1,
                AccreditationStatus::Conditional => summary.conditional += 1,
                AccreditationStatus::NotAccredited => summary.not_accredited += 1,
            }
        }
        summary
    }
}
