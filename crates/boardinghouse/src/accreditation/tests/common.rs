use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::accreditation::domain::{
    AccreditationForm, AccreditationId, AccreditationSubmission, Answer, EvaluationCriteria,
    EvaluationStatus, SubmissionStage,
};
use crate::accreditation::evaluation::{ClassificationThresholds, EvaluationEngine};
use crate::accreditation::repository::{
    AccreditationRecord, AccreditationRepository, RepositoryError,
};
use crate::accreditation::rubric::RubricSchema;
use crate::accreditation::{accreditation_router, AccreditationService};

pub(super) fn rubric() -> Arc<RubricSchema> {
    Arc::new(RubricSchema::standard())
}

pub(super) fn engine() -> EvaluationEngine {
    EvaluationEngine::new(rubric(), ClassificationThresholds::default())
}

pub(super) fn uniform(status: EvaluationStatus) -> EvaluationCriteria {
    EvaluationCriteria::uniform(&RubricSchema::standard(), status)
}

/// All items acceptable except the given `(section, item)` pairs.
pub(super) fn acceptable_except(
    failing: &[(&str, &str, EvaluationStatus)],
) -> EvaluationCriteria {
    let mut criteria = uniform(EvaluationStatus::Acceptable);
    for (section, item, status) in failing {
        criteria.set_status(section, item, *status);
    }
    criteria
}

pub(super) fn form(criteria: EvaluationCriteria) -> AccreditationForm {
    let mut form = AccreditationForm::blank(&RubricSchema::standard());
    form.general.boarding_house_name = "Sunrise Boarding House".to_string();
    form.general.address = "J.A. Clarin St., Tagbilaran City".to_string();
    form.general.owner_name = "Maria Dela Cruz".to_string();
    form.general.has_officers = Answer::Yes;
    form.household.total_rooms = Some(12);
    form.household.male_rooms = Some(5);
    form.household.female_rooms = Some(7);
    form.safety.has_fire_extinguisher = Answer::Yes;
    form.safety.has_curfew = Answer::Yes;
    form.safety.curfew_time = "10:00 PM".to_string();
    form.other_amenities.insert("wifi".to_string(), true);
    form.evaluation_criteria = criteria;
    form
}

pub(super) fn submission(criteria: EvaluationCriteria) -> AccreditationSubmission {
    AccreditationSubmission {
        stage: SubmissionStage::Submitted,
        form: form(criteria),
    }
}

pub(super) fn build_service() -> (AccreditationService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = AccreditationService::new(
        repository.clone(),
        rubric(),
        ClassificationThresholds::default(),
    );
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<AccreditationId, AccreditationRecord>>>,
}

impl AccreditationRepository for MemoryRepository {
    fn insert(&self, record: AccreditationRecord) -> Result<AccreditationRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: AccreditationRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &AccreditationId) -> Result<Option<AccreditationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<AccreditationRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl AccreditationRepository for UnavailableRepository {
    fn insert(&self, _record: AccreditationRecord) -> Result<AccreditationRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: AccreditationRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &AccreditationId) -> Result<Option<AccreditationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<AccreditationRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(service: AccreditationService<MemoryRepository>) -> axum::Router {
    accreditation_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
