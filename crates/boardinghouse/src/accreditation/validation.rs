use std::sync::Arc;

use super::domain::{AccreditationForm, SubmissionStage};
use super::rubric::RubricSchema;

/// Validation errors raised by the form guard.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("boarding house name is required before submitting")]
    MissingBoardingHouseName,
    #[error("evaluation criteria reference items outside the rubric: {}", .0.join(", "))]
    UnknownCriteria(Vec<String>),
    #[error("unknown amenities: {}", .0.join(", "))]
    UnknownAmenities(Vec<String>),
    #[error("household counts are inconsistent: {}", .0.join("; "))]
    InconsistentHousehold(Vec<String>),
}

/// Guard responsible for producing normalized questionnaires.
#[derive(Debug, Clone)]
pub struct FormGuard {
    rubric: Arc<RubricSchema>,
}

impl FormGuard {
    pub fn new(rubric: Arc<RubricSchema>) -> Self {
        Self { rubric }
    }

    /// Check a questionnaire against the rubric and fill any rubric pairs or
    /// amenities the client left out. Drafts may be saved without a name or
    /// with household counts still being worked out.
    pub fn normalize(
        &self,
        mut form: AccreditationForm,
        stage: SubmissionStage,
    ) -> Result<AccreditationForm, ValidationError> {
        let unknown = form.evaluation_criteria.unknown_keys(&self.rubric);
        if !unknown.is_empty() {
            return Err(ValidationError::UnknownCriteria(unknown));
        }

        let unknown_amenities: Vec<String> = form
            .other_amenities
            .keys()
            .filter(|key| !self.rubric.has_amenity(key))
            .cloned()
            .collect();
        if !unknown_amenities.is_empty() {
            return Err(ValidationError::UnknownAmenities(unknown_amenities));
        }

        if stage == SubmissionStage::Submitted {
            if form.general.boarding_house_name.trim().is_empty() {
                return Err(ValidationError::MissingBoardingHouseName);
            }

            let inconsistencies = form.household.inconsistencies();
            if !inconsistencies.is_empty() {
                return Err(ValidationError::InconsistentHousehold(inconsistencies));
            }
        }

        form.general.boarding_house_name = form.general.boarding_house_name.trim().to_string();
        form.evaluation_criteria.normalize(&self.rubric);
        for amenity in self.rubric.amenities() {
            form.other_amenities.entry(amenity.key.clone()).or_insert(false);
        }

        Ok(form)
    }
}
