use super::common::*;
use crate::accreditation::domain::{EvaluationStatus, SubmissionStage};
use crate::accreditation::validation::{FormGuard, ValidationError};

fn guard() -> FormGuard {
    FormGuard::new(rubric())
}

#[test]
fn rejects_criteria_outside_rubric() {
    let mut form = form(uniform(EvaluationStatus::Acceptable));
    form.evaluation_criteria
        .set_status("facility", "swimmingPool", EvaluationStatus::Acceptable);

    match guard().normalize(form, SubmissionStage::Submitted) {
        Err(ValidationError::UnknownCriteria(keys)) => {
            assert_eq!(keys, vec!["facility.swimmingPool".to_string()])
        }
        other => panic!("expected unknown criteria, got {other:?}"),
    }
}

#[test]
fn rejects_unknown_amenities() {
    let mut form = form(uniform(EvaluationStatus::Acceptable));
    form.other_amenities.insert("jacuzzi".to_string(), true);

    assert_eq!(
        guard().normalize(form, SubmissionStage::Draft),
        Err(ValidationError::UnknownAmenities(vec!["jacuzzi".to_string()]))
    );
}

#[test]
fn submitted_forms_need_a_name_but_drafts_do_not() {
    let mut form = form(uniform(EvaluationStatus::Acceptable));
    form.general.boarding_house_name = "   ".to_string();

    assert_eq!(
        guard().normalize(form.clone(), SubmissionStage::Submitted),
        Err(ValidationError::MissingBoardingHouseName)
    );
    assert!(guard().normalize(form, SubmissionStage::Draft).is_ok());
}

#[test]
fn submitted_forms_reject_inconsistent_household_counts() {
    let mut form = form(uniform(EvaluationStatus::Acceptable));
    form.household.total_boarders = Some(10);
    form.household.male_boarders = Some(8);
    form.household.female_boarders = Some(6);

    match guard().normalize(form, SubmissionStage::Submitted) {
        Err(ValidationError::InconsistentHousehold(details)) => {
            assert!(details[0].starts_with("boarders"))
        }
        other => panic!("expected household inconsistency, got {other:?}"),
    }
}

#[test]
fn normalization_fills_amenities_and_trims_name() {
    let mut form = form(uniform(EvaluationStatus::Acceptable));
    form.general.boarding_house_name = "  Ocean View Lodge ".to_string();
    form.other_amenities.clear();
    form.other_amenities.insert("wifi".to_string(), true);

    let normalized = guard()
        .normalize(form, SubmissionStage::Submitted)
        .expect("form is valid");

    assert_eq!(normalized.general.boarding_house_name, "Ocean View Lodge");
    assert_eq!(normalized.other_amenities.len(), 4);
    assert_eq!(normalized.available_amenities().collect::<Vec<_>>(), vec!["wifi"]);
}
