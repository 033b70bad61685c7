use super::common::*;
use crate::accreditation::domain::{AccreditationId, EvaluationStatus, SubmissionStage};
use crate::accreditation::evaluation::AccreditationStatus;
use crate::accreditation::repository::RepositoryError;
use crate::accreditation::service::AccreditationServiceError;
use crate::accreditation::validation::ValidationError;

#[test]
fn submit_stores_evaluated_record() {
    let (service, repository) = build_service();

    let record = service
        .submit(submission(uniform(EvaluationStatus::Acceptable)))
        .expect("submission stored");

    assert!(record.id.0.starts_with("acc-"));
    assert_eq!(record.stage, SubmissionStage::Submitted);
    assert_eq!(record.derived_status(), AccreditationStatus::Accredited);
    let stored = repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .get(&record.id)
        .cloned()
        .expect("record persisted");
    assert_eq!(stored.outcome.score.percentage, 100.0);
}

#[test]
fn manual_override_changes_effective_status_only() {
    let (service, _) = build_service();
    let mut submission = submission(uniform(EvaluationStatus::Considerable));
    submission.form.evaluation_status = Some(AccreditationStatus::Accredited);

    let record = service.submit(submission).expect("submission stored");

    assert_eq!(record.derived_status(), AccreditationStatus::Conditional);
    assert_eq!(record.effective_status(), AccreditationStatus::Accredited);
    let view = record.status_view();
    assert!(view.overridden);
    assert_eq!(view.derived_status, AccreditationStatus::Conditional);
}

#[test]
fn update_re_evaluates_and_keeps_creation_time() {
    let (service, _) = build_service();
    let draft = service
        .submit(crate::accreditation::AccreditationSubmission {
            stage: SubmissionStage::Draft,
            form: form(uniform(EvaluationStatus::Unset)),
        })
        .expect("draft stored");
    assert_eq!(draft.derived_status(), AccreditationStatus::NotAccredited);

    let updated = service
        .update(&draft.id, submission(uniform(EvaluationStatus::Acceptable)))
        .expect("update succeeds");

    assert_eq!(updated.id, draft.id);
    assert_eq!(updated.stage, SubmissionStage::Submitted);
    assert_eq!(updated.derived_status(), AccreditationStatus::Accredited);
    assert_eq!(updated.timestamps.created_at, draft.timestamps.created_at);
    assert!(updated.timestamps.updated_at >= draft.timestamps.updated_at);
}

#[test]
fn update_of_unknown_record_is_not_found() {
    let (service, _) = build_service();

    let result = service.update(
        &AccreditationId("acc-999999".to_string()),
        submission(uniform(EvaluationStatus::Acceptable)),
    );

    assert!(matches!(
        result,
        Err(AccreditationServiceError::Repository(RepositoryError::NotFound))
    ));
}

#[test]
fn evaluate_previews_without_storing() {
    let (service, repository) = build_service();

    let outcome = service
        .evaluate(form(uniform(EvaluationStatus::Considerable)))
        .expect("preview succeeds");

    assert_eq!(outcome.decision.status, AccreditationStatus::Conditional);
    assert!(repository
        .records
        .lock()
        .expect("repository mutex poisoned")
        .is_empty());
}

#[test]
fn submit_surfaces_validation_errors() {
    let (service, _) = build_service();
    let mut submission = submission(uniform(EvaluationStatus::Acceptable));
    submission.form.general.boarding_house_name.clear();

    let result = service.submit(submission);

    assert!(matches!(
        result,
        Err(AccreditationServiceError::Validation(
            ValidationError::MissingBoardingHouseName
        ))
    ));
}

#[test]
fn summary_counts_effective_statuses_and_drafts() {
    let (service, _) = build_service();
    service
        .submit(submission(uniform(EvaluationStatus::Acceptable)))
        .expect("accredited stored");
    service
        .submit(submission(uniform(EvaluationStatus::Considerable)))
        .expect("conditional stored");
    service
        .submit(submission(acceptable_except(&[(
            "security",
            "locksDoorsWindows",
            EvaluationStatus::NotAcceptable,
        )])))
        .expect("failing stored");
    service
        .submit(crate::accreditation::AccreditationSubmission {
            stage: SubmissionStage::Draft,
            form: form(uniform(EvaluationStatus::Unset)),
        })
        .expect("draft stored");

    let summary = service.summary().expect("summary builds");

    assert_eq!(summary.total, 3);
    assert_eq!(summary.accredited, 1);
    assert_eq!(summary.conditional, 1);
    assert_eq!(summary.not_accredited, 1);
    assert_eq!(summary.drafts, 1);

    let listed = service.list().expect("list succeeds");
    let ids: Vec<_> = listed.iter().map(|record| record.id.0.as_str()).collect();
    assert_eq!(ids, vec!["acc-000001", "acc-000002", "acc-000003", "acc-000004"]);
}
