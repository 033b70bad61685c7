use super::super::domain::{EvaluationCriteria, EvaluationStatus};
use super::super::rubric::RubricSchema;
use super::{CriticalFailure, ScoreResult, SectionScore};

pub(crate) fn percentage(score: u32, max_score: u32) -> f64 {
    if max_score == 0 {
        0.0
    } else {
        f64::from(score) / f64::from(max_score) * 100.0
    }
}

/// Walk the rubric in order; items absent from the criteria score zero and
/// criteria keys the rubric does not define are never visited.
pub(crate) fn score_criteria(rubric: &RubricSchema, criteria: &EvaluationCriteria) -> ScoreResult {
    let mut per_section = Vec::with_capacity(rubric.sections().len());
    let mut critical_failures = Vec::new();
    let mut total_score = 0;
    let mut max_score = 0;

    for section in rubric.sections() {
        let mut section_score = 0;
        for item in &section.items {
            let rating = criteria.item(&section.key, &item.key);
            let status = rating.map(|entry| entry.status).unwrap_or_default();
            section_score += status.points();

            if item.critical && status == EvaluationStatus::NotAcceptable {
                critical_failures.push(CriticalFailure {
                    section: section.key.clone(),
                    item: item.key.clone(),
                    label: item.label.clone(),
                    alternative: rating
                        .map(|entry| entry.alternative.trim().to_string())
                        .filter(|alternative| !alternative.is_empty()),
                });
            }
        }

        let section_max = section.max_score();
        per_section.push(SectionScore {
            section: section.key.clone(),
            label: section.label.clone(),
            score: section_score,
            max_score: section_max,
            percentage: percentage(section_score, section_max),
        });
        total_score += section_score;
        max_score += section_max;
    }

    ScoreResult {
        total_score,
        max_score,
        percentage: percentage(total_score, max_score),
        has_critical_failure: !critical_failures.is_empty(),
        per_section,
        critical_failures,
    }
}

/// Labels of the items rated below acceptable, in rubric order.
pub(crate) fn shortfalls(rubric: &RubricSchema, criteria: &EvaluationCriteria) -> Vec<String> {
    rubric
        .sections()
        .iter()
        .flat_map(|section| {
            section
                .items
                .iter()
                .filter(|item| {
                    criteria.status(&section.key, &item.key) != EvaluationStatus::Acceptable
                })
                .map(|item| item.label.clone())
        })
        .collect()
}
