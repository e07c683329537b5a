use std::collections::BTreeMap;

use super::ScoringError;
use crate::assessments::catalog::AptitudeCatalog;
use crate::assessments::domain::{AnswerOption, AptitudeCategory, AptitudeScore};
use crate::assessments::validation::ValidatedAnswers;

pub(crate) fn tally(
    catalog: &AptitudeCatalog,
    answers: &ValidatedAnswers<AnswerOption>,
) -> Result<AptitudeScore, ScoringError> {
    let expected = catalog.questions().len();
    if expected == 0 {
        return Err(ScoringError::EmptyCatalog);
    }

    let mut breakdown: BTreeMap<AptitudeCategory, u32> = AptitudeCategory::ALL
        .into_iter()
        .map(|category| (category, 0))
        .collect();
    let mut score_total = 0u32;

    for question in catalog.questions() {
        let selected = answers
            .get(&question.id)
            .ok_or_else(|| ScoringError::MissingAnswer(question.id.0.clone()))?;
        if selected == question.correct_option {
            score_total += 1;
            *breakdown.entry(question.category).or_insert(0) += 1;
        }
    }

    let percentage = (f64::from(score_total) / expected as f64 * 100.0).round() as u32;

    Ok(AptitudeScore {
        score_total,
        breakdown,
        percentage,
    })
}
