use std::collections::BTreeMap;

use super::{ScoreBreakdown, ScoringError};
use crate::assessments::catalog::PersonalityCatalog;
use crate::assessments::domain::{
    PersonalityTrait, Polarity, TraitScores, LIKERT_MAX, LIKERT_MIN,
};
use crate::assessments::validation::ValidatedAnswers;

/// Reflect a reverse-keyed response around the scale midpoint.
pub(crate) fn keyed_response(raw: u8, polarity: Polarity) -> u8 {
    match polarity {
        Polarity::Normal => raw,
        Polarity::Reverse => LIKERT_MIN + LIKERT_MAX - raw,
    }
}

pub(crate) fn accumulate(
    catalog: &PersonalityCatalog,
    answers: &ValidatedAnswers<u8>,
) -> Result<BTreeMap<PersonalityTrait, ScoreBreakdown>, ScoringError> {
    let mut breakdown: BTreeMap<PersonalityTrait, ScoreBreakdown> = PersonalityTrait::ALL
        .into_iter()
        .map(|item| (item, ScoreBreakdown::default()))
        .collect();

    for question in catalog.questions() {
        let raw = answers
            .get(&question.id)
            .ok_or_else(|| ScoringError::MissingAnswer(question.id.0.clone()))?;
        let entry = breakdown.entry(question.personality_trait).or_default();
        entry.sum += u32::from(keyed_response(raw, question.polarity));
        entry.count += 1;
    }

    Ok(breakdown)
}

/// Rescale each trait sum to `[0, 100]` using the number of items that fed it.
pub(crate) fn normalize(
    breakdown: &BTreeMap<PersonalityTrait, ScoreBreakdown>,
) -> Result<TraitScores, ScoringError> {
    let mut scores = BTreeMap::new();
    for (personality_trait, totals) in breakdown {
        if totals.count == 0 {
            return Err(ScoringError::EmptyTrait(*personality_trait));
        }

        let min_possible = f64::from(totals.count * u32::from(LIKERT_MIN));
        let max_possible = f64::from(totals.count * u32::from(LIKERT_MAX));
        let ratio = (f64::from(totals.sum) - min_possible) / (max_possible - min_possible);
        let clamped = (ratio * 100.0).clamp(0.0, 100.0);
        scores.insert(*personality_trait, round_to_hundredths(clamped));
    }
    Ok(TraitScores(scores))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_keying_stays_on_scale() {
        assert_eq!(keyed_response(1, Polarity::Reverse), 5);
        assert_eq!(keyed_response(3, Polarity::Reverse), 3);
        assert_eq!(keyed_response(5, Polarity::Reverse), 1);
        assert_eq!(keyed_response(4, Polarity::Normal), 4);
    }

    #[test]
    fn uneven_trait_sizes_normalize_independently() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            PersonalityTrait::Openness,
            ScoreBreakdown { sum: 9, count: 3 },
        );
        breakdown.insert(
            PersonalityTrait::Neuroticism,
            ScoreBreakdown { sum: 7, count: 1 },
        );

        match normalize(&breakdown) {
            Ok(scores) => {
                assert_eq!(scores.get(PersonalityTrait::Openness), Some(50.0));
                assert_eq!(scores.get(PersonalityTrait::Neuroticism), Some(100.0));
            }
            Err(err) => panic!("normalization failed: {err}"),
        }
    }

    #[test]
    fn two_decimal_rounding() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(
            PersonalityTrait::Agreeableness,
            ScoreBreakdown { sum: 4, count: 3 },
        );
        let scores = normalize(&breakdown).expect("normalizes");
        assert_eq!(scores.get(PersonalityTrait::Agreeableness), Some(8.33));
    }

    #[test]
    fn empty_trait_fails_the_computation() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert(PersonalityTrait::Openness, ScoreBreakdown::default());
        assert_eq!(
            normalize(&breakdown),
            Err(ScoringError::EmptyTrait(PersonalityTrait::Openness))
        );
    }
}
