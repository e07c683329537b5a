mod aptitude;
mod likert;

use super::catalog::{AptitudeCatalog, PersonalityCatalog};
use super::domain::{AnswerOption, AptitudeScore, PersonalityTrait, TraitScores};
use super::validation::ValidatedAnswers;

/// Running total for one trait: raw keyed sum and number of contributing items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub sum: u32,
    pub count: u32,
}

/// Fault raised when a score cannot be computed from validated input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringError {
    #[error("trait {0:?} has no contributing questions")]
    EmptyTrait(PersonalityTrait),
    #[error("no answer recorded for question {0}")]
    MissingAnswer(String),
    #[error("aptitude catalog is empty")]
    EmptyCatalog,
}

/// Stateless scorer for both assessment forms.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine;

impl ScoringEngine {
    pub fn new() -> Self {
        Self
    }

    /// Trait-based Likert scoring with reverse keying and per-trait normalization.
    pub fn score_personality(
        &self,
        catalog: &PersonalityCatalog,
        answers: &ValidatedAnswers<u8>,
    ) -> Result<TraitScores, ScoringError> {
        let breakdown = likert::accumulate(catalog, answers)?;
        likert::normalize(&breakdown)
    }

    /// Correct-answer tally per category.
    pub fn score_aptitude(
        &self,
        catalog: &AptitudeCatalog,
        answers: &ValidatedAnswers<AnswerOption>,
    ) -> Result<AptitudeScore, ScoringError> {
        aptitude::tally(catalog, answers)
    }
}
