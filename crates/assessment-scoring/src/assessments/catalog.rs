use std::collections::BTreeSet;

use super::domain::{
    AnswerOption, AptitudeCategory, AptitudeQuestion, AssessmentKind, PersonalityQuestion,
    PersonalityTrait, Polarity, QuestionId, QuestionRow,
};

/// Integrity faults in the question data handed over by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("{kind:?} catalog holds {found} active questions, expected {expected}")]
    QuestionCount {
        kind: AssessmentKind,
        expected: usize,
        found: usize,
    },
    #[error("question {id} has unknown category '{category}'")]
    UnknownCategory { id: String, category: String },
    #[error("question {id} has invalid polarity {polarity:?}")]
    InvalidPolarity { id: String, polarity: Option<i64> },
    #[error("question {id} has invalid correct option {option:?}")]
    InvalidCorrectOption { id: String, option: Option<String> },
    #[error("question id '{0}' appears more than once")]
    DuplicateId(String),
}

/// Validated Likert question set for one submission.
#[derive(Debug, Clone)]
pub struct PersonalityCatalog {
    questions: Vec<PersonalityQuestion>,
}

impl PersonalityCatalog {
    pub fn from_rows(rows: &[QuestionRow]) -> Result<Self, CatalogError> {
        check_shape(AssessmentKind::Personality, rows)?;

        let questions = rows
            .iter()
            .map(|row| {
                let personality_trait = PersonalityTrait::from_label(row.category.trim())
                    .ok_or_else(|| CatalogError::UnknownCategory {
                        id: row.id.clone(),
                        category: row.category.clone(),
                    })?;
                let polarity = row.polarity.and_then(Polarity::from_sign).ok_or_else(|| {
                    CatalogError::InvalidPolarity {
                        id: row.id.clone(),
                        polarity: row.polarity,
                    }
                })?;
                Ok(PersonalityQuestion {
                    id: QuestionId(row.id.clone()),
                    personality_trait,
                    polarity,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { questions })
    }

    /// Bypasses the count check; used to score synthetic or partial inventories.
    pub fn from_questions(questions: Vec<PersonalityQuestion>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[PersonalityQuestion] {
        &self.questions
    }

    pub fn ids(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.id.0.as_str()).collect()
    }
}

/// Validated aptitude question set including the answer key.
#[derive(Debug, Clone)]
pub struct AptitudeCatalog {
    questions: Vec<AptitudeQuestion>,
}

impl AptitudeCatalog {
    pub fn from_rows(rows: &[QuestionRow]) -> Result<Self, CatalogError> {
        check_shape(AssessmentKind::Aptitude, rows)?;

        let questions = rows
            .iter()
            .map(|row| {
                let category = AptitudeCategory::from_label(row.category.trim()).ok_or_else(
                    || CatalogError::UnknownCategory {
                        id: row.id.clone(),
                        category: row.category.clone(),
                    },
                )?;
                let correct_option = row
                    .correct_option
                    .as_deref()
                    .and_then(AnswerOption::parse)
                    .ok_or_else(|| CatalogError::InvalidCorrectOption {
                        id: row.id.clone(),
                        option: row.correct_option.clone(),
                    })?;
                Ok(AptitudeQuestion {
                    id: QuestionId(row.id.clone()),
                    category,
                    correct_option,
                })
            })
            .collect::<Result<Vec<_>, CatalogError>>()?;

        Ok(Self { questions })
    }

    pub fn from_questions(questions: Vec<AptitudeQuestion>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[AptitudeQuestion] {
        &self.questions
    }

    pub fn ids(&self) -> BTreeSet<&str> {
        self.questions.iter().map(|q| q.id.0.as_str()).collect()
    }
}

fn check_shape(kind: AssessmentKind, rows: &[QuestionRow]) -> Result<(), CatalogError> {
    if rows.len() != kind.expected_questions() {
        return Err(CatalogError::QuestionCount {
            kind,
            expected: kind.expected_questions(),
            found: rows.len(),
        });
    }

    let mut seen = BTreeSet::new();
    for row in rows {
        if !seen.insert(row.id.as_str()) {
            return Err(CatalogError::DuplicateId(row.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessments::bank::QuestionBank;

    #[test]
    fn standard_bank_passes_catalog_checks() {
        let bank = QuestionBank::standard();
        let personality =
            PersonalityCatalog::from_rows(bank.rows(AssessmentKind::Personality)).expect("valid");
        let aptitude =
            AptitudeCatalog::from_rows(bank.rows(AssessmentKind::Aptitude)).expect("valid");
        assert_eq!(personality.questions().len(), 50);
        assert_eq!(aptitude.questions().len(), 30);
    }

    #[test]
    fn short_catalog_is_a_count_fault() {
        let bank = QuestionBank::standard();
        let rows = &bank.rows(AssessmentKind::Personality)[..49];
        match PersonalityCatalog::from_rows(rows) {
            Err(CatalogError::QuestionCount {
                expected: 50,
                found: 49,
                ..
            }) => {}
            other => panic!("expected count fault, got {other:?}"),
        }
    }

    #[test]
    fn zero_polarity_is_rejected() {
        let bank = QuestionBank::standard();
        let mut rows = bank.rows(AssessmentKind::Personality).to_vec();
        rows[3].polarity = Some(0);
        assert!(matches!(
            PersonalityCatalog::from_rows(&rows),
            Err(CatalogError::InvalidPolarity { .. })
        ));
    }

    #[test]
    fn lowercase_answer_key_is_rejected() {
        let bank = QuestionBank::standard();
        let mut rows = bank.rows(AssessmentKind::Aptitude).to_vec();
        rows[0].correct_option = Some("b".to_string());
        assert!(matches!(
            AptitudeCatalog::from_rows(&rows),
            Err(CatalogError::InvalidCorrectOption { .. })
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let bank = QuestionBank::standard();
        let mut rows = bank.rows(AssessmentKind::Aptitude).to_vec();
        rows[1].id = rows[0].id.clone();
        assert!(matches!(
            AptitudeCatalog::from_rows(&rows),
            Err(CatalogError::DuplicateId(_))
        ));
    }
}
