use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for the person taking an assessment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(pub String);

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for a catalog question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two fixed-form assessments accepted by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentKind {
    Personality,
    Aptitude,
}

impl AssessmentKind {
    pub const ALL: [AssessmentKind; 2] = [AssessmentKind::Personality, AssessmentKind::Aptitude];

    /// Number of answers a complete submission carries.
    pub fn expected_questions(self) -> usize {
        match self {
            AssessmentKind::Personality => 50,
            AssessmentKind::Aptitude => 30,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AssessmentKind::Personality => "personality",
            AssessmentKind::Aptitude => "aptitude",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

/// Big Five dimension scored by the Likert inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl PersonalityTrait {
    pub const ALL: [PersonalityTrait; 5] = [
        PersonalityTrait::Openness,
        PersonalityTrait::Conscientiousness,
        PersonalityTrait::Extraversion,
        PersonalityTrait::Agreeableness,
        PersonalityTrait::Neuroticism,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PersonalityTrait::Openness => "openness",
            PersonalityTrait::Conscientiousness => "conscientiousness",
            PersonalityTrait::Extraversion => "extraversion",
            PersonalityTrait::Agreeableness => "agreeableness",
            PersonalityTrait::Neuroticism => "neuroticism",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.label() == value)
    }
}

/// Topic grouping for aptitude questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AptitudeCategory {
    Numerical,
    Verbal,
    Logical,
}

impl AptitudeCategory {
    pub const ALL: [AptitudeCategory; 3] = [
        AptitudeCategory::Numerical,
        AptitudeCategory::Verbal,
        AptitudeCategory::Logical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AptitudeCategory::Numerical => "numerical",
            AptitudeCategory::Verbal => "verbal",
            AptitudeCategory::Logical => "logical",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|item| item.label() == value)
    }
}

/// Whether a Likert response counts toward its trait as given or reflected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Normal,
    Reverse,
}

impl Polarity {
    pub fn from_sign(value: i64) -> Option<Self> {
        match value {
            1 => Some(Polarity::Normal),
            -1 => Some(Polarity::Reverse),
            _ => None,
        }
    }
}

/// Multiple-choice option symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerOption {
    A,
    B,
    C,
    D,
}

impl AnswerOption {
    pub const ALL: [AnswerOption; 4] = [
        AnswerOption::A,
        AnswerOption::B,
        AnswerOption::C,
        AnswerOption::D,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            AnswerOption::A => "A",
            AnswerOption::B => "B",
            AnswerOption::C => "C",
            AnswerOption::D => "D",
        }
    }

    /// Case-sensitive parse; `"a"` is not a valid option.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.symbol() == value)
    }
}

/// Inclusive bounds of a Likert response.
pub const LIKERT_MIN: u8 = 1;
pub const LIKERT_MAX: u8 = 5;

/// Untyped question row as the external store hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: String,
    pub category: String,
    pub prompt: String,
    #[serde(default)]
    pub polarity: Option<i64>,
    #[serde(default)]
    pub correct_option: Option<String>,
}

/// Likert inventory item after catalog validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalityQuestion {
    pub id: QuestionId,
    pub personality_trait: PersonalityTrait,
    pub polarity: Polarity,
}

/// Aptitude item after catalog validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptitudeQuestion {
    pub id: QuestionId,
    pub category: AptitudeCategory,
    pub correct_option: AnswerOption,
}

/// Normalized per-trait scores in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitScores(pub BTreeMap<PersonalityTrait, f64>);

impl TraitScores {
    pub fn get(&self, personality_trait: PersonalityTrait) -> Option<f64> {
        self.0.get(&personality_trait).copied()
    }

    /// Map keyed by trait label, the shape exposed to clients and storage.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .0
            .iter()
            .map(|(key, value)| (key.label().to_string(), serde_json::json!(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Aptitude result: correct answers per category plus the overall tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeScore {
    pub score_total: u32,
    pub breakdown: BTreeMap<AptitudeCategory, u32>,
    pub percentage: u32,
}

impl AptitudeScore {
    pub fn breakdown_json(&self) -> serde_json::Value {
        let map = self
            .breakdown
            .iter()
            .map(|(key, value)| (key.label().to_string(), serde_json::json!(value)))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

/// Append-only row persisted once per successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub subject: SubjectId,
    pub kind: AssessmentKind,
    pub score: serde_json::Value,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_options_are_case_sensitive() {
        assert_eq!(AnswerOption::parse("C"), Some(AnswerOption::C));
        assert_eq!(AnswerOption::parse("c"), None);
        assert_eq!(AnswerOption::parse("E"), None);
    }

    #[test]
    fn polarity_accepts_only_unit_signs() {
        assert_eq!(Polarity::from_sign(1), Some(Polarity::Normal));
        assert_eq!(Polarity::from_sign(-1), Some(Polarity::Reverse));
        assert_eq!(Polarity::from_sign(0), None);
        assert_eq!(Polarity::from_sign(2), None);
    }

    #[test]
    fn trait_scores_serialize_with_label_keys() {
        let scores = TraitScores(
            PersonalityTrait::ALL
                .into_iter()
                .map(|item| (item, 50.0))
                .collect(),
        );
        let json = scores.to_json();
        let object = json.as_object().expect("object");
        assert_eq!(object.len(), 5);
        assert_eq!(object.get("neuroticism"), Some(&serde_json::json!(50.0)));
    }
}
