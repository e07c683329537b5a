use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;

use serde_json::{Map, Value};

use crate::assessments::domain::{
    AnswerOption, AssessmentKind, QuestionId, LIKERT_MAX, LIKERT_MIN,
};

/// User-facing rejection of a submitted answer set. Checks run in declaration order and the
/// first failing one is reported; per-answer faults name the first offending answer in the
/// order the client sent them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnswerRejection {
    #[error("request body is invalid: {0}")]
    InvalidBody(String),
    #[error("expected exactly {expected} answers, received {found}")]
    AnswerCount { expected: usize, found: usize },
    #[error("answer for question {question_id} is not a valid response")]
    InvalidValue { question_id: String },
    #[error("answers reference unknown questions: {}", .0.join(", "))]
    UnknownQuestionIds(Vec<String>),
    #[error("answers are missing for questions: {}", .0.join(", "))]
    IncompleteAnswers(Vec<String>),
    #[error("answer set covers {answers} questions but the catalog holds {questions}")]
    SetMismatch { answers: usize, questions: usize },
}

impl AnswerRejection {
    pub fn code(&self) -> &'static str {
        match self {
            AnswerRejection::InvalidBody(_) => "INVALID_BODY",
            AnswerRejection::AnswerCount { .. } => "INVALID_ANSWER_COUNT",
            AnswerRejection::InvalidValue { .. } => "INVALID_ANSWER_VALUE",
            AnswerRejection::UnknownQuestionIds(_) => "UNKNOWN_QUESTION_IDS",
            AnswerRejection::IncompleteAnswers(_) => "INCOMPLETE_ANSWERS",
            AnswerRejection::SetMismatch { .. } => "ANSWER_SET_MISMATCH",
        }
    }
}

/// Response alphabet of an assessment.
pub trait ResponseScale {
    type Value: Copy + std::fmt::Debug;

    const KIND: AssessmentKind;

    fn parse(value: &Value) -> Option<Self::Value>;
}

/// Integer responses in `[1, 5]`.
#[derive(Debug, Clone, Copy)]
pub struct LikertScale;

impl ResponseScale for LikertScale {
    type Value = u8;

    const KIND: AssessmentKind = AssessmentKind::Personality;

    fn parse(value: &Value) -> Option<u8> {
        let Value::Number(number) = value else {
            return None;
        };
        let raw = match number.as_i64() {
            Some(integer) => integer,
            None => {
                let float = number.as_f64()?;
                if !float.is_finite() || float.fract() != 0.0 {
                    return None;
                }
                float as i64
            }
        };

        if (i64::from(LIKERT_MIN)..=i64::from(LIKERT_MAX)).contains(&raw) {
            Some(raw as u8)
        } else {
            None
        }
    }
}

/// Single option symbol `A..D`.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceScale;

impl ResponseScale for ChoiceScale {
    type Value = AnswerOption;

    const KIND: AssessmentKind = AssessmentKind::Aptitude;

    fn parse(value: &Value) -> Option<AnswerOption> {
        value.as_str().and_then(AnswerOption::parse)
    }
}

/// Answer set that passed the checks which need no question metadata.
#[derive(Debug, Clone)]
pub struct AnswerSheet<S: ResponseScale> {
    values: BTreeMap<QuestionId, S::Value>,
    raw: Map<String, Value>,
    _scale: PhantomData<S>,
}

/// Answer set in exact 1:1 correspondence with the active catalog.
#[derive(Debug, Clone)]
pub struct ValidatedAnswers<V> {
    values: BTreeMap<QuestionId, V>,
    raw: Map<String, Value>,
}

impl<V: Copy> ValidatedAnswers<V> {
    pub fn get(&self, id: &QuestionId) -> Option<V> {
        self.values.get(id).copied()
    }

    /// Answers exactly as submitted, kept for the submission record.
    pub fn raw(&self) -> Value {
        Value::Object(self.raw.clone())
    }
}

/// Decode a request body of the form `{ "answers": { <id>: <scalar>, ... } }`.
pub fn decode_body(body: &[u8]) -> Result<Map<String, Value>, AnswerRejection> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|err| AnswerRejection::InvalidBody(format!("malformed JSON ({err})")))?;

    let Value::Object(mut envelope) = document else {
        return Err(AnswerRejection::InvalidBody(
            "body must be a JSON object".to_string(),
        ));
    };

    match envelope.remove("answers") {
        Some(Value::Object(answers)) => {
            if answers.is_empty() {
                return Err(AnswerRejection::InvalidBody(
                    "answers must not be empty".to_string(),
                ));
            }
            if let Some((id, _)) = answers
                .iter()
                .find(|(_, value)| !is_scalar(value))
            {
                return Err(AnswerRejection::InvalidBody(format!(
                    "answer for question {id} must be a scalar value"
                )));
            }
            Ok(answers)
        }
        Some(Value::Array(_)) => Err(AnswerRejection::InvalidBody(
            "answers must be an object keyed by question id, not an array".to_string(),
        )),
        Some(_) => Err(AnswerRejection::InvalidBody(
            "answers must be an object keyed by question id".to_string(),
        )),
        None => Err(AnswerRejection::InvalidBody(
            "answers field is required".to_string(),
        )),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::Bool(_) | Value::Number(_) | Value::String(_))
}

impl<S: ResponseScale> AnswerSheet<S> {
    /// Cardinality and per-answer range checks against the assessment's fixed form.
    pub fn parse(answers: Map<String, Value>) -> Result<Self, AnswerRejection> {
        let expected = S::KIND.expected_questions();
        if answers.len() != expected {
            return Err(AnswerRejection::AnswerCount {
                expected,
                found: answers.len(),
            });
        }

        let mut values = BTreeMap::new();
        for (id, value) in &answers {
            let parsed = S::parse(value).ok_or_else(|| AnswerRejection::InvalidValue {
                question_id: id.clone(),
            })?;
            values.insert(QuestionId(id.clone()), parsed);
        }

        Ok(Self {
            values,
            raw: answers,
            _scale: PhantomData,
        })
    }

    /// Referential integrity against the active question ids.
    pub fn reconcile(
        self,
        question_ids: &BTreeSet<&str>,
    ) -> Result<ValidatedAnswers<S::Value>, AnswerRejection> {
        let unknown: Vec<String> = self
            .values
            .keys()
            .filter(|id| !question_ids.contains(id.0.as_str()))
            .map(|id| id.0.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(AnswerRejection::UnknownQuestionIds(unknown));
        }

        let missing: Vec<String> = question_ids
            .iter()
            .filter(|id| !self.values.contains_key(&QuestionId((**id).to_string())))
            .map(|id| (*id).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AnswerRejection::IncompleteAnswers(missing));
        }

        if self.values.len() != question_ids.len() {
            return Err(AnswerRejection::SetMismatch {
                answers: self.values.len(),
                questions: question_ids.len(),
            });
        }

        Ok(ValidatedAnswers {
            values: self.values,
            raw: self.raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn likert_body(count: usize, value: Value) -> Map<String, Value> {
        (1..=count)
            .map(|index| (format!("bf-{index:02}"), value.clone()))
            .collect()
    }

    #[test]
    fn decode_rejects_array_payloads() {
        let body = br#"{"answers": [1, 2, 3]}"#;
        assert!(matches!(
            decode_body(body),
            Err(AnswerRejection::InvalidBody(_))
        ));
    }

    #[test]
    fn decode_rejects_empty_and_nested_answers() {
        assert!(matches!(
            decode_body(br#"{"answers": {}}"#),
            Err(AnswerRejection::InvalidBody(_))
        ));
        assert!(matches!(
            decode_body(br#"{"answers": {"bf-01": {"value": 3}}}"#),
            Err(AnswerRejection::InvalidBody(_))
        ));
        assert!(matches!(
            decode_body(b"not json"),
            Err(AnswerRejection::InvalidBody(_))
        ));
    }

    #[test]
    fn count_check_wins_over_value_check() {
        let answers = likert_body(49, json!(9));
        match AnswerSheet::<LikertScale>::parse(answers) {
            Err(AnswerRejection::AnswerCount {
                expected: 50,
                found: 49,
            }) => {}
            other => panic!("expected count rejection, got {other:?}"),
        }
    }

    #[test]
    fn likert_values_must_be_whole_numbers_in_range() {
        assert_eq!(LikertScale::parse(&json!(1)), Some(1));
        assert_eq!(LikertScale::parse(&json!(5.0)), Some(5));
        assert_eq!(LikertScale::parse(&json!(0)), None);
        assert_eq!(LikertScale::parse(&json!(6)), None);
        assert_eq!(LikertScale::parse(&json!(2.5)), None);
        assert_eq!(LikertScale::parse(&json!("3")), None);
        assert_eq!(LikertScale::parse(&json!(true)), None);
    }

    #[test]
    fn first_offending_question_is_reported() {
        let mut answers = likert_body(50, json!(3));
        answers.insert("bf-07".to_string(), json!(0));
        answers.insert("bf-31".to_string(), json!(8));
        match AnswerSheet::<LikertScale>::parse(answers) {
            Err(AnswerRejection::InvalidValue { question_id }) => assert_eq!(question_id, "bf-07"),
            other => panic!("expected value rejection, got {other:?}"),
        }
    }

    #[test]
    fn offending_answer_follows_submission_order() {
        let mut body = String::from(r#"{"answers": {"bf-50": 9"#);
        for index in 1..=49 {
            let value = if index == 2 { 0 } else { 3 };
            body.push_str(&format!(r#", "bf-{index:02}": {value}"#));
        }
        body.push_str("}}");

        let answers = decode_body(body.as_bytes()).expect("well-formed body");
        match AnswerSheet::<LikertScale>::parse(answers) {
            Err(AnswerRejection::InvalidValue { question_id }) => assert_eq!(question_id, "bf-50"),
            other => panic!("expected value rejection, got {other:?}"),
        }
    }

    #[test]
    fn reconcile_reports_unknown_before_missing() {
        let mut answers = likert_body(50, json!(3));
        answers.remove("bf-50");
        answers.insert("bf-99".to_string(), json!(3));
        let sheet = AnswerSheet::<LikertScale>::parse(answers).expect("shape valid");

        let ids: Vec<String> = (1..=50).map(|index| format!("bf-{index:02}")).collect();
        let question_ids: BTreeSet<&str> = ids.iter().map(String::as_str).collect();

        match sheet.reconcile(&question_ids) {
            Err(AnswerRejection::UnknownQuestionIds(unknown)) => {
                assert_eq!(unknown, vec!["bf-99".to_string()])
            }
            other => panic!("expected unknown ids, got {other:?}"),
        }
    }

    #[test]
    fn reconcile_reports_missing_questions() {
        let answers = likert_body(50, json!(3));
        let sheet = AnswerSheet::<LikertScale>::parse(answers).expect("shape valid");

        let mut ids: Vec<String> = (1..=50).map(|index| format!("bf-{index:02}")).collect();
        ids.push("bf-51".to_string());
        let question_ids: BTreeSet<&str> = ids.iter().map(String::as_str).collect();

        match sheet.reconcile(&question_ids) {
            Err(AnswerRejection::IncompleteAnswers(missing)) => {
                assert_eq!(missing, vec!["bf-51".to_string()])
            }
            other => panic!("expected incomplete answers, got {other:?}"),
        }
    }

    #[test]
    fn choice_scale_rejects_lowercase_and_out_of_alphabet() {
        assert_eq!(ChoiceScale::parse(&json!("A")), Some(AnswerOption::A));
        assert_eq!(ChoiceScale::parse(&json!("d")), None);
        assert_eq!(ChoiceScale::parse(&json!("E")), None);
        assert_eq!(ChoiceScale::parse(&json!(1)), None);
    }

    #[test]
    fn rejection_codes_are_distinct() {
        let codes: BTreeSet<&str> = [
            AnswerRejection::InvalidBody(String::new()).code(),
            AnswerRejection::AnswerCount {
                expected: 1,
                found: 0,
            }
            .code(),
            AnswerRejection::InvalidValue {
                question_id: String::new(),
            }
            .code(),
            AnswerRejection::UnknownQuestionIds(Vec::new()).code(),
            AnswerRejection::IncompleteAnswers(Vec::new()).code(),
            AnswerRejection::SetMismatch {
                answers: 0,
                questions: 0,
            }
            .code(),
        ]
        .into_iter()
        .collect();
        assert_eq!(codes.len(), 6);
    }
}
