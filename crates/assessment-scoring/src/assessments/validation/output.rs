use serde_json::Value;

use crate::assessments::domain::PersonalityTrait;

/// Integrity fault in a computed personality score. Never caused by user input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OutputFault {
    #[error("score output is not a structured record")]
    NotARecord,
    #[error("score output is missing traits: {}", .0.join(", "))]
    MissingTraits(Vec<String>),
    #[error("score output carries unexpected keys: {}", .0.join(", "))]
    UnexpectedKeys(Vec<String>),
    #[error("trait {key} has out-of-range or non-numeric value {value}")]
    OutOfRange { key: String, value: Value },
}

/// Score payload that passed output validation. Only this type can be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedScores(Value);

impl VerifiedScores {
    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_json(self) -> Value {
        self.0
    }
}

/// Confirm the score is a record keyed by exactly the five traits with finite values in
/// `[0, 100]`.
pub fn verify_trait_scores(output: Value) -> Result<VerifiedScores, OutputFault> {
    let Value::Object(record) = &output else {
        return Err(OutputFault::NotARecord);
    };

    let missing: Vec<String> = PersonalityTrait::ALL
        .iter()
        .map(|item| item.label())
        .filter(|label| !record.contains_key(*label))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(OutputFault::MissingTraits(missing));
    }

    let unexpected: Vec<String> = record
        .keys()
        .filter(|key| PersonalityTrait::from_label(key).is_none())
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        return Err(OutputFault::UnexpectedKeys(unexpected));
    }

    for (key, value) in record {
        let within = value
            .as_f64()
            .map(|number| number.is_finite() && (0.0..=100.0).contains(&number))
            .unwrap_or(false);
        if !within {
            return Err(OutputFault::OutOfRange {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }

    Ok(VerifiedScores(output))
}
