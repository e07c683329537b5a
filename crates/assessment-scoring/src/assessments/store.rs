use chrono::{DateTime, Utc};
use serde_json::Value;

use super::domain::{AptitudeScore, AssessmentKind, QuestionRow, SubjectId, SubmissionRecord};
use super::validation::VerifiedScores;

/// Credentials carried by an inbound request, used to open a store session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub session_token: Option<String>,
}

impl RequestCredentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            session_token: Some(token.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Opens a request-scoped session against the external store. Sessions are never shared
/// between requests.
pub trait StoreConnector: Send + Sync {
    type Session: AssessmentStore;

    fn connect(&self, credentials: &RequestCredentials) -> Result<Self::Session, StoreError>;
}

/// Operations the pipeline needs from the question/result store.
pub trait AssessmentStore {
    /// Subject bound to the session credentials, `None` when unauthenticated.
    fn current_subject(&self) -> Result<Option<SubjectId>, StoreError>;

    fn active_questions(&self, kind: AssessmentKind) -> Result<Vec<QuestionRow>, StoreError>;

    /// Creation time of the subject's most recent submission for `kind`.
    fn latest_submission_at(
        &self,
        subject: &SubjectId,
        kind: AssessmentKind,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Append a submission; returns the stored row, or `None` when the store did not
    /// echo it back.
    fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRecord>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

/// Insert request for a submission. Personality rows can only be built from scores that
/// passed output validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    subject: SubjectId,
    kind: AssessmentKind,
    score: Value,
    answers: Value,
    created_at: DateTime<Utc>,
}

impl NewSubmission {
    pub fn personality(
        subject: SubjectId,
        scores: VerifiedScores,
        answers: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            kind: AssessmentKind::Personality,
            score: scores.into_json(),
            answers,
            created_at,
        }
    }

    pub fn aptitude(
        subject: SubjectId,
        score: &AptitudeScore,
        answers: Value,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            subject,
            kind: AssessmentKind::Aptitude,
            score: serde_json::json!({
                "score_total": score.score_total,
                "breakdown": score.breakdown_json(),
                "percentage": score.percentage,
            }),
            answers,
            created_at,
        }
    }

    pub fn into_record(self) -> SubmissionRecord {
        SubmissionRecord {
            subject: self.subject,
            kind: self.kind,
            score: self.score,
            answers: self.answers,
            created_at: self.created_at,
        }
    }
}
