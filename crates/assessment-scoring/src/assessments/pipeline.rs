use std::fmt;
use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Duration;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::catalog::{AptitudeCatalog, CatalogError, PersonalityCatalog};
use super::clock::{Clock, SystemClock};
use super::domain::{
    AptitudeScore, AssessmentKind, QuestionRow, SubjectId, SubmissionRecord, TraitScores,
};
use super::idempotency::{IdempotencyGuard, IdempotencyVerdict};
use super::rate_limit::{AllowAll, RateDecision, RateLimiter};
use super::scoring::{ScoringEngine, ScoringError};
use super::store::{
    AssessmentStore, NewSubmission, RequestCredentials, StoreConnector, StoreError,
};
use super::validation::{
    decode_body, verify_trait_scores, AnswerRejection, AnswerSheet, ChoiceScale, LikertScale,
    OutputFault, ResponseScale,
};

/// Linear progression of a submission; failures are tagged with the stage that detected them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    BodyParsed,
    Authenticated,
    RateChecked,
    IdempotencyChecked,
    QuestionsFetched,
    AnswersValidated,
    Scored,
    OutputValidated,
    Persisted,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::BodyParsed => "body_parsed",
            Stage::Authenticated => "authenticated",
            Stage::RateChecked => "rate_checked",
            Stage::IdempotencyChecked => "idempotency_checked",
            Stage::QuestionsFetched => "questions_fetched",
            Stage::AnswersValidated => "answers_validated",
            Stage::Scored => "scored",
            Stage::OutputValidated => "output_validated",
            Stage::Persisted => "persisted",
        };
        f.write_str(label)
    }
}

/// Why a persistence write is treated as failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceFault {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("insert succeeded but the stored row was not returned")]
    NotReturned,
}

/// Terminal failure of the submission pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Input(#[from] AnswerRejection),
    #[error("authentication required")]
    Unauthorized,
    #[error("rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("submission already received, retry in {retry_after_secs}s")]
    Duplicate { retry_after_secs: u64 },
    #[error("store unavailable during {stage}: {source}")]
    Unavailable { stage: Stage, source: StoreError },
    #[error("question catalog failed integrity checks: {0}")]
    Catalog(#[from] CatalogError),
    #[error("score calculation failed: {0}")]
    Calculation(#[from] ScoringError),
    #[error("score output failed validation: {0}")]
    InvalidOutput(#[from] OutputFault),
    #[error("persisting submission failed: {0}")]
    Persistence(#[from] PersistenceFault),
}

impl SubmissionError {
    pub fn stage(&self) -> Stage {
        match self {
            SubmissionError::Input(AnswerRejection::InvalidBody(_))
            | SubmissionError::Input(AnswerRejection::AnswerCount { .. })
            | SubmissionError::Input(AnswerRejection::InvalidValue { .. }) => Stage::BodyParsed,
            SubmissionError::Input(_) => Stage::AnswersValidated,
            SubmissionError::Unauthorized => Stage::Authenticated,
            SubmissionError::RateLimited { .. } => Stage::RateChecked,
            SubmissionError::Duplicate { .. } => Stage::IdempotencyChecked,
            SubmissionError::Unavailable { stage, .. } => *stage,
            SubmissionError::Catalog(_) => Stage::QuestionsFetched,
            SubmissionError::Calculation(_) => Stage::Scored,
            SubmissionError::InvalidOutput(_) => Stage::OutputValidated,
            SubmissionError::Persistence(_) => Stage::Persisted,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            SubmissionError::Input(_) => StatusCode::BAD_REQUEST,
            SubmissionError::Unauthorized => StatusCode::UNAUTHORIZED,
            SubmissionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SubmissionError::Duplicate { .. } => StatusCode::CONFLICT,
            SubmissionError::Unavailable { .. } | SubmissionError::Catalog(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            SubmissionError::Calculation(_)
            | SubmissionError::InvalidOutput(_)
            | SubmissionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SubmissionError::Input(rejection) => rejection.code(),
            SubmissionError::Unauthorized => "UNAUTHORIZED",
            SubmissionError::RateLimited { .. } => "RATE_LIMITED",
            SubmissionError::Duplicate { .. } => "DUPLICATE_SUBMISSION",
            SubmissionError::Unavailable { .. } => "STORE_UNAVAILABLE",
            SubmissionError::Catalog(CatalogError::QuestionCount { .. }) => {
                "INVALID_QUESTION_COUNT"
            }
            SubmissionError::Catalog(_) => "INVALID_QUESTION_METADATA",
            SubmissionError::Calculation(_) => "CALCULATION_FAILED",
            SubmissionError::InvalidOutput(_) => "INVALID_OUTPUT",
            SubmissionError::Persistence(_) => "DB_INSERT_FAILED",
        }
    }

    /// Message safe to show the caller. Internal faults stay generic.
    pub fn public_message(&self) -> String {
        match self {
            SubmissionError::Input(rejection) => match rejection {
                AnswerRejection::InvalidBody(_) => "Invalid request body".to_string(),
                AnswerRejection::AnswerCount { expected, .. } => {
                    format!("Exactly {expected} answers are required")
                }
                AnswerRejection::InvalidValue { .. } => "Invalid answer value".to_string(),
                AnswerRejection::UnknownQuestionIds(_) => {
                    "Answers reference unknown questions".to_string()
                }
                AnswerRejection::IncompleteAnswers(_) => {
                    "All questions must be answered".to_string()
                }
                AnswerRejection::SetMismatch { .. } => {
                    "Answers do not match the active questions".to_string()
                }
            },
            SubmissionError::Unauthorized => "Unauthorized".to_string(),
            SubmissionError::RateLimited { .. } => "Too many submissions".to_string(),
            SubmissionError::Duplicate { .. } => {
                "This assessment was just submitted, please wait before retrying".to_string()
            }
            SubmissionError::Unavailable { .. } | SubmissionError::Catalog(_) => {
                "Assessment temporarily unavailable".to_string()
            }
            SubmissionError::Calculation(_) => "Failed to calculate scores".to_string(),
            SubmissionError::InvalidOutput(_) => "Failed to validate scores".to_string(),
            SubmissionError::Persistence(_) => "Failed to save results".to_string(),
        }
    }

    /// User-actionable detail; only input errors carry one.
    pub fn details(&self) -> Option<String> {
        match self {
            SubmissionError::Input(rejection) => Some(rejection.to_string()),
            _ => None,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            SubmissionError::RateLimited { retry_after_secs }
            | SubmissionError::Duplicate { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    fn log(&self, kind: AssessmentKind) {
        let stage = self.stage();
        let code = self.code();
        match self {
            SubmissionError::Input(_) | SubmissionError::Unauthorized => {
                debug!(
                    assessment = kind.label(),
                    %stage,
                    code,
                    error = %self,
                    "submission rejected"
                );
            }
            SubmissionError::RateLimited { .. } | SubmissionError::Duplicate { .. } => {
                warn!(
                    assessment = kind.label(),
                    %stage,
                    code,
                    error = %self,
                    "submission refused"
                );
            }
            SubmissionError::Unavailable { .. } | SubmissionError::Catalog(_) => {
                error!(
                    assessment = kind.label(),
                    %stage,
                    code,
                    error = %self,
                    "service integrity fault"
                );
            }
            SubmissionError::Calculation(_) | SubmissionError::InvalidOutput(_) => {
                error!(
                    assessment = kind.label(),
                    %stage,
                    code,
                    error = %self,
                    "scoring integrity fault"
                );
            }
            SubmissionError::Persistence(_) => {
                error!(
                    assessment = kind.label(),
                    %stage,
                    code,
                    error = %self,
                    "persistence fault"
                );
            }
        }
    }
}

/// Successful submission: the computed score plus the row that was stored.
#[derive(Debug, Clone)]
pub struct ScoredSubmission<T> {
    pub score: T,
    pub record: SubmissionRecord,
}

/// Question as exposed to clients; answer keys and polarity are withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub category: String,
    pub prompt: String,
}

struct Admitted<Sess, S: ResponseScale> {
    session: Sess,
    subject: SubjectId,
    sheet: AnswerSheet<S>,
    rows: Vec<QuestionRow>,
}

/// Orchestrates validation, duplicate detection, scoring, output checks and persistence.
pub struct SubmissionPipeline<C> {
    connector: Arc<C>,
    guard: IdempotencyGuard,
    limiter: Arc<dyn RateLimiter>,
    clock: Arc<dyn Clock>,
    engine: ScoringEngine,
}

impl<C> SubmissionPipeline<C>
where
    C: StoreConnector + 'static,
{
    pub fn new(connector: Arc<C>) -> Self {
        Self {
            connector,
            guard: IdempotencyGuard::default(),
            limiter: Arc::new(AllowAll),
            clock: Arc::new(SystemClock),
            engine: ScoringEngine::new(),
        }
    }

    pub fn with_idempotency_window(mut self, window: Duration) -> Self {
        self.guard = IdempotencyGuard::new(window);
        self
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validate, score and store a Likert inventory submission.
    pub fn submit_personality(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<ScoredSubmission<TraitScores>, SubmissionError> {
        let kind = AssessmentKind::Personality;
        self.run_personality(credentials, body)
            .inspect(|outcome| log_success(kind, &outcome.record))
            .inspect_err(|err| err.log(kind))
    }

    /// Validate, score and store an aptitude submission.
    pub fn submit_aptitude(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<ScoredSubmission<AptitudeScore>, SubmissionError> {
        let kind = AssessmentKind::Aptitude;
        self.run_aptitude(credentials, body)
            .inspect(|outcome| log_success(kind, &outcome.record))
            .inspect_err(|err| err.log(kind))
    }

    /// Active questions for rendering a form.
    pub fn questions(
        &self,
        credentials: &RequestCredentials,
        kind: AssessmentKind,
    ) -> Result<Vec<QuestionView>, SubmissionError> {
        self.list_questions(credentials, kind)
            .inspect_err(|err| err.log(kind))
    }

    fn list_questions(
        &self,
        credentials: &RequestCredentials,
        kind: AssessmentKind,
    ) -> Result<Vec<QuestionView>, SubmissionError> {
        let (session, _subject) = self.authenticate(credentials)?;
        let rows = fetch_questions(&session, kind)?;
        match kind {
            AssessmentKind::Personality => {
                PersonalityCatalog::from_rows(&rows)?;
            }
            AssessmentKind::Aptitude => {
                AptitudeCatalog::from_rows(&rows)?;
            }
        }

        Ok(rows
            .into_iter()
            .map(|row| QuestionView {
                id: row.id,
                category: row.category,
                prompt: row.prompt,
            })
            .collect())
    }

    fn run_personality(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<ScoredSubmission<TraitScores>, SubmissionError> {
        let Admitted {
            session,
            subject,
            sheet,
            rows,
        } = self.admit::<LikertScale>(credentials, body)?;

        let catalog = PersonalityCatalog::from_rows(&rows)?;
        let answers = sheet.reconcile(&catalog.ids())?;
        let scores = self.engine.score_personality(&catalog, &answers)?;
        let verified = verify_trait_scores(scores.to_json())?;

        let submission =
            NewSubmission::personality(subject, verified, answers.raw(), self.clock.now());
        let record = persist(&session, submission)?;

        Ok(ScoredSubmission {
            score: scores,
            record,
        })
    }

    fn run_aptitude(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<ScoredSubmission<AptitudeScore>, SubmissionError> {
        let Admitted {
            session,
            subject,
            sheet,
            rows,
        } = self.admit::<ChoiceScale>(credentials, body)?;

        let catalog = AptitudeCatalog::from_rows(&rows)?;
        let answers = sheet.reconcile(&catalog.ids())?;
        let score = self.engine.score_aptitude(&catalog, &answers)?;

        let submission = NewSubmission::aptitude(subject, &score, answers.raw(), self.clock.now());
        let record = persist(&session, submission)?;

        Ok(ScoredSubmission { score, record })
    }

    /// Shared front half: body checks, authentication, rate limit, duplicate check and
    /// question fetch.
    fn admit<S: ResponseScale>(
        &self,
        credentials: &RequestCredentials,
        body: &[u8],
    ) -> Result<Admitted<C::Session, S>, SubmissionError> {
        let answers = decode_body(body)?;
        let sheet = AnswerSheet::<S>::parse(answers)?;

        let (session, subject) = self.authenticate(credentials)?;
        let now = self.clock.now();

        if let RateDecision::Limited { retry_after_secs } = self.limiter.admit(&subject, now) {
            return Err(SubmissionError::RateLimited { retry_after_secs });
        }

        if let IdempotencyVerdict::Duplicate { retry_after_secs } =
            self.guard.check(&session, &subject, S::KIND, now)
        {
            return Err(SubmissionError::Duplicate { retry_after_secs });
        }

        let rows = fetch_questions(&session, S::KIND)?;

        Ok(Admitted {
            session,
            subject,
            sheet,
            rows,
        })
    }

    fn authenticate(
        &self,
        credentials: &RequestCredentials,
    ) -> Result<(C::Session, SubjectId), SubmissionError> {
        let session =
            self.connector
                .connect(credentials)
                .map_err(|source| SubmissionError::Unavailable {
                    stage: Stage::Authenticated,
                    source,
                })?;

        let subject = session
            .current_subject()
            .map_err(|source| SubmissionError::Unavailable {
                stage: Stage::Authenticated,
                source,
            })?
            .ok_or(SubmissionError::Unauthorized)?;

        Ok((session, subject))
    }
}

fn fetch_questions<S: AssessmentStore>(
    session: &S,
    kind: AssessmentKind,
) -> Result<Vec<QuestionRow>, SubmissionError> {
    session
        .active_questions(kind)
        .map_err(|source| SubmissionError::Unavailable {
            stage: Stage::QuestionsFetched,
            source,
        })
}

fn persist<S: AssessmentStore>(
    session: &S,
    submission: NewSubmission,
) -> Result<SubmissionRecord, SubmissionError> {
    let stored = session
        .insert_submission(submission)
        .map_err(PersistenceFault::Store)?;
    stored.ok_or_else(|| PersistenceFault::NotReturned.into())
}

fn log_success(kind: AssessmentKind, record: &SubmissionRecord) {
    info!(
        subject = %record.subject,
        assessment = kind.label(),
        created_at = %record.created_at,
        "assessment submission stored"
    );
}
