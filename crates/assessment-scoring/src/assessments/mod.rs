//! Assessment submission intake: answer validation, duplicate detection, scoring, output
//! checks and persistence handoff for the personality inventory and the aptitude test.

pub mod bank;
pub mod catalog;
pub mod clock;
pub mod domain;
pub mod idempotency;
pub mod pipeline;
pub mod rate_limit;
pub mod router;
pub mod scoring;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use bank::QuestionBank;
pub use catalog::{AptitudeCatalog, CatalogError, PersonalityCatalog};
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::{
    AnswerOption, AptitudeCategory, AptitudeScore, AssessmentKind, PersonalityTrait, Polarity,
    QuestionId, QuestionRow, SubjectId, SubmissionRecord, TraitScores,
};
pub use idempotency::{
    IdempotencyGuard, IdempotencyVerdict, DEFAULT_IDEMPOTENCY_WINDOW_SECS, DEGRADED_LOOKUPS_METRIC,
};
pub use pipeline::{
    PersistenceFault, QuestionView, ScoredSubmission, Stage, SubmissionError, SubmissionPipeline,
};
pub use rate_limit::{AllowAll, RateDecision, RateLimiter, WindowedRateLimiter};
pub use router::assessment_router;
pub use scoring::{ScoringEngine, ScoringError};
pub use store::{AssessmentStore, NewSubmission, RequestCredentials, StoreConnector, StoreError};
pub use validation::{AnswerRejection, OutputFault};
