use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use super::domain::{AssessmentKind, SubjectId};
use super::store::AssessmentStore;

pub const DEFAULT_IDEMPOTENCY_WINDOW_SECS: i64 = 60;

/// Counter of duplicate lookups that failed open, labelled by assessment.
pub const DEGRADED_LOOKUPS_METRIC: &str = "assessment_idempotency_degraded_lookups_total";

/// Outcome of the recent-submission lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdempotencyVerdict {
    Fresh,
    Duplicate { retry_after_secs: u64 },
    /// Lookup failed; the submission proceeds without duplicate protection.
    Degraded,
}

/// Detects a resubmission from the same subject inside the lookback window.
#[derive(Debug)]
pub struct IdempotencyGuard {
    window: Duration,
}

impl Default for IdempotencyGuard {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_IDEMPOTENCY_WINDOW_SECS))
    }
}

impl IdempotencyGuard {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn check<S>(
        &self,
        store: &S,
        subject: &SubjectId,
        kind: AssessmentKind,
        now: DateTime<Utc>,
    ) -> IdempotencyVerdict
    where
        S: AssessmentStore + ?Sized,
    {
        let latest = match store.latest_submission_at(subject, kind) {
            Ok(latest) => latest,
            Err(err) => {
                metrics::counter!(DEGRADED_LOOKUPS_METRIC, "assessment" => kind.label())
                    .increment(1);
                warn!(
                    %subject,
                    assessment = kind.label(),
                    error = %err,
                    "idempotency lookup failed, accepting submission without duplicate protection"
                );
                return IdempotencyVerdict::Degraded;
            }
        };

        match latest {
            Some(created_at) => self.verdict_for(created_at, now),
            None => IdempotencyVerdict::Fresh,
        }
    }

    fn verdict_for(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> IdempotencyVerdict {
        let age = (now - created_at).max(Duration::zero());
        if age >= self.window {
            return IdempotencyVerdict::Fresh;
        }

        let remaining_ms = (self.window - age).num_milliseconds();
        let retry_after_secs = ((remaining_ms + 999) / 1000).max(1) as u64;
        IdempotencyVerdict::Duplicate { retry_after_secs }
    }
}
