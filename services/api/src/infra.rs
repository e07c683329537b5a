use assessment_scoring::assessments::{
    AssessmentKind, AssessmentStore, NewSubmission, QuestionBank, QuestionRow,
    RequestCredentials, StoreConnector, StoreError, SubjectId, SubmissionRecord,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreState {
    sessions: HashMap<String, SubjectId>,
    questions: HashMap<AssessmentKind, Vec<QuestionRow>>,
    submissions: Vec<SubmissionRecord>,
}

/// Process-local stand-in for the external question/result store.
#[derive(Clone, Default)]
pub(crate) struct InMemoryAssessmentStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryAssessmentStore {
    pub(crate) fn seeded(bank: &QuestionBank) -> Self {
        let mut state = StoreState::default();
        for kind in AssessmentKind::ALL {
            state.questions.insert(kind, bank.rows(kind).to_vec());
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub(crate) fn with_session(self, token: &str, subject: SubjectId) -> Self {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .sessions
            .insert(token.to_string(), subject);
        self
    }

    #[cfg(test)]
    pub(crate) fn submissions(&self) -> Vec<SubmissionRecord> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .submissions
            .clone()
    }
}

pub(crate) struct InMemorySession {
    state: Arc<Mutex<StoreState>>,
    token: Option<String>,
}

impl InMemorySession {
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store mutex poisoned".to_string()))
    }
}

impl StoreConnector for InMemoryAssessmentStore {
    type Session = InMemorySession;

    fn connect(&self, credentials: &RequestCredentials) -> Result<InMemorySession, StoreError> {
        Ok(InMemorySession {
            state: self.state.clone(),
            token: credentials.session_token.clone(),
        })
    }
}

impl AssessmentStore for InMemorySession {
    fn current_subject(&self) -> Result<Option<SubjectId>, StoreError> {
        let Some(token) = self.token.as_deref() else {
            return Ok(None);
        };
        Ok(self.lock()?.sessions.get(token).cloned())
    }

    fn active_questions(&self, kind: AssessmentKind) -> Result<Vec<QuestionRow>, StoreError> {
        Ok(self.lock()?.questions.get(&kind).cloned().unwrap_or_default())
    }

    fn latest_submission_at(
        &self,
        subject: &SubjectId,
        kind: AssessmentKind,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .lock()?
            .submissions
            .iter()
            .filter(|record| &record.subject == subject && record.kind == kind)
            .map(|record| record.created_at)
            .max())
    }

    fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<SubmissionRecord>, StoreError> {
        let record = submission.into_record();
        self.lock()?.submissions.push(record.clone());
        Ok(Some(record))
    }
}

/// Parses `TOKEN=SUBJECT` session seeds given on the command line.
pub(crate) fn parse_session(raw: &str) -> Result<(String, SubjectId), String> {
    let (token, subject) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TOKEN=SUBJECT, got '{raw}'"))?;
    let token = token.trim();
    let subject = subject.trim();
    if token.is_empty() || subject.is_empty() {
        return Err(format!("token and subject must be non-empty in '{raw}'"));
    }
    Ok((token.to_string(), SubjectId(subject.to_string())))
}
