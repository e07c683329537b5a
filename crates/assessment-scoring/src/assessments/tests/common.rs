use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Map, Value};

use crate::assessments::bank::QuestionBank;
use crate::assessments::catalog::{AptitudeCatalog, PersonalityCatalog};
use crate::assessments::clock::ManualClock;
use crate::assessments::domain::{
    AnswerOption, AssessmentKind, QuestionRow, SubjectId, SubmissionRecord,
};
use crate::assessments::pipeline::SubmissionPipeline;
use crate::assessments::store::{
    AssessmentStore, NewSubmission, RequestCredentials, StoreConnector, StoreError,
};
use crate::assessments::validation::{AnswerSheet, ChoiceScale, LikertScale, ValidatedAnswers};

pub(super) const TOKEN: &str = "token-ada";
pub(super) const SUBJECT: &str = "subject-ada";

pub(super) fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn credentials() -> RequestCredentials {
    RequestCredentials::bearer(TOKEN)
}

#[derive(Default)]
pub(super) struct MemoryState {
    pub(super) sessions: HashMap<String, SubjectId>,
    pub(super) questions: HashMap<AssessmentKind, Vec<QuestionRow>>,
    pub(super) submissions: Vec<SubmissionRecord>,
    pub(super) fail_lookups: bool,
    pub(super) fail_questions: bool,
    pub(super) fail_inserts: bool,
    pub(super) swallow_inserted_rows: bool,
}

/// Store double shared by every session it opens.
#[derive(Clone)]
pub(super) struct MemoryConnector {
    pub(super) state: Arc<Mutex<MemoryState>>,
}

impl Default for MemoryConnector {
    fn default() -> Self {
        let bank = QuestionBank::standard();
        let mut state = MemoryState::default();
        state
            .sessions
            .insert(TOKEN.to_string(), SubjectId(SUBJECT.to_string()));
        for kind in AssessmentKind::ALL {
            state.questions.insert(kind, bank.rows(kind).to_vec());
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }
}

impl MemoryConnector {
    pub(super) fn update(&self, apply: impl FnOnce(&mut MemoryState)) {
        let mut guard = self.state.lock().expect("store mutex poisoned");
        apply(&mut guard);
    }

    pub(super) fn submissions(&self) -> Vec<SubmissionRecord> {
        self.state
            .lock()
            .expect("store mutex poisoned")
            .submissions
            .clone()
    }
}

pub(super) struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
    token: Option<String>,
}

impl StoreConnector for MemoryConnector {
    type Session = MemorySession;

    fn connect(&self, credentials: &RequestCredentials) -> Result<MemorySession, StoreError> {
        Ok(MemorySession {
            state: self.state.clone(),
            token: credentials.session_token.clone(),
        })
    }
}

impl AssessmentStore for MemorySession {
    fn current_subject(&self) -> Result<Option<SubjectId>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        Ok(self
            .token
            .as_ref()
            .and_then(|token| guard.sessions.get(token))
            .cloned())
    }

    fn active_questions(&self, kind: AssessmentKind) -> Result<Vec<QuestionRow>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        if guard.fail_questions {
            return Err(StoreError::Unavailable("questions table offline".to_string()));
        }
        Ok(guard.questions.get(&kind).cloned().unwrap_or_default())
    }

    fn latest_submission_at(
        &self,
        subject: &SubjectId,
        kind: AssessmentKind,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let guard = self.state.lock().expect("store mutex poisoned");
        if guard.fail_lookups {
            return Err(StoreError::Unavailable("lookup timed out".to_string()));
        }
        Ok(guard
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
        let mut guard = self.state.lock().expect("store mutex poisoned");
        if guard.fail_inserts {
            return Err(StoreError::Rejected("constraint violation".to_string()));
        }
        let record = submission.into_record();
        guard.submissions.push(record.clone());
        if guard.swallow_inserted_rows {
            return Ok(None);
        }
        Ok(Some(record))
    }
}

pub(super) fn build_pipeline() -> (
    SubmissionPipeline<MemoryConnector>,
    MemoryConnector,
    Arc<ManualClock>,
) {
    let connector = MemoryConnector::default();
    let clock = Arc::new(ManualClock::starting_at(start_time()));
    let pipeline =
        SubmissionPipeline::new(Arc::new(connector.clone())).with_clock(clock.clone());
    (pipeline, connector, clock)
}

pub(super) fn personality_answers(value: impl Fn(usize) -> Value) -> Map<String, Value> {
    (1..=50)
        .map(|index| (format!("bf-{index:02}"), value(index)))
        .collect()
}

pub(super) fn body(answers: Map<String, Value>) -> Vec<u8> {
    serde_json::to_vec(&json!({ "answers": answers })).expect("serializable body")
}

pub(super) fn personality_body(value: u8) -> Vec<u8> {
    body(personality_answers(|_| json!(value)))
}

pub(super) fn aptitude_key() -> Map<String, Value> {
    QuestionBank::standard()
        .rows(AssessmentKind::Aptitude)
        .iter()
        .map(|row| {
            (
                row.id.clone(),
                json!(row.correct_option.clone().expect("answer key")),
            )
        })
        .collect()
}

pub(super) fn personality_catalog() -> PersonalityCatalog {
    PersonalityCatalog::from_rows(QuestionBank::standard().rows(AssessmentKind::Personality))
        .expect("standard bank is valid")
}

pub(super) fn aptitude_catalog() -> AptitudeCatalog {
    AptitudeCatalog::from_rows(QuestionBank::standard().rows(AssessmentKind::Aptitude))
        .expect("standard bank is valid")
}

pub(super) fn validated_likert(
    answers: Map<String, Value>,
    catalog: &PersonalityCatalog,
) -> ValidatedAnswers<u8> {
    AnswerSheet::<LikertScale>::parse(answers)
        .expect("answers parse")
        .reconcile(&catalog.ids())
        .expect("answers reconcile")
}

pub(super) fn validated_choices(
    answers: Map<String, Value>,
    catalog: &AptitudeCatalog,
) -> ValidatedAnswers<AnswerOption> {
    AnswerSheet::<ChoiceScale>::parse(answers)
        .expect("answers parse")
        .reconcile(&catalog.ids())
        .expect("answers reconcile")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
