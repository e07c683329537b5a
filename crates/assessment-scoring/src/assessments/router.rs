use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::AssessmentKind;
use super::pipeline::{SubmissionError, SubmissionPipeline};
use super::store::{RequestCredentials, StoreConnector};

const SESSION_COOKIE: &str = "session";

/// Router builder exposing the submission and question endpoints.
pub fn assessment_router<C>(pipeline: Arc<SubmissionPipeline<C>>) -> Router
where
    C: StoreConnector + 'static,
{
    Router::new()
        .route(
            "/api/v1/assessments/personality",
            post(personality_handler::<C>).fallback(method_not_allowed),
        )
        .route(
            "/api/v1/assessments/aptitude",
            post(aptitude_handler::<C>).fallback(method_not_allowed),
        )
        .route(
            "/api/v1/assessments/:kind/questions",
            get(questions_handler::<C>),
        )
        .with_state(pipeline)
}

pub(crate) async fn personality_handler<C>(
    State(pipeline): State<Arc<SubmissionPipeline<C>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    C: StoreConnector + 'static,
{
    let credentials = credentials_from_headers(&headers);
    match pipeline.submit_personality(&credentials, &body) {
        Ok(outcome) => {
            let payload = json!({
                "success": true,
                "scores": outcome.score.to_json(),
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn aptitude_handler<C>(
    State(pipeline): State<Arc<SubmissionPipeline<C>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    C: StoreConnector + 'static,
{
    let credentials = credentials_from_headers(&headers);
    match pipeline.submit_aptitude(&credentials, &body) {
        Ok(outcome) => {
            let payload = json!({
                "success": true,
                "scoreTotal": outcome.score.score_total,
                "breakdown": outcome.score.breakdown_json(),
                "percentage": outcome.score.percentage,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn questions_handler<C>(
    State(pipeline): State<Arc<SubmissionPipeline<C>>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Response
where
    C: StoreConnector + 'static,
{
    let Some(kind) = AssessmentKind::from_label(&kind) else {
        let payload = json!({
            "success": false,
            "error": "Unknown assessment",
            "code": "UNKNOWN_ASSESSMENT",
        });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    let credentials = credentials_from_headers(&headers);
    match pipeline.questions(&credentials, kind) {
        Ok(questions) => {
            let payload = json!({
                "success": true,
                "assessment": kind.label(),
                "questions": questions,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn method_not_allowed() -> Response {
    let payload = json!({
        "success": false,
        "error": "Method not allowed",
        "code": "METHOD_NOT_ALLOWED",
    });
    (StatusCode::METHOD_NOT_ALLOWED, Json(payload)).into_response()
}

/// Bearer token wins over the session cookie.
pub(crate) fn credentials_from_headers(headers: &HeaderMap) -> RequestCredentials {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let cookie = || {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
    };

    RequestCredentials {
        session_token: bearer.or_else(cookie).map(str::to_string),
    }
}

impl IntoResponse for SubmissionError {
    fn into_response(self) -> Response {
        let mut payload = json!({
            "success": false,
            "error": self.public_message(),
            "code": self.code(),
        });
        if let Some(details) = self.details() {
            payload["details"] = json!(details);
        }
        if let Some(retry_after) = self.retry_after_secs() {
            payload["retryAfter"] = json!(retry_after);
        }

        let mut response = (self.status(), Json(payload)).into_response();
        if let Some(retry_after) = self.retry_after_secs() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response
    }
}
