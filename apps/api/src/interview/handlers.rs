//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::interview::generator::{
    delete_interview, fetch_owned_interview, generate_interview, parse_question_payload,
    retake_interview, set_interview_active, GenerateRequest, GeneratedInterview,
};
use crate::models::interview::{InterviewRow, Question};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct InterviewListResponse {
    pub interviews: Vec<InterviewRow>,
}

#[derive(Debug, Serialize)]
pub struct InterviewDetailResponse {
    pub interview: InterviewRow,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveToggle {
    pub is_active: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interviews
///
/// Full generation pipeline: level → count → prompt → LLM → parse → persist.
/// Returns the fresh mock_id so the client can navigate to the interview.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GeneratedInterview>, AppError> {
    if request.job_position.trim().is_empty() {
        return Err(AppError::Validation("jobPosition cannot be empty".to_string()));
    }
    if request.job_desc.trim().is_empty() {
        return Err(AppError::Validation("jobDesc cannot be empty".to_string()));
    }

    let generated =
        generate_interview(&state.db, state.llm.as_ref(), request, &user.email).await?;

    Ok(Json(generated))
}

/// GET /api/v1/interviews
///
/// The caller's interviews, newest first.
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<InterviewListResponse>, AppError> {
    let interviews = sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE created_by = $1 ORDER BY id DESC",
    )
    .bind(&user.email)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(InterviewListResponse { interviews }))
}

/// GET /api/v1/interviews/:mock_id
///
/// The interview row plus its parsed question array — the taking screen
/// renders from the parsed form, never the raw payload.
pub async fn handle_get_interview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
) -> Result<Json<InterviewDetailResponse>, AppError> {
    let interview = fetch_owned_interview(&state.db, &mock_id, &user.email).await?;
    let questions = parse_question_payload(&interview.json_mock_resp)?;

    Ok(Json(InterviewDetailResponse {
        interview,
        questions,
    }))
}

/// POST /api/v1/interviews/:mock_id/retake
///
/// Regenerates questions for the same job metadata under a new mock_id at
/// the intermediate tier. The original interview is untouched.
pub async fn handle_retake(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
) -> Result<Json<GeneratedInterview>, AppError> {
    let generated =
        retake_interview(&state.db, state.llm.as_ref(), &mock_id, &user.email).await?;
    Ok(Json(generated))
}

/// PATCH /api/v1/interviews/:mock_id/active
pub async fn handle_toggle_active(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
    Json(req): Json<ActiveToggle>,
) -> Result<StatusCode, AppError> {
    set_interview_active(&state.db, &mock_id, &user.email, req.is_active).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/interviews/:mock_id
///
/// Owner-checked cascade: answers first, then the interview.
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
) -> Result<StatusCode, AppError> {
    delete_interview(&state.db, &mock_id, &user.email).await?;
    Ok(StatusCode::NO_CONTENT)
}
