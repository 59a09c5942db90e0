//! Axum route handlers for the Feedback API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::feedback::scorer::{submit_feedback, FeedbackOutcome};
use crate::interview::generator::fetch_owned_interview;
use crate::models::interview::{AnswerRecord, UserAnswerRow};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitFeedbackRequest {
    pub answers: Vec<AnswerRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReportResponse {
    pub answers: Vec<UserAnswerRow>,
    /// Mean of the stored ratings to one decimal. Unparseable legacy
    /// ratings count as zero, matching the historical report.
    pub average_rating: f64,
}

/// POST /api/v1/interviews/:mock_id/feedback
///
/// Scores the submitted answer batch. Per-answer failures are skipped, so
/// this succeeds once the loop completes even if some answers were not
/// scored — the outcome says how many of each.
pub async fn handle_submit_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<FeedbackOutcome>, AppError> {
    if request.answers.is_empty() {
        return Err(AppError::Validation("answers cannot be empty".to_string()));
    }

    fetch_owned_interview(&state.db, &mock_id, &user.email).await?;

    let outcome = submit_feedback(
        &state.db,
        state.llm.as_ref(),
        &mock_id,
        &user.email,
        &request.answers,
    )
    .await?;

    Ok(Json(outcome))
}

/// GET /api/v1/interviews/:mock_id/feedback
///
/// Stored answers in submission order (insertion id) plus the average
/// rating for the report header.
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    user: AuthUser,
    Path(mock_id): Path<String>,
) -> Result<Json<FeedbackReportResponse>, AppError> {
    fetch_owned_interview(&state.db, &mock_id, &user.email).await?;

    let answers = sqlx::query_as::<_, UserAnswerRow>(
        "SELECT * FROM user_answers WHERE mock_id_ref = $1 ORDER BY id",
    )
    .bind(&mock_id)
    .fetch_all(&state.db)
    .await?;

    let average_rating = average_rating(&answers);

    Ok(Json(FeedbackReportResponse {
        answers,
        average_rating,
    }))
}

fn average_rating(answers: &[UserAnswerRow]) -> f64 {
    if answers.is_empty() {
        return 0.0;
    }
    let total: f64 = answers
        .iter()
        .map(|a| {
            a.rating
                .as_deref()
                .and_then(|r| r.trim().parse::<f64>().ok())
                .unwrap_or(0.0)
        })
        .sum();
    (total / answers.len() as f64 * 10.0).round() / 10.0
}
