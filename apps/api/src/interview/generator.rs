//! Interview generation — orchestrates the pipeline behind the generate,
//! retake, and delete endpoints.
//!
//! Flow: predict level (unless supplied) → draw question count → build
//! prompt → LLM call → recover/validate JSON → mint mock_id → persist.
//! The insert runs only after a parse success, so a bad model reply never
//! leaves an orphaned row.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::level::{predict_level, random_question_count};
use crate::interview::prompts::{GENERATION_PROMPT_TEMPLATE, GENERATION_SYSTEM};
use crate::llm_client::recover::recover_json;
use crate::llm_client::GenerateText;
use crate::models::interview::{InterviewLevel, InterviewRow, Question};

/// Request body for interview generation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    /// Explicit tier override. `None` means auto-detect from experience.
    #[serde(default)]
    pub interview_level: Option<InterviewLevel>,
}

/// Outcome of a successful generation, returned to the caller so the
/// presentation layer can navigate to the new interview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInterview {
    pub mock_id: String,
    pub interview_level: InterviewLevel,
    pub question_count: usize,
}

/// Everything the generation pipeline produces before persistence: the
/// fresh mock_id, the resolved tier, and the canonical question payload.
#[derive(Debug, Clone)]
pub struct PreparedInterview {
    pub mock_id: String,
    pub level: InterviewLevel,
    pub payload: String,
    pub question_count: usize,
}

/// Runs the pipeline up to (not including) the insert.
///
/// Steps:
/// 1. predict_level() unless the caller chose a tier
/// 2. random_question_count() — fresh draw every request
/// 3. build prompt from the template
/// 4. LLM call
/// 5. recover + validate the question array
/// 6. mint a fresh mock_id
pub async fn prepare_interview(
    llm: &dyn GenerateText,
    request: &GenerateRequest,
) -> Result<PreparedInterview, AppError> {
    let level = request
        .interview_level
        .unwrap_or_else(|| predict_level(&request.job_experience));
    let question_count = random_question_count(level);

    info!(
        "Generating {} {} questions for position '{}'",
        question_count,
        level.as_str(),
        request.job_position
    );

    let prompt = build_generation_prompt(request, level, question_count);

    let raw = llm
        .generate(&prompt, GENERATION_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Question generation failed: {e}")))?;

    let questions = parse_question_payload(&raw)?;

    // Store the canonical re-serialization, not the raw reply, so readers of
    // json_mock_resp always see a clean question array.
    let payload = serde_json::to_string(&questions)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize questions: {e}")))?;

    Ok(PreparedInterview {
        mock_id: Uuid::new_v4().to_string(),
        level,
        payload,
        question_count: questions.len(),
    })
}

/// Runs the full generation pipeline and persists the interview. The insert
/// happens only after a parse success, so a bad model reply never leaves an
/// orphaned row.
pub async fn generate_interview(
    pool: &PgPool,
    llm: &dyn GenerateText,
    request: GenerateRequest,
    created_by: &str,
) -> Result<GeneratedInterview, AppError> {
    let prepared = prepare_interview(llm, &request).await?;

    sqlx::query(
        r#"
        INSERT INTO interviews
            (mock_id, json_mock_resp, job_position, job_desc, job_experience,
             created_by, created_at, is_active)
        VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE)
        "#,
    )
    .bind(&prepared.mock_id)
    .bind(&prepared.payload)
    .bind(&request.job_position)
    .bind(&request.job_desc)
    .bind(&request.job_experience)
    .bind(created_by)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    info!(
        "Generated interview {} with {} questions for {}",
        prepared.mock_id, prepared.question_count, created_by
    );

    Ok(GeneratedInterview {
        mock_id: prepared.mock_id,
        interview_level: prepared.level,
        question_count: prepared.question_count,
    })
}

/// Regenerates an existing interview's questions under a new mock_id.
///
/// The original row is left untouched; the retake is always generated at the
/// intermediate tier regardless of the recorded experience.
pub async fn retake_interview(
    pool: &PgPool,
    llm: &dyn GenerateText,
    mock_id: &str,
    requester: &str,
) -> Result<GeneratedInterview, AppError> {
    let original = fetch_owned_interview(pool, mock_id, requester).await?;
    let request = retake_request(original);
    generate_interview(pool, llm, request, requester).await
}

/// Builds the retake request from the original row: job metadata reused,
/// tier forced to intermediate regardless of the recorded experience.
pub fn retake_request(original: InterviewRow) -> GenerateRequest {
    GenerateRequest {
        job_position: original.job_position,
        job_desc: original.job_desc,
        job_experience: original.job_experience,
        interview_level: Some(InterviewLevel::Intermediate),
    }
}

/// Deletes an interview after an ownership check, answers first so the
/// foreign-key invariant holds throughout.
///
/// Idempotent by mock_id: a raced second delete finds no row behind the
/// ownership filter and reports not-found.
pub async fn delete_interview(
    pool: &PgPool,
    mock_id: &str,
    requester: &str,
) -> Result<(), AppError> {
    fetch_owned_interview(pool, mock_id, requester).await?;

    sqlx::query("DELETE FROM user_answers WHERE mock_id_ref = $1")
        .bind(mock_id)
        .execute(pool)
        .await?;

    sqlx::query("DELETE FROM interviews WHERE mock_id = $1")
        .bind(mock_id)
        .execute(pool)
        .await?;

    info!("Deleted interview {mock_id} and its answers");
    Ok(())
}

/// Flips the active flag — the one in-place update interviews permit.
pub async fn set_interview_active(
    pool: &PgPool,
    mock_id: &str,
    requester: &str,
    is_active: bool,
) -> Result<(), AppError> {
    fetch_owned_interview(pool, mock_id, requester).await?;

    sqlx::query("UPDATE interviews SET is_active = $1 WHERE mock_id = $2")
        .bind(is_active)
        .bind(mock_id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Loads an interview only if the requester owns it. "Doesn't exist" and
/// "not yours" collapse into the same NotFound on purpose.
pub async fn fetch_owned_interview(
    pool: &PgPool,
    mock_id: &str,
    requester: &str,
) -> Result<InterviewRow, AppError> {
    sqlx::query_as::<_, InterviewRow>(
        "SELECT * FROM interviews WHERE mock_id = $1 AND created_by = $2",
    )
    .bind(mock_id)
    .bind(requester)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview {mock_id} not found")))
}

/// Recovers the model reply as a question array.
/// Valid JSON of the wrong shape is still a parse failure — the raw text is
/// retained either way.
pub fn parse_question_payload(raw: &str) -> Result<Vec<Question>, AppError> {
    let value = recover_json(raw).map_err(|e| AppError::Parse {
        message: "model reply contained no valid JSON".to_string(),
        raw: e.raw,
    })?;

    serde_json::from_value(value).map_err(|e| AppError::Parse {
        message: format!("model reply was not a question array: {e}"),
        raw: raw.to_string(),
    })
}

/// Fills the generation template.
fn build_generation_prompt(
    request: &GenerateRequest,
    level: InterviewLevel,
    question_count: u8,
) -> String {
    GENERATION_PROMPT_TEMPLATE
        .replace("{job_position}", &request.job_position)
        .replace("{job_desc}", &request.job_desc)
        .replace("{job_experience}", &request.job_experience)
        .replace("{level}", level.as_str())
        .replace("{question_count}", &question_count.to_string())
}
