//! Answer scoring — the feedback pipeline behind interview completion.
//!
//! For each submitted answer, independently: build the prompt (code answers
//! get the code-review template), call the LLM, recover a single JSON
//! object, coerce the rating, and persist one user_answers row. A failure
//! on one answer is logged and skipped so the rest of the batch still gets
//! scored; the batch reports success once the loop completes.

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::feedback::prompts::{
    CODE_FEEDBACK_PROMPT_TEMPLATE, FEEDBACK_SYSTEM, TEXT_FEEDBACK_PROMPT_TEMPLATE,
};
use crate::llm_client::recover::recover_json;
use crate::llm_client::GenerateText;
use crate::models::interview::AnswerRecord;

/// Canonical rating scale. Older rows may hold 1–5 ratings; reads are
/// lenient, writes always land in this range.
pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 10;

/// One scored answer, ready to persist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredFeedback {
    pub feedback: String,
    pub rating: u8,
    pub improvements: Vec<String>,
    pub bugs_found: Vec<String>,
}

/// Batch outcome: the loop always runs to completion, so this is returned
/// even when some answers were skipped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackOutcome {
    pub scored: usize,
    pub skipped: usize,
}

/// The persistence seam for scored answers. `PgPool` is the production
/// store; tests substitute a recording store, same as the `GenerateText`
/// seam on the model side.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn insert_answer(
        &self,
        mock_id: &str,
        user_email: &str,
        record: &AnswerRecord,
        feedback: &ScoredFeedback,
    ) -> Result<(), AppError>;
}

#[async_trait]
impl AnswerStore for PgPool {
    async fn insert_answer(
        &self,
        mock_id: &str,
        user_email: &str,
        record: &AnswerRecord,
        feedback: &ScoredFeedback,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_answers
                (mock_id_ref, question, user_ans, feedback, rating, user_email,
                 created_at, answer_type, original_code, modified_code, code_language)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(mock_id)
        .bind(&record.question)
        .bind(&record.user_ans)
        .bind(&feedback.feedback)
        .bind(feedback.rating.to_string())
        .bind(user_email)
        .bind(Utc::now().to_rfc3339())
        .bind(record.answer_type.as_str())
        .bind(&record.original_code)
        .bind(&record.modified_code)
        .bind(&record.code_language)
        .execute(self)
        .await?;

        Ok(())
    }
}

/// Scores every answer in submission order and persists one row per success.
///
/// Sequential on purpose: each LLM call and insert is awaited before the
/// next answer starts, which bounds load on the generation API and keeps
/// row insertion order equal to submission order.
pub async fn submit_feedback(
    store: &dyn AnswerStore,
    llm: &dyn GenerateText,
    mock_id: &str,
    user_email: &str,
    answers: &[AnswerRecord],
) -> Result<FeedbackOutcome, AppError> {
    let mut scored = 0usize;
    let mut skipped = 0usize;

    for record in answers {
        let result = score_answer(llm, record).await;

        let feedback = match result {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    "Skipping answer to '{}': scoring failed: {e}",
                    record.question
                );
                skipped += 1;
                continue;
            }
        };

        if let Err(e) = store
            .insert_answer(mock_id, user_email, record, &feedback)
            .await
        {
            warn!(
                "Skipping answer to '{}': persistence failed: {e}",
                record.question
            );
            skipped += 1;
            continue;
        }

        scored += 1;
    }

    info!("Feedback for {mock_id}: {scored} scored, {skipped} skipped");
    Ok(FeedbackOutcome { scored, skipped })
}

/// Scores a single answer: prompt branch → LLM → recover → coerce rating.
pub async fn score_answer(
    llm: &dyn GenerateText,
    record: &AnswerRecord,
) -> Result<ScoredFeedback, AppError> {
    let prompt = build_feedback_prompt(record);

    let raw = llm
        .generate(&prompt, FEEDBACK_SYSTEM)
        .await
        .map_err(|e| AppError::Llm(format!("Feedback call failed: {e}")))?;

    parse_feedback_payload(&raw)
}

/// Picks the template by answer kind and fills it.
fn build_feedback_prompt(record: &AnswerRecord) -> String {
    if record.has_code() {
        CODE_FEEDBACK_PROMPT_TEMPLATE
            .replace("{question}", &record.question)
            .replace(
                "{language}",
                record.code_language.as_deref().unwrap_or("unspecified"),
            )
            .replace(
                "{original_code}",
                record.original_code.as_deref().unwrap_or(""),
            )
            .replace(
                "{modified_code}",
                record.modified_code.as_deref().unwrap_or(""),
            )
            .replace("{user_ans}", &record.user_ans)
    } else {
        TEXT_FEEDBACK_PROMPT_TEMPLATE
            .replace("{question}", &record.question)
            .replace("{user_ans}", &record.user_ans)
    }
}

/// Recovers the model reply as a single feedback object.
/// Requires `feedback` and `rating`; `improvements` and `bugsFound` are
/// optional arrays.
pub fn parse_feedback_payload(raw: &str) -> Result<ScoredFeedback, AppError> {
    let value = recover_json(raw).map_err(|e| AppError::Parse {
        message: "feedback reply contained no valid JSON".to_string(),
        raw: e.raw,
    })?;

    let obj = value.as_object().ok_or_else(|| AppError::Parse {
        message: "feedback reply was not a JSON object".to_string(),
        raw: raw.to_string(),
    })?;

    let feedback = obj
        .get("feedback")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Parse {
            message: "feedback reply missing 'feedback' key".to_string(),
            raw: raw.to_string(),
        })?
        .to_string();

    let rating = obj
        .get("rating")
        .and_then(coerce_rating)
        .ok_or_else(|| AppError::Parse {
            message: "feedback reply missing a numeric 'rating'".to_string(),
            raw: raw.to_string(),
        })?;

    Ok(ScoredFeedback {
        feedback,
        rating,
        improvements: string_array(obj.get("improvements")),
        bugs_found: string_array(obj.get("bugsFound")),
    })
}

/// Coerces a rating that may arrive as a number or a numeric string,
/// clamped into the canonical 1–10 scale.
fn coerce_rating(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some((n.round() as i64).clamp(RATING_MIN as i64, RATING_MAX as i64) as u8)
}

fn string_array(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::models::interview::AnswerType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn text_record(question: &str) -> AnswerRecord {
        AnswerRecord {
            question: question.to_string(),
            user_ans: "my answer".to_string(),
            answer_type: AnswerType::Text,
            code_language: None,
            original_code: None,
            modified_code: None,
            is_voice_answer: None,
        }
    }

    fn code_record() -> AnswerRecord {
        AnswerRecord {
            question: "Fix the bug".to_string(),
            user_ans: "I guarded the nil case".to_string(),
            answer_type: AnswerType::Code,
            code_language: Some("go".to_string()),
            original_code: Some("func f() {}".to_string()),
            modified_code: Some("func f() error { return nil }".to_string()),
            is_voice_answer: None,
        }
    }

    /// Mock model: answers with canned JSON, failing on selected calls.
    struct CannedModel {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    impl CannedModel {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl GenerateText for CannedModel {
        async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on == Some(call) {
                return Err(LlmError::Api {
                    status: 503,
                    message: "overloaded".to_string(),
                });
            }
            Ok(r#"{"feedback": "Solid answer", "rating": 8, "improvements": ["more depth"]}"#
                .to_string())
        }
    }

    /// Recording store: keeps the questions of persisted rows, optionally
    /// failing on a chosen question.
    #[derive(Default)]
    struct RecordingStore {
        questions: Mutex<Vec<String>>,
        fail_question: Option<&'static str>,
    }

    #[async_trait]
    impl AnswerStore for RecordingStore {
        async fn insert_answer(
            &self,
            _mock_id: &str,
            _user_email: &str,
            record: &AnswerRecord,
            _feedback: &ScoredFeedback,
        ) -> Result<(), AppError> {
            if self.fail_question == Some(record.question.as_str()) {
                return Err(AppError::Internal(anyhow::anyhow!("connection reset")));
            }
            self.questions.lock().unwrap().push(record.question.clone());
            Ok(())
        }
    }

    #[test]
    fn test_code_answers_get_the_code_review_template() {
        let prompt = build_feedback_prompt(&code_record());
        assert!(prompt.contains("Candidate's modified code"));
        assert!(prompt.contains("func f() error"));
        assert!(prompt.contains("bugsFound"));
    }

    #[test]
    fn test_text_answers_get_the_text_template() {
        let prompt = build_feedback_prompt(&text_record("What is a mutex?"));
        assert!(prompt.contains("What is a mutex?"));
        assert!(!prompt.contains("bugsFound"));
    }

    #[test]
    fn test_parse_feedback_with_numeric_rating() {
        let scored = parse_feedback_payload(
            r#"{"feedback": "Good", "rating": 7, "improvements": [], "bugsFound": ["off by one"]}"#,
        )
        .unwrap();
        assert_eq!(scored.rating, 7);
        assert_eq!(scored.bugs_found, vec!["off by one"]);
    }

    #[test]
    fn test_parse_feedback_coerces_string_rating() {
        let scored = parse_feedback_payload(r#"{"feedback": "Fine", "rating": "6"}"#).unwrap();
        assert_eq!(scored.rating, 6);
        assert!(scored.improvements.is_empty());
    }

    #[test]
    fn test_rating_is_clamped_to_canonical_scale() {
        let high = parse_feedback_payload(r#"{"feedback": "x", "rating": 42}"#).unwrap();
        assert_eq!(high.rating, RATING_MAX);
        let low = parse_feedback_payload(r#"{"feedback": "x", "rating": 0}"#).unwrap();
        assert_eq!(low.rating, RATING_MIN);
    }

    #[test]
    fn test_parse_feedback_tolerates_fences_and_prose() {
        let fenced = "```json\n{\"feedback\": \"Good\", \"rating\": 9}\n```";
        assert_eq!(parse_feedback_payload(fenced).unwrap().rating, 9);

        let prose = "Here you go: {\"feedback\": \"Good\", \"rating\": 9} — done!";
        assert_eq!(parse_feedback_payload(prose).unwrap().rating, 9);
    }

    #[test]
    fn test_parse_feedback_requires_rating() {
        let err = parse_feedback_payload(r#"{"feedback": "Good"}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_submit_feedback_skips_failed_answer_and_completes() {
        // Three answers, the model fails on the second: the batch still
        // finishes, two rows land in submission order, the skip is counted.
        let model = CannedModel::new(Some(1));
        let store = RecordingStore::default();
        let records = vec![text_record("q1"), text_record("q2"), text_record("q3")];

        let outcome = submit_feedback(&store, &model, "mock-1", "u@example.com", &records)
            .await
            .unwrap();

        assert_eq!(outcome.scored, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(*store.questions.lock().unwrap(), vec!["q1", "q3"]);
    }

    #[tokio::test]
    async fn test_submit_feedback_counts_persistence_failures_as_skips() {
        let model = CannedModel::new(None);
        let store = RecordingStore {
            questions: Mutex::new(Vec::new()),
            fail_question: Some("q2"),
        };
        let records = vec![text_record("q1"), text_record("q2"), text_record("q3")];

        let outcome = submit_feedback(&store, &model, "mock-1", "u@example.com", &records)
            .await
            .unwrap();

        assert_eq!(outcome.scored, 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(*store.questions.lock().unwrap(), vec!["q1", "q3"]);
    }

    #[tokio::test]
    async fn test_submit_feedback_all_good_skips_nothing() {
        let model = CannedModel::new(None);
        let store = RecordingStore::default();
        let records = vec![text_record("q1"), code_record()];

        let outcome = submit_feedback(&store, &model, "mock-1", "u@example.com", &records)
            .await
            .unwrap();

        assert_eq!(outcome.scored, 2);
        assert_eq!(outcome.skipped, 0);
    }

    #[tokio::test]
    async fn test_score_answer_happy_path() {
        let model = CannedModel::new(None);
        let scored = score_answer(&model, &text_record("q")).await.unwrap();
        assert_eq!(scored.feedback, "Solid answer");
        assert_eq!(scored.rating, 8);
        assert_eq!(scored.improvements, vec!["more depth"]);
    }
}
