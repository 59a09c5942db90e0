use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One generated mock-interview session.
///
/// `json_mock_resp` holds the generated question array as a JSON-encoded
/// string; `created_at` is an RFC 3339 string (legacy varchar column).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: i32,
    pub mock_id: String,
    pub json_mock_resp: String,
    pub job_position: String,
    pub job_desc: String,
    pub job_experience: String,
    pub created_by: String,
    pub created_at: Option<String>,
    pub is_active: bool,
}

/// One persisted, scored answer. Keyed to its interview by `mock_id_ref`.
/// `rating` is stored as text for legacy compatibility; canonical scale 1–10.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserAnswerRow {
    pub id: i32,
    pub mock_id_ref: String,
    pub question: String,
    pub user_ans: Option<String>,
    pub feedback: Option<String>,
    pub rating: Option<String>,
    pub user_email: Option<String>,
    pub created_at: Option<String>,
    pub answer_type: Option<String>,
    pub original_code: Option<String>,
    pub modified_code: Option<String>,
    pub code_language: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Domain types (wire shapes match the persisted payload format)
// ────────────────────────────────────────────────────────────────────────────

/// Difficulty tier driving question count and prompt framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl InterviewLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewLevel::Beginner => "beginner",
            InterviewLevel::Intermediate => "intermediate",
            InterviewLevel::Advanced => "advanced",
        }
    }
}

/// One generated interview question, discriminated by the `type` tag.
/// Every consumer matches exhaustively on the variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Question {
    Text {
        question: String,
        answer: String,
    },
    Code {
        question: String,
        #[serde(rename = "codeSnippet")]
        code_snippet: String,
        language: String,
        instructions: String,
        #[serde(
            rename = "expectedOutput",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        expected_output: Option<String>,
    },
}

/// Discriminator for answers, mirroring the question `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Text,
    Code,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Text => "text",
            AnswerType::Code => "code",
        }
    }
}

/// One user response collected during interview-taking, submitted for
/// scoring. Not persisted directly — `feedback::scorer` turns each record
/// into a `user_answers` row after the AI review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub question: String,
    pub user_ans: String,
    #[serde(rename = "type")]
    pub answer_type: AnswerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_voice_answer: Option<bool>,
}

impl AnswerRecord {
    /// Code-review scoring applies when the record carries the worked code.
    pub fn has_code(&self) -> bool {
        self.original_code.is_some() || self.modified_code.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_question_round_trips_with_type_tag() {
        let json = r#"{"type": "text", "question": "What is ownership?", "answer": "..."}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        match &q {
            Question::Text { question, .. } => assert_eq!(question, "What is ownership?"),
            Question::Code { .. } => panic!("expected text variant"),
        }
        let out = serde_json::to_value(&q).unwrap();
        assert_eq!(out["type"], "text");
    }

    #[test]
    fn test_code_question_carries_snippet_language_instructions() {
        let json = r#"{
            "type": "code",
            "question": "Fix the off-by-one error",
            "codeSnippet": "for i in 0..=len { }",
            "language": "rust",
            "instructions": "Make the loop visit each index once",
            "expectedOutput": "0 1 2"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        match q {
            Question::Code {
                code_snippet,
                language,
                expected_output,
                ..
            } => {
                assert!(code_snippet.contains("for i"));
                assert_eq!(language, "rust");
                assert_eq!(expected_output.as_deref(), Some("0 1 2"));
            }
            Question::Text { .. } => panic!("expected code variant"),
        }
    }

    #[test]
    fn test_code_question_expected_output_is_optional() {
        let json = r#"{
            "type": "code",
            "question": "Q",
            "codeSnippet": "x",
            "language": "python",
            "instructions": "do it"
        }"#;
        assert!(serde_json::from_str::<Question>(json).is_ok());
    }

    #[test]
    fn test_code_question_without_snippet_is_rejected() {
        let json = r#"{"type": "code", "question": "Q", "language": "go", "instructions": "i"}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn test_unknown_type_tag_is_rejected() {
        let json = r#"{"type": "essay", "question": "Q", "answer": "A"}"#;
        assert!(serde_json::from_str::<Question>(json).is_err());
    }

    #[test]
    fn test_answer_record_camel_case_wire_shape() {
        let json = r#"{
            "question": "Q",
            "userAns": "my answer",
            "type": "code",
            "codeLanguage": "rust",
            "originalCode": "fn a() {}",
            "modifiedCode": "fn a() -> u8 { 1 }",
            "isVoiceAnswer": false
        }"#;
        let record: AnswerRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.user_ans, "my answer");
        assert_eq!(record.answer_type, AnswerType::Code);
        assert!(record.has_code());
    }

    #[test]
    fn test_answer_record_without_code_fields() {
        let json = r#"{"question": "Q", "userAns": "A", "type": "text"}"#;
        let record: AnswerRecord = serde_json::from_str(json).unwrap();
        assert!(!record.has_code());
        assert!(record.is_voice_answer.is_none());
    }

    #[test]
    fn test_interview_level_serde_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&InterviewLevel::Advanced).unwrap(),
            "\"advanced\""
        );
        let level: InterviewLevel = serde_json::from_str("\"beginner\"").unwrap();
        assert_eq!(level, InterviewLevel::Beginner);
    }
}
