// All LLM prompt constants for answer scoring.

/// System prompt for feedback — enforces a single JSON object.
pub const FEEDBACK_SYSTEM: &str =
    "You are an experienced technical interviewer reviewing a candidate's answer. \
    You MUST respond with a single valid JSON object. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Feedback prompt for a text answer.
/// Replace: {question}, {user_ans}
pub const TEXT_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Question: {question}
Candidate Answer: {user_ans}

Review the candidate's answer. Return a JSON object with exactly these keys:
{
  "feedback": "constructive feedback on the answer, 2-4 sentences",
  "rating": 7,
  "improvements": ["specific ways to strengthen the answer"]
}

"rating" is an integer from 1 to 10, where 10 is a flawless answer."#;

/// Feedback prompt for a code answer. The candidate started from
/// the original snippet and submitted the modified version.
/// Replace: {question}, {language}, {original_code}, {modified_code},
///          {user_ans}
pub const CODE_FEEDBACK_PROMPT_TEMPLATE: &str = r#"Question: {question}
Language: {language}

Original code given to the candidate:
{original_code}

Candidate's modified code:
{modified_code}

Candidate's explanation: {user_ans}

Review the code changes like a code reviewer. Return a JSON object with exactly these keys:
{
  "feedback": "review of the approach and correctness, 2-4 sentences",
  "rating": 7,
  "improvements": ["concrete refactorings or idioms to apply"],
  "bugsFound": ["remaining bugs, if any"]
}

"rating" is an integer from 1 to 10, where 10 is production-ready code."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_template_placeholders() {
        assert!(TEXT_FEEDBACK_PROMPT_TEMPLATE.contains("{question}"));
        assert!(TEXT_FEEDBACK_PROMPT_TEMPLATE.contains("{user_ans}"));
        assert!(TEXT_FEEDBACK_PROMPT_TEMPLATE.contains("1 to 10"));
    }

    #[test]
    fn test_code_template_placeholders() {
        for placeholder in [
            "{question}",
            "{language}",
            "{original_code}",
            "{modified_code}",
            "{user_ans}",
        ] {
            assert!(
                CODE_FEEDBACK_PROMPT_TEMPLATE.contains(placeholder),
                "missing {placeholder}"
            );
        }
        assert!(CODE_FEEDBACK_PROMPT_TEMPLATE.contains("bugsFound"));
    }
}
