// All LLM prompt constants for interview generation.

/// System prompt for question generation — enforces JSON-only output.
pub const GENERATION_SYSTEM: &str =
    "You are an expert technical interviewer designing a mock interview. \
    You MUST respond with valid JSON only — a JSON array of question objects. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Question generation prompt template.
/// Replace: {job_position}, {job_desc}, {job_experience}, {level},
///          {question_count}
pub const GENERATION_PROMPT_TEMPLATE: &str = r#"Job Position: {job_position}
Job Description / Tech Stack: {job_desc}
Years of Experience: {job_experience}
Interview Level: {level}

Generate exactly {question_count} interview questions for this role at the stated level. Mix question types: for technical roles, make roughly 30% of them "code" questions and the rest "text" questions.

Return a JSON ARRAY where each element is one of these two shapes (no extra fields):

Text question:
{
  "type": "text",
  "question": "the interview question",
  "answer": "a strong model answer"
}

Code question:
{
  "type": "code",
  "question": "the interview question",
  "codeSnippet": "starter code the candidate works from",
  "language": "lowercase language tag, e.g. javascript",
  "instructions": "what the candidate should do with the snippet",
  "expectedOutput": "the expected output, if applicable"
}

HARD RULES:
1. Every element MUST carry the "type" discriminator — "text" or "code", nothing else
2. Every "code" element MUST include codeSnippet, language, and instructions
3. "expectedOutput" is optional — omit it rather than leaving it empty
4. Questions must match the stated interview level in depth and difficulty
5. Return ONLY the JSON array — no prose, no markdown, no trailing commentary"#;
