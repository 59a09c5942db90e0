//! Level prediction and question-count selection.
//!
//! The experience column is text, so prediction parses leniently: a leading
//! integer is honored ("6", "6 years"), anything else counts as zero.

use rand::Rng;

use crate::models::interview::InterviewLevel;

/// Maps years of experience to a difficulty tier.
/// ≤ 2 → beginner, 3–5 → intermediate, > 5 → advanced. Total function:
/// unparseable input is treated as 0 years.
pub fn predict_level(job_experience: &str) -> InterviewLevel {
    let years = parse_years(job_experience);
    if years <= 2 {
        InterviewLevel::Beginner
    } else if years <= 5 {
        InterviewLevel::Intermediate
    } else {
        InterviewLevel::Advanced
    }
}

/// Inclusive question-count range for a tier.
pub fn question_count_range(level: InterviewLevel) -> (u8, u8) {
    match level {
        InterviewLevel::Beginner => (5, 8),
        InterviewLevel::Intermediate => (8, 12),
        InterviewLevel::Advanced => (10, 15),
    }
}

/// Draws a fresh uniform question count within the tier's range.
/// Called once per generation request, retakes included.
pub fn random_question_count(level: InterviewLevel) -> u8 {
    let (min, max) = question_count_range(level);
    rand::thread_rng().gen_range(min..=max)
}

fn parse_years(raw: &str) -> u32 {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
