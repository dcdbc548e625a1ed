//! Interview practice prompts
//!
//! A fixed list shown alongside recording. Numbering is 1-based to match
//! what the user sees on screen.

/// The practice questions, in display order
pub const INTERVIEW_QUESTIONS: [&str; 5] = [
    "Tell me about yourself.",
    "Why do you want to work here?",
    "What are your strengths and weaknesses?",
    "Describe a challenging situation you faced and how you handled it.",
    "Where do you see yourself in 5 years?",
];

/// Look up a question by its 1-based number
pub fn question(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| INTERVIEW_QUESTIONS.get(index))
        .copied()
}

/// Iterate over `(number, question)` pairs
pub fn numbered() -> impl Iterator<Item = (usize, &'static str)> {
    INTERVIEW_QUESTIONS
        .iter()
        .enumerate()
        .map(|(index, q)| (index + 1, *q))
}
