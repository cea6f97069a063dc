//! Prompt interpreter: turns the operator's free-text instruction into a
//! bounded `GenerationRequest` before anything is sent to the panel service.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::models::QuestionKind;

pub const MIN_QUESTIONS: u32 = 10;
pub const MAX_QUESTIONS: u32 = 15;
/// Used when the prompt names no number.
pub const DEFAULT_QUESTION_COUNT: u32 = 10;

/// Removed from the prompt, in this order, to leave only the topic.
/// Matching is case-insensitive and not anchored to word boundaries.
pub const STRIPPED_TOKENS: &[&str] = &[
    "generate",
    "create",
    "[0-9]+",
    "questions",
    "interview",
    "mcq",
    "about",
];

fn strip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!("(?i){}", STRIPPED_TOKENS.join("|")))
            .expect("stripped-token pattern is a valid regex")
    })
}

fn digit_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("[0-9]+").expect("digit pattern is a valid regex"))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("Please enter a prompt")]
    EmptyPrompt,

    #[error("Minimum 10 questions required. Please modify your prompt.")]
    CountTooLow { requested: u64 },

    #[error("Maximum 15 questions allowed. Please modify your prompt.")]
    CountTooHigh { requested: u64 },

    #[error("Please specify a subject or topic")]
    EmptyTopic,
}

/// A validated generation request. Only `interpret` builds one, so `count`
/// is always within bounds and `topic` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    topic: String,
    count: u32,
    kind: QuestionKind,
}

impl GenerationRequest {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }
}

/// Interprets a raw prompt such as `"Generate 12 MCQ about Java basics"`.
pub fn interpret(raw: &str) -> Result<GenerationRequest, PromptError> {
    if raw.trim().is_empty() {
        return Err(PromptError::EmptyPrompt);
    }

    let count = requested_count(raw)?;
    let kind = detect_kind(raw);

    let topic = extract_topic(raw);
    if topic.is_empty() {
        return Err(PromptError::EmptyTopic);
    }

    Ok(GenerationRequest { topic, count, kind })
}

fn requested_count(raw: &str) -> Result<u32, PromptError> {
    let Some(digits) = digit_run().find(raw) else {
        return Ok(DEFAULT_QUESTION_COUNT);
    };
    // A digit run too long for u64 is simply "too many".
    let requested = digits.as_str().parse::<u64>().unwrap_or(u64::MAX);

    if requested < u64::from(MIN_QUESTIONS) {
        Err(PromptError::CountTooLow { requested })
    } else if requested > u64::from(MAX_QUESTIONS) {
        Err(PromptError::CountTooHigh { requested })
    } else {
        Ok(requested as u32)
    }
}

fn detect_kind(raw: &str) -> QuestionKind {
    if raw.to_lowercase().contains("interview") {
        QuestionKind::Interview
    } else {
        QuestionKind::MultipleChoice
    }
}

/// Deletes every `STRIPPED_TOKENS` match, including matches inside words,
/// and trims the ends. Inner whitespace is kept as written.
fn extract_topic(raw: &str) -> String {
    strip_pattern().replace_all(raw, "").trim().to_string()
}
