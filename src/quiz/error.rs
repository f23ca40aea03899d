use thiserror::Error;

/// Errors raised while loading quiz content
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to decode question payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("question source returned no questions")]
    Empty,
    #[error("question {question_id} has an unreadable answer value {value:?}")]
    InvalidAnswer { question_id: u64, value: String },
    #[error("failed to fetch questions: {0}")]
    Fetch(String),
}
