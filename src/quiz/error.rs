use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuizError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("No questions available for topic: {0}")]
    NoQuestions(String),

    #[error("Option {option} is out of range for a question with {available} options")]
    InvalidOption { option: usize, available: usize },

    #[error("Question index {index} is out of range (attempt has {len} questions)")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

pub type Result<T> = std::result::Result<T, QuizError>;
