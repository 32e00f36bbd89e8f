//! MedQuiz engine
//!
//! This module provides:
//! - Topic-keyed question catalog
//! - Quiz attempt state machine (answers, flags, reveal, navigation)
//! - Scoring and result breakdowns
//! - A tokio-driven quiz clock and simulated explanation generation

pub mod catalog;
pub mod clock;
mod error;
pub mod explanation;
pub mod models;
pub mod scoring;
pub mod session;

pub use catalog::{QuestionCatalog, QuestionSource};
pub use error::{QuizError, Result};
pub use models::*;
pub use session::{Advance, QuizAttempt};
