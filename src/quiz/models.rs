//! Data models for the quiz engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How hard a question is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn all() -> [Difficulty; 3] {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A topic in the question catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A multiple-choice question. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub topic_id: String,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    /// Parallel to `options` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_explanations: Option<Vec<String>>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    /// Check the structural invariants of a question
    pub fn validate(&self) -> Result<(), String> {
        if self.options.is_empty() {
            return Err(format!("question {} has no options", self.id));
        }
        if self.correct_answer >= self.options.len() {
            return Err(format!(
                "question {} has correct answer {} but only {} options",
                self.id,
                self.correct_answer,
                self.options.len()
            ));
        }
        if let Some(explanations) = &self.option_explanations {
            if explanations.len() != self.options.len() {
                return Err(format!(
                    "question {} has {} option explanations for {} options",
                    self.id,
                    explanations.len(),
                    self.options.len()
                ));
            }
        }
        Ok(())
    }

    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }

    /// Explanation specific to one option, if the question carries them
    pub fn option_explanation(&self, option: usize) -> Option<&str> {
        self.option_explanations
            .as_ref()
            .and_then(|e| e.get(option))
            .map(String::as_str)
    }
}

/// Quiz mode, which decides when answers are revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Reveal as soon as an answer is picked
    #[default]
    Standard,
    /// Reveal only at submission
    Timed,
    /// Reveal on entering each question
    Review,
    /// Retry of previously missed questions, revealed like standard
    Incorrect,
}

impl QuizMode {
    /// Whether picking an answer reveals the question right away
    pub fn reveals_on_answer(&self) -> bool {
        matches!(self, QuizMode::Standard | QuizMode::Incorrect)
    }

    /// Whether navigating onto a question reveals it
    pub fn reveals_on_enter(&self) -> bool {
        matches!(self, QuizMode::Review)
    }
}

/// Selection options used when starting an attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    /// Requested question count, 0 for the whole pool
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub shuffle: bool,
    /// Only honored in timed mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
}

fn default_question_count() -> usize {
    10
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            question_count: default_question_count(),
            difficulty: None,
            shuffle: false,
            time_limit_secs: None,
        }
    }
}

/// Per-question view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionState {
    Unanswered,
    Answered(usize),
    /// Feedback and explanation visible. `None` when revealed without an answer.
    Revealed(Option<usize>),
}

/// The outcome of one question in a finished attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

/// Correct/total counts for one difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub correct: usize,
    pub total: usize,
}

/// Frozen result of a submitted attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub attempt_id: Uuid,
    pub topic_id: String,
    pub mode: QuizMode,
    /// Percentage in 0..=100
    pub score: u32,
    pub correct_count: usize,
    pub total_questions: usize,
    pub time_spent_secs: u64,
    pub questions: Vec<Question>,
    pub answers: Vec<Option<usize>>,
    pub flagged: Vec<bool>,
    pub completed_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn outcome(&self, index: usize) -> Option<Outcome> {
        let question = self.questions.get(index)?;
        Some(match self.answers.get(index).copied().flatten() {
            None => Outcome::Unanswered,
            Some(a) if question.is_correct(a) => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
        })
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        (0..self.questions.len())
            .filter_map(|i| self.outcome(i))
            .collect()
    }

    /// Questions answered wrongly or skipped, in attempt order
    pub fn missed_questions(&self) -> Vec<Question> {
        self.questions
            .iter()
            .enumerate()
            .filter(|(i, _)| self.outcome(*i) != Some(Outcome::Correct))
            .map(|(_, q)| q.clone())
            .collect()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_some()).count()
    }

    pub fn flagged_indices(&self) -> Vec<usize> {
        self.flagged
            .iter()
            .enumerate()
            .filter(|(_, f)| **f)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: usize) -> Question {
        Question {
            id: "q1".to_string(),
            topic_id: "t".to_string(),
            question: "?".to_string(),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: correct,
            explanation: String::new(),
            option_explanations: None,
            difficulty: Difficulty::Easy,
            tags: Vec::new(),
            category: None,
        }
    }

    #[test]
    fn test_validate_rejects_out_of_range_answer() {
        assert!(question(2).validate().is_ok());
        assert!(question(3).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_mismatched_option_explanations() {
        let mut q = question(0);
        q.option_explanations = Some(vec!["only one".into()]);
        assert!(q.validate().is_err());

        q.option_explanations = Some(vec!["a".into(), "b".into(), "c".into()]);
        assert!(q.validate().is_ok());
        assert_eq!(q.option_explanation(1), Some("b"));
    }

    #[test]
    fn test_mode_reveal_rules() {
        assert!(QuizMode::Standard.reveals_on_answer());
        assert!(QuizMode::Incorrect.reveals_on_answer());
        assert!(!QuizMode::Timed.reveals_on_answer());
        assert!(!QuizMode::Review.reveals_on_answer());
        assert!(QuizMode::Review.reveals_on_enter());
        assert!(!QuizMode::Timed.reveals_on_enter());
    }

    #[test]
    fn test_settings_deserialize_defaults() {
        let settings: QuizSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.question_count, 10);
        assert!(!settings.shuffle);
        assert!(settings.difficulty.is_none());
    }
}
