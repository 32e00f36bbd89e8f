//! Quiz attempt lifecycle
//!
//! A `QuizAttempt` is a value: every operation returns a new attempt and
//! leaves the old one untouched, so a caller holding the previous value
//! always sees a consistent snapshot.
//!
//! Per question the view state moves `Unanswered -> Answered -> Revealed`.
//! When the reveal happens depends on the mode:
//! - Standard / Incorrect: as soon as an answer is picked; the answer is
//!   then frozen.
//! - Review: when the question is entered.
//! - Timed: never during the attempt, only in the submitted result.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use super::catalog::QuestionSource;
use super::error::{QuizError, Result};
use super::models::{Question, QuestionState, QuizMode, QuizResult, QuizSettings};
use super::scoring;

/// Result of moving forward from the current question
#[derive(Debug, Clone)]
pub enum Advance {
    Moved(QuizAttempt),
    /// Advanced past the last question, which submits the attempt
    Finished(QuizResult),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    id: Uuid,
    topic_id: String,
    mode: QuizMode,
    questions: Vec<Question>,
    answers: Vec<Option<usize>>,
    flagged: Vec<bool>,
    revealed: Vec<bool>,
    elapsed_secs: u64,
    current: usize,
    paused: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit_secs: Option<u64>,
    started_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Start an attempt for a topic, drawing from `source`
    pub fn start(
        source: &impl QuestionSource,
        topic_id: &str,
        mode: QuizMode,
        settings: &QuizSettings,
    ) -> Result<Self> {
        Self::start_with_rng(source, topic_id, mode, settings, &mut rand::thread_rng())
    }

    /// Same as `start` with an explicit RNG for the shuffle
    pub fn start_with_rng<R: Rng + ?Sized>(
        source: &impl QuestionSource,
        topic_id: &str,
        mode: QuizMode,
        settings: &QuizSettings,
        rng: &mut R,
    ) -> Result<Self> {
        if !source.has_topic(topic_id) {
            return Err(QuizError::TopicNotFound(topic_id.to_string()));
        }

        let mut pool = source.questions_for(topic_id);
        if let Some(difficulty) = settings.difficulty {
            pool.retain(|q| q.difficulty == difficulty);
        }
        if settings.shuffle {
            pool.shuffle(rng);
        }

        let requested = if settings.question_count == 0 {
            pool.len()
        } else {
            settings.question_count
        };
        if requested > pool.len() {
            log::debug!(
                "Topic {} has {} matching questions, {} requested",
                topic_id,
                pool.len(),
                requested
            );
        }
        pool.truncate(requested);

        let time_limit = match mode {
            QuizMode::Timed => settings.time_limit_secs,
            _ => None,
        };

        Self::from_questions(topic_id, mode, pool, time_limit)
    }

    /// Build an attempt over an explicit question list
    pub fn from_questions(
        topic_id: &str,
        mode: QuizMode,
        questions: Vec<Question>,
        time_limit_secs: Option<u64>,
    ) -> Result<Self> {
        if questions.is_empty() {
            return Err(QuizError::NoQuestions(topic_id.to_string()));
        }
        for question in &questions {
            question.validate().map_err(QuizError::InvalidQuestion)?;
        }

        let len = questions.len();
        let mut attempt = Self {
            id: Uuid::new_v4(),
            topic_id: topic_id.to_string(),
            mode,
            questions,
            answers: vec![None; len],
            flagged: vec![false; len],
            revealed: vec![false; len],
            elapsed_secs: 0,
            current: 0,
            paused: false,
            time_limit_secs,
            started_at: Utc::now(),
        };
        attempt.enter(0);

        log::info!(
            "Started {:?} attempt {} on {} with {} questions",
            mode,
            attempt.id,
            attempt.topic_id,
            len
        );
        Ok(attempt)
    }

    /// Start an `Incorrect`-mode attempt over the questions missed in `result`
    pub fn start_incorrect(result: &QuizResult) -> Result<Self> {
        Self::from_questions(
            &result.topic_id,
            QuizMode::Incorrect,
            result.missed_questions(),
            None,
        )
    }

    /// Fresh attempt over the same questions with cleared answers and flags
    pub fn restart(&self, shuffle: bool) -> Self {
        self.restart_with_rng(shuffle, &mut rand::thread_rng())
    }

    pub fn restart_with_rng<R: Rng + ?Sized>(&self, shuffle: bool, rng: &mut R) -> Self {
        let mut questions = self.questions.clone();
        if shuffle {
            questions.shuffle(rng);
        }
        let len = questions.len();
        let mut attempt = Self {
            id: Uuid::new_v4(),
            questions,
            answers: vec![None; len],
            flagged: vec![false; len],
            revealed: vec![false; len],
            elapsed_secs: 0,
            current: 0,
            paused: false,
            started_at: Utc::now(),
            ..self.clone()
        };
        attempt.enter(0);
        log::info!("Restarted attempt {} as {}", self.id, attempt.id);
        attempt
    }

    /// New attempt on the same topic and mode with a fresh draw from `source`.
    /// An `Incorrect` attempt has no topic pool of its own, so it restarts
    /// over the same missed questions instead.
    pub fn retry(&self, source: &impl QuestionSource, settings: &QuizSettings) -> Result<Self> {
        match self.mode {
            QuizMode::Incorrect => Ok(self.restart(settings.shuffle)),
            mode => Self::start(source, &self.topic_id, mode, settings),
        }
    }

    // ===== Accessors =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn flagged(&self) -> &[bool] {
        &self.flagged
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn current_answer(&self) -> Option<usize> {
        self.answers[self.current]
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_secs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn question_state(&self, index: usize) -> Option<QuestionState> {
        let answer = *self.answers.get(index)?;
        Some(if self.revealed[index] {
            QuestionState::Revealed(answer)
        } else {
            match answer {
                Some(a) => QuestionState::Answered(a),
                None => QuestionState::Unanswered,
            }
        })
    }

    /// Whether feedback for the current question is visible
    pub fn is_current_revealed(&self) -> bool {
        self.revealed[self.current]
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

    /// Position of the cursor as a percentage of the attempt
    pub fn progress_percent(&self) -> u32 {
        scoring::score_percent(self.current + 1, self.questions.len())
    }

    pub fn time_remaining(&self) -> Option<u64> {
        self.time_limit_secs
            .map(|limit| limit.saturating_sub(self.elapsed_secs))
    }

    pub fn is_time_up(&self) -> bool {
        self.time_remaining() == Some(0)
    }

    // ===== Operations =====

    /// Pick an option for the current question
    pub fn select_answer(&self, option: usize) -> Result<Self> {
        let question = self.current_question();
        if option >= question.options.len() {
            return Err(QuizError::InvalidOption {
                option,
                available: question.options.len(),
            });
        }

        if self.answers[self.current] == Some(option) {
            return Ok(self.clone());
        }
        if self.revealed[self.current] && self.mode.reveals_on_answer() {
            log::debug!(
                "Ignoring answer change on revealed question {} of attempt {}",
                self.current,
                self.id
            );
            return Ok(self.clone());
        }

        let mut next = self.clone();
        next.answers[next.current] = Some(option);
        if next.mode.reveals_on_answer() {
            next.revealed[next.current] = true;
        }
        log::debug!(
            "Attempt {}: question {} answered with option {}",
            next.id,
            next.current,
            option
        );
        Ok(next)
    }

    pub fn toggle_flag(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.flagged[index] = !next.flagged[index];
        Ok(next)
    }

    /// Move to the next question, submitting when already on the last one
    pub fn advance(&self) -> Advance {
        if self.is_last() {
            return Advance::Finished(self.submit());
        }
        let mut next = self.clone();
        next.enter(self.current + 1);
        Advance::Moved(next)
    }

    /// Move to the previous question, staying put on the first
    pub fn retreat(&self) -> Self {
        let mut next = self.clone();
        next.enter(self.current.saturating_sub(1));
        next
    }

    /// Jump straight to a question
    pub fn go_to(&self, index: usize) -> Result<Self> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.enter(index);
        Ok(next)
    }

    /// Add one second to the clock unless paused
    pub fn tick(&self) -> Self {
        let mut next = self.clone();
        if !next.paused {
            next.elapsed_secs += 1;
        }
        next
    }

    pub fn pause(&self) -> Self {
        Self {
            paused: true,
            ..self.clone()
        }
    }

    pub fn resume(&self) -> Self {
        Self {
            paused: false,
            ..self.clone()
        }
    }

    /// Freeze the attempt into a result. Pure, so repeated calls agree.
    pub fn submit(&self) -> QuizResult {
        let correct_count = scoring::correct_count(&self.questions, &self.answers);
        let total = self.questions.len();
        let score = scoring::score_percent(correct_count, total);

        log::info!(
            "Submitted attempt {}: {}/{} correct ({}%) in {}s",
            self.id,
            correct_count,
            total,
            score,
            self.elapsed_secs
        );

        QuizResult {
            attempt_id: self.id,
            topic_id: self.topic_id.clone(),
            mode: self.mode,
            score,
            correct_count,
            total_questions: total,
            time_spent_secs: self.elapsed_secs,
            questions: self.questions.clone(),
            answers: self.answers.clone(),
            flagged: self.flagged.clone(),
            // Keyed to the attempt start so repeated submits are identical
            completed_at: self.started_at
                + chrono::Duration::seconds(self.elapsed_secs as i64),
        }
    }

    fn enter(&mut self, index: usize) {
        self.current = index;
        if self.mode.reveals_on_enter() {
            self.revealed[index] = true;
        }
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.questions.len() {
            return Err(QuizError::QuestionOutOfRange {
                index,
                len: self.questions.len(),
            });
        }
        Ok(())
    }
}
