//! Simulated AI explanation generation
//!
//! Stands in for a call to an external model: a request produces a
//! tailored explanation after a fixed delay. Each request carries a
//! `CancellationToken`; navigating away or dropping the generator cancels
//! it so no stale explanation is delivered for a question that is no
//! longer on screen.

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::models::Question;

/// An explanation produced for one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedExplanation {
    pub request_id: Uuid,
    pub question_id: String,
    pub text: String,
}

struct PendingRequest {
    id: Uuid,
    question_id: String,
    token: CancellationToken,
}

pub struct ExplanationGenerator {
    delay: Duration,
    sender: mpsc::UnboundedSender<GeneratedExplanation>,
    pending: Option<PendingRequest>,
}

impl ExplanationGenerator {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<GeneratedExplanation>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                delay,
                sender: tx,
                pending: None,
            },
            rx,
        )
    }

    /// Request an explanation, cancelling any request still in flight.
    /// Must be called inside a tokio runtime.
    pub fn request(&mut self, question: &Question, selected: Option<usize>) -> Uuid {
        self.cancel();

        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let child = token.clone();
        let sender = self.sender.clone();
        let delay = self.delay;
        let explanation = GeneratedExplanation {
            request_id: id,
            question_id: question.id.clone(),
            text: compose_explanation(question, selected),
        };

        log::debug!("Explanation request {} for question {}", id, question.id);
        tokio::spawn(async move {
            tokio::select! {
                _ = child.cancelled() => {
                    log::debug!("Explanation request {} cancelled", explanation.request_id);
                }
                _ = tokio::time::sleep(delay) => {
                    let _ = sender.send(explanation);
                }
            }
        });

        self.pending = Some(PendingRequest {
            id,
            question_id: question.id.clone(),
            token,
        });
        id
    }

    /// Cancel the in-flight request, if any
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_question(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.question_id.as_str())
    }

    /// Accept a delivered explanation if it answers the pending request.
    /// A result that raced with a cancel is discarded here.
    pub fn accept(&mut self, explanation: GeneratedExplanation) -> Option<GeneratedExplanation> {
        let current = self
            .pending
            .as_ref()
            .map_or(false, |p| p.id == explanation.request_id);
        if current {
            self.pending = None;
            Some(explanation)
        } else {
            log::debug!("Discarding stale explanation {}", explanation.request_id);
            None
        }
    }
}

impl Drop for ExplanationGenerator {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Build the explanation text for a question and the option the user picked
pub fn compose_explanation(question: &Question, selected: Option<usize>) -> String {
    let mut text = match question.options.get(question.correct_answer) {
        Some(correct) => format!("The correct answer is \"{}\". {}", correct, question.explanation),
        None => question.explanation.clone(),
    };

    if let Some(choice) = selected.filter(|s| !question.is_correct(*s)) {
        if let Some(option) = question.options.get(choice) {
            text.push_str(&format!("\n\nYou chose \"{}\".", option));
            if let Some(why) = question.option_explanation(choice) {
                text.push(' ');
                text.push_str(why);
            }
        }
    }

    if !question.tags.is_empty() {
        text.push_str(&format!("\n\nRelated concepts: {}", question.tags.join(", ")));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::catalog::QuestionCatalog;
    use crate::quiz::QuestionSource;
    use tokio::sync::mpsc::error::TryRecvError;

    fn heart_failure_question() -> Question {
        QuestionCatalog::sample()
            .questions_for("heart-failure")
            .remove(0)
    }

    #[test]
    fn test_compose_mentions_wrong_choice() {
        let question = heart_failure_question();
        let text = compose_explanation(&question, Some(0));
        assert!(text.contains("Beta-blockers"));
        assert!(text.contains("You chose \"Loop diuretics\""));
        assert!(text.contains("do not reduce mortality"));
    }

    #[test]
    fn test_compose_skips_choice_when_correct() {
        let question = heart_failure_question();
        let text = compose_explanation(&question, Some(1));
        assert!(!text.contains("You chose"));
    }

    #[test]
    fn test_compose_tolerates_out_of_range_answer() {
        let mut question = heart_failure_question();
        question.options.truncate(1);
        question.option_explanations = None;
        question.correct_answer = 5;

        let text = compose_explanation(&question, Some(3));
        assert!(text.starts_with(&question.explanation));
        assert!(!text.contains("The correct answer is"));
        assert!(!text.contains("You chose"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_delivers_after_delay() {
        let (mut generator, mut rx) = ExplanationGenerator::new(Duration::from_millis(1500));
        let question = heart_failure_question();
        let id = generator.request(&question, Some(0));
        assert!(generator.is_pending());
        assert_eq!(generator.pending_question(), Some("hf-1"));

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.request_id, id);
        let accepted = generator.accept(delivered).unwrap();
        assert_eq!(accepted.question_id, "hf-1");
        assert!(!generator.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let (mut generator, mut rx) = ExplanationGenerator::new(Duration::from_millis(1500));
        generator.request(&heart_failure_question(), None);
        generator.cancel();
        assert!(!generator.is_pending());

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_request_supersedes_previous() {
        let (mut generator, mut rx) = ExplanationGenerator::new(Duration::from_millis(1000));
        let questions = QuestionCatalog::sample().questions_for("heart-failure");
        generator.request(&questions[0], None);
        let second = generator.request(&questions[1], None);

        let delivered = rx.recv().await.unwrap();
        assert_eq!(delivered.request_id, second);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_accept_discards_stale() {
        let (mut generator, _rx) = ExplanationGenerator::new(Duration::from_millis(10));
        let stale = GeneratedExplanation {
            request_id: Uuid::new_v4(),
            question_id: "hf-1".to_string(),
            text: String::new(),
        };
        assert!(generator.accept(stale).is_none());
    }
}
