use medstudy_lib::quiz::scoring::{difficulty_breakdown, format_time, performance_label};
use medstudy_lib::quiz::{Outcome, QuestionState, QuizAttempt, QuizResult};

use super::terminal::{paint, wrap_lines, Color};

const OPTION_LABELS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

fn label(index: usize) -> String {
    OPTION_LABELS
        .get(index)
        .map(|c| c.to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Render the current question with its options and, once revealed, feedback
pub fn render_question(attempt: &QuizAttempt, use_color: bool) -> Vec<String> {
    let index = attempt.current_index();
    let question = attempt.current_question();
    let state = attempt.question_state(index).unwrap_or(QuestionState::Unanswered);
    let mut lines = Vec::new();

    let flag = if attempt.flagged()[index] { " [flagged]" } else { "" };
    let timer = match attempt.time_remaining() {
        Some(left) => format!("{} left", format_time(left)),
        None => format_time(attempt.elapsed_secs()),
    };
    lines.push(String::new());
    lines.push(paint(
        &format!(
            "Question {}/{} ({}){}  {}",
            index + 1,
            attempt.len(),
            question.difficulty.as_str(),
            flag,
            timer
        ),
        Color::CYAN,
        use_color,
    ));
    lines.extend(wrap_lines(&question.question, "", 80));
    lines.push(String::new());

    let (selected, revealed) = match state {
        QuestionState::Unanswered => (None, false),
        QuestionState::Answered(a) => (Some(a), false),
        QuestionState::Revealed(a) => (a, true),
    };

    for (i, option) in question.options.iter().enumerate() {
        let marker = if selected == Some(i) { ">" } else { " " };
        let text = format!("{} {}. {}", marker, label(i), option);
        let styled = if revealed && question.is_correct(i) {
            paint(&text, Color::GREEN, use_color)
        } else if revealed && selected == Some(i) {
            paint(&text, Color::RED, use_color)
        } else {
            text
        };
        lines.push(styled);
    }

    if revealed {
        lines.push(String::new());
        let verdict = match selected {
            Some(a) if question.is_correct(a) => paint("Correct!", Color::GREEN, use_color),
            Some(_) => paint("Incorrect.", Color::RED, use_color),
            None => paint(
                &format!("Answer: {}", label(question.correct_answer)),
                Color::YELLOW,
                use_color,
            ),
        };
        lines.push(verdict);
        lines.extend(wrap_lines(&question.explanation, "  ", 78));
        if let Some(why) = selected.and_then(|a| question.option_explanation(a)) {
            lines.extend(wrap_lines(why, "  ", 78));
        }
    }

    lines
}

pub fn render_result(result: &QuizResult, use_color: bool) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        paint("Quiz complete", Color::BOLD, use_color),
        format!(
            "Score: {}% ({}/{}) - {}",
            result.score,
            result.correct_count,
            result.total_questions,
            performance_label(result.score)
        ),
        format!("Time: {}", format_time(result.time_spent_secs)),
        format!(
            "Answered: {}/{}",
            result.answered_count(),
            result.total_questions
        ),
    ];

    for stats in difficulty_breakdown(result) {
        lines.push(format!(
            "  {:<6} {}/{}",
            stats.difficulty.as_str(),
            stats.correct,
            stats.total
        ));
    }

    lines.push(String::new());
    for (i, (question, outcome)) in result.questions.iter().zip(result.outcomes()).enumerate() {
        let (mark, color) = match outcome {
            Outcome::Correct => ("+", Color::GREEN),
            Outcome::Incorrect => ("x", Color::RED),
            Outcome::Unanswered => ("-", Color::GRAY),
        };
        let flag = if result.flagged[i] { " [flagged]" } else { "" };
        lines.push(format!(
            "{} {}. {}{}",
            paint(mark, color, use_color),
            i + 1,
            question.question,
            flag
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use medstudy_lib::quiz::{QuestionCatalog, QuizMode, QuizSettings};

    fn attempt(mode: QuizMode) -> QuizAttempt {
        QuizAttempt::start(
            &QuestionCatalog::sample(),
            "heart-failure",
            mode,
            &QuizSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_render_unanswered_question() {
        let lines = render_question(&attempt(QuizMode::Standard), false);
        assert!(lines[1].starts_with("Question 1/3 (easy)"));
        assert!(lines.iter().any(|l| l == "  B. Beta-blockers"));
        assert!(!lines.iter().any(|l| l.contains("Correct!")));
    }

    #[test]
    fn test_render_revealed_question() {
        let answered = attempt(QuizMode::Standard).select_answer(0).unwrap();
        let lines = render_question(&answered, false);
        assert!(lines.iter().any(|l| l == "> A. Loop diuretics"));
        assert!(lines.iter().any(|l| l == "Incorrect."));
    }

    #[test]
    fn test_render_result_summary() {
        let result = attempt(QuizMode::Standard)
            .select_answer(1)
            .unwrap()
            .submit();
        let lines = render_result(&result, false);
        assert!(lines.iter().any(|l| l == "Score: 33% (1/3) - Needs review"));
        assert!(lines.iter().any(|l| l == "Answered: 1/3"));
    }
}
