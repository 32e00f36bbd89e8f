//! Scoring for finished attempts
//!
//! Score is the percentage of correct answers rounded to the nearest
//! integer, halves rounding up: 1/3 -> 33, 2/3 -> 67, 1/8 -> 13.

use super::models::{Difficulty, DifficultyStats, Question, QuizResult};

/// Count answers matching the correct option
pub fn correct_count(questions: &[Question], answers: &[Option<usize>]) -> usize {
    questions
        .iter()
        .zip(answers)
        .filter(|(q, a)| a.map_or(false, |a| q.is_correct(a)))
        .count()
}

/// Percentage score, 0 when there are no questions
pub fn score_percent(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    // Integer form of round(100 * correct / total)
    ((200 * correct + total) / (2 * total)) as u32
}

/// Correct/total counts per difficulty, skipping levels with no questions
pub fn difficulty_breakdown(result: &QuizResult) -> Vec<DifficultyStats> {
    Difficulty::all()
        .into_iter()
        .filter_map(|difficulty| {
            let mut stats = DifficultyStats {
                difficulty,
                correct: 0,
                total: 0,
            };
            for (q, a) in result.questions.iter().zip(&result.answers) {
                if q.difficulty != difficulty {
                    continue;
                }
                stats.total += 1;
                if a.map_or(false, |a| q.is_correct(a)) {
                    stats.correct += 1;
                }
            }
            (stats.total > 0).then_some(stats)
        })
        .collect()
}

/// Short feedback line shown with the score
pub fn performance_label(score: u32) -> &'static str {
    match score {
        90..=100 => "Excellent",
        75..=89 => "Good",
        60..=74 => "Fair",
        _ => "Needs review",
    }
}

/// Format seconds as `m:ss`, or `h:mm:ss` past an hour
pub fn format_time(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
