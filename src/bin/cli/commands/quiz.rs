use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::app::App;
use crate::render::quiz::{render_question, render_result};
use crate::render::terminal::{paint, wrap_lines, Color};
use crate::OutputFormat;
use medstudy_lib::quiz::clock::{ClockEvent, QuizClock};
use medstudy_lib::quiz::explanation::ExplanationGenerator;
use medstudy_lib::quiz::scoring::format_time;
use medstudy_lib::quiz::{Advance, QuizAttempt, QuizError, QuizMode, QuizResult, QuizSettings};

type InputLines = Lines<BufReader<Stdin>>;

const HELP: &str = "Answer with a number or letter (1 / a). Commands: \
[enter]/n next, p prev, g N go to, m flag, x explain, pause, resume, s submit, q quit, ? help";

/// One line of user input during an attempt
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Next,
    Prev,
    GoTo(usize),
    Flag,
    Explain,
    Pause,
    Resume,
    Submit,
    Quit,
    Help,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let lower = line.trim().to_lowercase();
    let mut parts = lower.split_whitespace();
    let command = parts.next();
    let argument = parts.next();

    match (command, argument) {
        (None, _) => Input::Next,
        (Some("n" | "next"), None) => Input::Next,
        (Some("p" | "prev"), None) => Input::Prev,
        (Some("g" | "goto"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Input::GoTo(n - 1),
            _ => Input::Unknown(lower.clone()),
        },
        (Some("m" | "flag"), None) => Input::Flag,
        (Some("x" | "explain"), None) => Input::Explain,
        (Some("pause"), None) => Input::Pause,
        (Some("resume"), None) => Input::Resume,
        (Some("s" | "submit"), None) => Input::Submit,
        (Some("q" | "quit"), None) => Input::Quit,
        (Some("?" | "help"), None) => Input::Help,
        (Some(word), None) => parse_option(word)
            .map(Input::Answer)
            .unwrap_or_else(|| Input::Unknown(lower.clone())),
        _ => Input::Unknown(lower.clone()),
    }
}

/// `1`..`9` or `a`..`h`, zero-based
fn parse_option(word: &str) -> Option<usize> {
    if let Ok(n) = word.parse::<usize>() {
        return n.checked_sub(1);
    }
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ 'a'..='h'), None) => Some(c as usize - 'a' as usize),
        _ => None,
    }
}

/// How a single attempt ended
enum Ended {
    Finished(QuizResult),
    Quit,
}

pub fn run(
    app: &App,
    topic: &str,
    mode: QuizMode,
    settings: &QuizSettings,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let topic = app.find_topic(topic)?;
    let attempt = match QuizAttempt::start(&app.catalog, &topic.id, mode, settings) {
        Ok(attempt) => attempt,
        Err(QuizError::NoQuestions(_)) => {
            println!(
                "{}",
                paint(
                    &format!("No questions available for '{}' with these settings", topic.name),
                    Color::YELLOW,
                    use_color
                )
            );
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to start quiz"),
    };

    println!("{}", paint(&topic.name, Color::BOLD, use_color));
    if settings.question_count > attempt.len() {
        println!(
            "Only {} question(s) available, {} requested",
            attempt.len(),
            settings.question_count
        );
    }
    println!("{}", paint(HELP, Color::GRAY, use_color));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let outcome = runtime.block_on(session(app, attempt, settings, format, use_color));
    // A pending stdin read would otherwise hold the runtime open
    runtime.shutdown_background();
    outcome
}

/// Play attempts until the user quits, offering a retry after each result
async fn session(
    app: &App,
    mut attempt: QuizAttempt,
    settings: &QuizSettings,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let delay = app.config.explanation.delay();

    loop {
        let origin = attempt.clone();
        let result = match play(attempt, &mut lines, delay, use_color).await? {
            Ended::Finished(result) => result,
            Ended::Quit => return Ok(()),
        };
        print_result(&result, format, use_color)?;

        attempt = loop {
            println!(
                "{}",
                paint("[r] retry missed  [a] start again  [q] quit", Color::GRAY, use_color)
            );
            let Some(line) = lines.next_line().await.context("Failed to read input")? else {
                return Ok(());
            };
            match line.trim().to_lowercase().as_str() {
                "r" => match QuizAttempt::start_incorrect(&result) {
                    Ok(next) => break next,
                    Err(QuizError::NoQuestions(_)) => println!("Nothing missed. Well done!"),
                    Err(e) => return Err(e).context("Failed to start retry"),
                },
                "a" => break origin.retry(&app.catalog, settings).context("Failed to restart quiz")?,
                "q" | "quit" => return Ok(()),
                other => println!("Unknown choice '{}'", other),
            }
        };
    }
}

async fn play(
    mut attempt: QuizAttempt,
    lines: &mut InputLines,
    delay: Duration,
    use_color: bool,
) -> Result<Ended> {
    let (clock, mut ticks) = QuizClock::start();
    let (mut explainer, mut explanations) = ExplanationGenerator::new(delay);
    print_lines(render_question(&attempt, use_color));

    loop {
        tokio::select! {
            Some(ClockEvent::Tick) = ticks.recv() => {
                attempt = attempt.tick();
                match attempt.time_remaining() {
                    Some(0) => {
                        clock.shutdown();
                        println!("{}", paint("Time is up.", Color::RED, use_color));
                        return Ok(Ended::Finished(attempt.submit()));
                    }
                    Some(60) => println!("{}", paint("One minute left", Color::YELLOW, use_color)),
                    _ => {}
                }
            }
            Some(delivered) = explanations.recv() => {
                if let Some(explanation) = explainer.accept(delivered) {
                    println!();
                    print_lines(wrap_lines(&explanation.text, "  ", 78));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    return Ok(Ended::Quit);
                };
                let input = parse_input(&line);

                if attempt.is_paused() && !matches!(input, Input::Resume | Input::Quit) {
                    println!("Paused. Type 'resume' to continue.");
                    continue;
                }

                match input {
                    Input::Answer(option) => match attempt.select_answer(option) {
                        Ok(next) => {
                            attempt = next;
                            print_lines(render_question(&attempt, use_color));
                        }
                        Err(QuizError::InvalidOption { available, .. }) => {
                            println!("Pick one of the {} options", available);
                        }
                        Err(e) => return Err(e).context("Failed to record answer"),
                    },
                    Input::Next => {
                        explainer.cancel();
                        match attempt.advance() {
                            Advance::Moved(next) => {
                                attempt = next;
                                print_lines(render_question(&attempt, use_color));
                            }
                            Advance::Finished(result) => return Ok(Ended::Finished(result)),
                        }
                    }
                    Input::Prev => {
                        explainer.cancel();
                        attempt = attempt.retreat();
                        print_lines(render_question(&attempt, use_color));
                    }
                    Input::GoTo(index) => match attempt.go_to(index) {
                        Ok(next) => {
                            explainer.cancel();
                            attempt = next;
                            print_lines(render_question(&attempt, use_color));
                        }
                        Err(_) => println!("There are {} questions", attempt.len()),
                    },
                    Input::Flag => {
                        attempt = attempt
                            .toggle_flag(attempt.current_index())
                            .context("Failed to flag question")?;
                        let state = if attempt.flagged()[attempt.current_index()] {
                            "Flagged"
                        } else {
                            "Unflagged"
                        };
                        println!("{} question {}", state, attempt.current_index() + 1);
                    }
                    Input::Explain => {
                        if attempt.is_current_revealed() {
                            explainer.request(attempt.current_question(), attempt.current_answer());
                            println!("{}", paint("Generating explanation...", Color::GRAY, use_color));
                        } else {
                            println!("Explanations are available once the answer is revealed");
                        }
                    }
                    Input::Pause => {
                        attempt = attempt.pause();
                        clock.pause();
                        println!("Paused at {}", format_time(attempt.elapsed_secs()));
                    }
                    Input::Resume => {
                        if attempt.is_paused() {
                            attempt = attempt.resume();
                            clock.resume();
                            print_lines(render_question(&attempt, use_color));
                        }
                    }
                    Input::Submit => {
                        clock.shutdown();
                        return Ok(Ended::Finished(attempt.submit()));
                    }
                    Input::Quit => {
                        clock.shutdown();
                        return Ok(Ended::Quit);
                    }
                    Input::Help => println!("{}", HELP),
                    Input::Unknown(text) => println!("Unknown input '{}'. Type ? for help.", text),
                }
            }
        }
    }
}

fn print_result(result: &QuizResult, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Plain => print_lines(render_result(result, use_color)),
    }
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answers() {
        assert_eq!(parse_input("2"), Input::Answer(1));
        assert_eq!(parse_input(" B "), Input::Answer(1));
        assert_eq!(parse_input("h"), Input::Answer(7));
        assert_eq!(parse_input("0"), Input::Unknown("0".to_string()));
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(""), Input::Next);
        assert_eq!(parse_input("next"), Input::Next);
        assert_eq!(parse_input("p"), Input::Prev);
        assert_eq!(parse_input("g 3"), Input::GoTo(2));
        assert_eq!(parse_input("goto 0"), Input::Unknown("goto 0".to_string()));
        assert_eq!(parse_input("Pause"), Input::Pause);
        assert_eq!(parse_input("x"), Input::Explain);
        assert_eq!(parse_input("q"), Input::Quit);
    }

    #[test]
    fn test_parse_rejects_extra_words() {
        assert_eq!(parse_input("n now"), Input::Unknown("n now".to_string()));
        assert_eq!(parse_input("zz"), Input::Unknown("zz".to_string()));
    }
}
