mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use medstudy_lib::folders::{FolderError, FolderSort};
use medstudy_lib::quiz::{Difficulty, QuizMode};

#[derive(Parser)]
#[command(name = "medstudy-cli", about = "Medical study quizzes and deck folders", version)]
struct Cli {
    /// Config file (default: <config dir>/medstudy/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Question catalog JSON (default: bundled sample)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Folder library JSON (default: bundled sample)
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum ModeArg {
    Standard,
    Timed,
    Review,
    Incorrect,
}

impl From<ModeArg> for QuizMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Standard => QuizMode::Standard,
            ModeArg::Timed => QuizMode::Timed,
            ModeArg::Review => QuizMode::Review,
            ModeArg::Incorrect => QuizMode::Incorrect,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum SortArg {
    Name,
    Created,
    Items,
}

impl From<SortArg> for FolderSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Name => FolderSort::Name,
            SortArg::Created => FolderSort::CreatedAt,
            SortArg::Items => FolderSort::ItemCount,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List quiz topics
    Topics,

    /// Take an interactive quiz
    Quiz {
        /// Topic id or name (case-insensitive prefix match)
        topic: String,
        /// Reveal behavior (default from config)
        #[arg(long)]
        mode: Option<ModeArg>,
        /// Number of questions, 0 for all (default from config)
        #[arg(long)]
        count: Option<usize>,
        /// Only draw questions of this difficulty
        #[arg(long)]
        difficulty: Option<DifficultyArg>,
        /// Shuffle question order
        #[arg(long, conflicts_with = "no_shuffle")]
        shuffle: bool,
        /// Keep catalog order
        #[arg(long)]
        no_shuffle: bool,
        /// Time limit in seconds for timed mode
        #[arg(long)]
        time_limit: Option<u64>,
    },

    /// Browse and reorganize deck folders
    #[command(subcommand)]
    Folders(FoldersCommand),
}

#[derive(Subcommand)]
enum FoldersCommand {
    /// Show the folder tree
    Tree {
        /// Sort order (default from config)
        #[arg(long)]
        sort: Option<SortArg>,
    },

    /// Show the tree in a given order
    Sort {
        #[arg(long)]
        by: SortArg,
    },

    /// Show the breadcrumb and totals for a folder
    Path {
        /// Folder name (case-insensitive prefix match)
        name: String,
    },

    /// List folders a folder may be moved into
    Destinations { name: String },

    /// Move a folder under another one, or to the root
    Move {
        name: String,
        /// Destination folder (omit for root)
        #[arg(long)]
        to: Option<String>,
    },

    /// Delete a folder with its subfolders and decks
    Delete { name: String },

    /// Create a folder
    Create {
        name: String,
        /// Parent folder (omit for root)
        #[arg(long)]
        parent: Option<String>,
    },

    /// Rename a folder
    Rename { name: String, new_name: String },

    /// Set a folder color (hex like #4f9dde, or "none")
    Color { name: String, color: String },

    /// Toggle whether a folder is expanded
    Expand { name: String },
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:?}", err);
            ExitCode::from(exit_status(&err))
        }
    }
}

/// 2 for a rejected folder move, 1 for anything else
fn exit_status(err: &anyhow::Error) -> u8 {
    let rejected_move = err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<FolderError>(),
            Some(FolderError::InvalidDestination { .. })
        )
    });
    if rejected_move {
        2
    } else {
        1
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let app = app::App::new(
        cli.config.as_deref(),
        cli.catalog.as_deref(),
        cli.library.as_deref(),
    )?;

    match cli.command {
        Command::Topics => commands::topics::run(&app, &cli.format, use_color)?,
        Command::Quiz {
            topic,
            mode,
            count,
            difficulty,
            shuffle,
            no_shuffle,
            time_limit,
        } => {
            let mut settings = app.config.quiz_settings();
            if let Some(count) = count {
                settings.question_count = count;
            }
            if let Some(difficulty) = difficulty {
                settings.difficulty = Some(difficulty.into());
            }
            if shuffle {
                settings.shuffle = true;
            } else if no_shuffle {
                settings.shuffle = false;
            }
            if time_limit.is_some() {
                settings.time_limit_secs = time_limit;
            }
            let mode = mode.map(QuizMode::from).unwrap_or(app.config.quiz.mode);
            commands::quiz::run(&app, &topic, mode, &settings, &cli.format, use_color)?;
        }
        Command::Folders(subcmd) => match subcmd {
            FoldersCommand::Tree { sort } => {
                commands::folders::run_tree(&app, sort.map(FolderSort::from), &cli.format, use_color)?
            }
            FoldersCommand::Sort { by } => {
                commands::folders::run_tree(&app, Some(by.into()), &cli.format, use_color)?
            }
            FoldersCommand::Path { name } => {
                commands::folders::run_path(&app, &name, &cli.format, use_color)?
            }
            FoldersCommand::Destinations { name } => {
                commands::folders::run_destinations(&app, &name, &cli.format, use_color)?
            }
            FoldersCommand::Move { name, to } => {
                commands::folders::run_move(&app, &name, to.as_deref(), &cli.format, use_color)?
            }
            FoldersCommand::Delete { name } => {
                commands::folders::run_delete(&app, &name, &cli.format, use_color)?
            }
            FoldersCommand::Create { name, parent } => {
                commands::folders::run_create(&app, &name, parent.as_deref(), &cli.format, use_color)?
            }
            FoldersCommand::Rename { name, new_name } => {
                commands::folders::run_rename(&app, &name, &new_name, &cli.format, use_color)?
            }
            FoldersCommand::Color { name, color } => {
                let color = (!color.eq_ignore_ascii_case("none")).then_some(color);
                commands::folders::run_color(&app, &name, color.as_deref(), &cli.format, use_color)?
            }
            FoldersCommand::Expand { name } => {
                commands::folders::run_expand(&app, &name, &cli.format, use_color)?
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use uuid::Uuid;

    #[test]
    fn test_rejected_move_exits_with_two() {
        let err: anyhow::Result<()> = Err(FolderError::InvalidDestination {
            folder: Uuid::new_v4(),
            destination: Uuid::new_v4(),
        })
        .context("Cannot move 'Clinical' into 'Arrhythmias'");
        assert_eq!(exit_status(&err.unwrap_err()), 2);
    }

    #[test]
    fn test_other_errors_exit_with_one() {
        let err = anyhow::anyhow!("No folder matching 'Zzz'");
        assert_eq!(exit_status(&err), 1);
        let not_found: anyhow::Error = FolderError::FolderNotFound(Uuid::new_v4()).into();
        assert_eq!(exit_status(&not_found), 1);
    }
}
