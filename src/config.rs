//! Application configuration
//!
//! Read from `config.toml` in the platform config directory
//! (e.g. `~/.config/medstudy/config.toml`). Every field has a default, so a
//! missing file or a partial file is fine.
//!
//! ```toml
//! [quiz]
//! question_count = 10
//! shuffle = true
//! time_limit_secs = 600
//!
//! [explanation]
//! delay_ms = 1500
//!
//! [folders]
//! sort = "name"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::folders::FolderSort;
use crate::quiz::{Difficulty, QuizMode, QuizSettings};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quiz: QuizDefaults,
    pub explanation: ExplanationConfig,
    pub folders: FolderDefaults,
}

/// Defaults applied when starting a quiz from the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizDefaults {
    pub mode: QuizMode,
    pub question_count: usize,
    pub shuffle: bool,
    pub difficulty: Option<Difficulty>,
    /// Seconds allowed for a timed attempt
    pub time_limit_secs: Option<u64>,
}

impl Default for QuizDefaults {
    fn default() -> Self {
        Self {
            mode: QuizMode::Standard,
            question_count: 10,
            shuffle: true,
            difficulty: None,
            time_limit_secs: Some(600),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplanationConfig {
    /// Simulated generation latency
    pub delay_ms: u64,
}

impl Default for ExplanationConfig {
    fn default() -> Self {
        Self { delay_ms: 1500 }
    }
}

impl ExplanationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderDefaults {
    pub sort: FolderSort,
}

impl AppConfig {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("medstudy").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location, or defaults if there is none
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Quiz settings from the configured defaults
    pub fn quiz_settings(&self) -> QuizSettings {
        QuizSettings {
            question_count: self.quiz.question_count,
            difficulty: self.quiz.difficulty,
            shuffle: self.quiz.shuffle,
            time_limit_secs: self.quiz.time_limit_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config.quiz.question_count, 10);
        assert_eq!(config.explanation.delay(), Duration::from_millis(1500));
        assert_eq!(config.folders.sort, FolderSort::Name);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[quiz]\nquestion_count = 5\ndifficulty = \"hard\"\nmode = \"timed\"\n\n[folders]\nsort = \"itemCount\"\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.quiz.question_count, 5);
        assert_eq!(config.quiz.difficulty, Some(Difficulty::Hard));
        assert_eq!(config.quiz.mode, QuizMode::Timed);
        assert!(config.quiz.shuffle);
        assert_eq!(config.explanation.delay_ms, 1500);
        assert_eq!(config.folders.sort, FolderSort::ItemCount);

        let settings = config.quiz_settings();
        assert_eq!(settings.question_count, 5);
        assert_eq!(settings.time_limit_secs, Some(600));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let result = AppConfig::from_toml_str("[quiz\nquestion_count = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }
}
