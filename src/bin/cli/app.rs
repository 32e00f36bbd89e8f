use std::path::Path;

use anyhow::{bail, Context, Result};

use medstudy_lib::folders::{Folder, FolderLibrary};
use medstudy_lib::quiz::{QuestionCatalog, QuestionSource, Topic};
use medstudy_lib::AppConfig;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub catalog: QuestionCatalog,
    pub library: FolderLibrary,
}

impl App {
    /// Load config, catalog and library, falling back to the bundled samples
    pub fn new(
        config_path: Option<&Path>,
        catalog_path: Option<&Path>,
        library_path: Option<&Path>,
    ) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AppConfig::load_default().context("Failed to load config")?,
        };

        let catalog = match catalog_path {
            Some(path) => QuestionCatalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
            None => QuestionCatalog::sample(),
        };

        let library = match library_path {
            Some(path) => FolderLibrary::load(path)
                .with_context(|| format!("Failed to load library from {}", path.display()))?,
            None => FolderLibrary::sample(),
        };

        Ok(Self {
            config,
            catalog,
            library,
        })
    }

    /// Find a topic by id or name (case-insensitive prefix match)
    pub fn find_topic(&self, query: &str) -> Result<Topic> {
        let topics = self.catalog.topics();
        let lower = query.to_lowercase();

        // Exact match first
        if let Some(topic) = topics
            .iter()
            .find(|t| t.id == lower || t.name.to_lowercase() == lower)
        {
            return Ok(topic.clone());
        }

        let matches: Vec<&Topic> = topics
            .iter()
            .filter(|t| t.id.starts_with(&lower) || t.name.to_lowercase().starts_with(&lower))
            .collect();

        match matches.len() {
            0 => bail!(
                "No topic matching '{}'. Available topics:\n{}",
                query,
                topics
                    .iter()
                    .map(|t| format!("  - {} ({})", t.name, t.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous topic '{}'. Matches:\n{}",
                query,
                matches
                    .iter()
                    .map(|t| format!("  - {} ({})", t.name, t.id))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    /// Find a folder by name (case-insensitive prefix match)
    pub fn find_folder(&self, name: &str) -> Result<Folder> {
        if let Some(f) = self.library.find_by_name(name) {
            return Ok(f.clone());
        }

        let name_lower = name.to_lowercase();
        let matches: Vec<&Folder> = self
            .library
            .folders
            .iter()
            .filter(|f| f.name.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!("No folder matching '{}'", name),
            1 => Ok(matches[0].clone()),
            _ => bail!(
                "Ambiguous folder name '{}'. Matches:\n{}",
                name,
                matches
                    .iter()
                    .map(|f| format!("  - {}", f.name))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_app() -> App {
        App {
            config: AppConfig::default(),
            catalog: QuestionCatalog::sample(),
            library: FolderLibrary::sample(),
        }
    }

    #[test]
    fn test_find_topic_by_id_and_prefix() {
        let app = sample_app();
        assert_eq!(app.find_topic("heart-failure").unwrap().id, "heart-failure");
        assert_eq!(app.find_topic("Heart").unwrap().id, "heart-failure");
        assert!(app.find_topic("nephrology").is_err());
    }

    #[test]
    fn test_find_folder_exact_beats_prefix() {
        let app = sample_app();
        assert_eq!(app.find_folder("clinical").unwrap().name, "Clinical");
        assert_eq!(app.find_folder("Arrh").unwrap().name, "Arrhythmias");
        assert!(app.find_folder("Zzz").is_err());
    }
}
