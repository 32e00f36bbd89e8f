//! In-memory deck library: the folder collection plus its decks
//!
//! Loaded from a JSON fixture of the shape `{ "folders": [...], "decks": [...] }`
//! or built from the bundled sample set.

use std::fs;
use std::path::Path;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::Result;
use super::models::{Deck, Folder};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderLibrary {
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub decks: Vec<Deck>,
}

impl FolderLibrary {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let library: FolderLibrary = serde_json::from_str(json)?;
        Ok(library.with_counts())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let library = Self::from_json_str(&content)?;
        log::info!(
            "Loaded library from {}: {} folders, {} decks",
            path.display(),
            library.folders.len(),
            library.decks.len()
        );
        Ok(library)
    }

    /// Recompute each folder's direct deck and card counts from `decks`
    pub fn with_counts(mut self) -> Self {
        for folder in &mut self.folders {
            let decks = self.decks.iter().filter(|d| d.folder_id == Some(folder.id));
            let (deck_count, card_count) =
                decks.fold((0, 0), |(n, cards), d| (n + 1, cards + d.card_count));
            folder.deck_count = deck_count;
            folder.card_count = card_count;
        }
        self
    }

    /// Find a folder by name, case-insensitive
    pub fn find_by_name(&self, name: &str) -> Option<&Folder> {
        let lower = name.to_lowercase();
        self.folders.iter().find(|f| f.name.to_lowercase() == lower)
    }

    /// Bundled sample library
    pub fn sample() -> Self {
        let now = Utc::now();
        let mut folders = Vec::new();
        let mut add = |name: &str, parent: Option<Uuid>, color: Option<&str>, age_days: i64| {
            let mut folder = Folder::new(name.to_string(), parent);
            folder.color = color.map(str::to_string);
            folder.created_at = now - Duration::days(age_days);
            folder.updated_at = folder.created_at;
            let id = folder.id;
            folders.push(folder);
            id
        };

        let preclinical = add("Preclinical", None, Some("#3b82f6"), 120);
        let anatomy = add("Anatomy", Some(preclinical), None, 110);
        let physiology = add("Physiology", Some(preclinical), None, 100);
        let clinical = add("Clinical", None, Some("#ef4444"), 60);
        let cardiology = add("Cardiology", Some(clinical), None, 45);
        let arrhythmias = add("Arrhythmias", Some(cardiology), None, 20);
        let endocrine = add("Endocrinology", Some(clinical), None, 30);
        let boards = add("Board Prep", None, Some("#22c55e"), 5);

        let deck = |name: &str, folder: Option<Uuid>, cards: usize| Deck {
            card_count: cards,
            ..Deck::new(name.to_string(), folder)
        };
        let decks = vec![
            deck("Upper Limb", Some(anatomy), 84),
            deck("Brachial Plexus", Some(anatomy), 32),
            deck("Renal Physiology", Some(physiology), 57),
            deck("Heart Failure", Some(cardiology), 40),
            deck("ECG Basics", Some(arrhythmias), 65),
            deck("Diabetes Mellitus", Some(endocrine), 48),
            deck("High-Yield Facts", Some(boards), 150),
            deck("Pharmacology Mnemonics", None, 72),
        ];

        Self { folders, decks }.with_counts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::folders::hierarchy::{build_tree, depth, find_orphans};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_sample_is_well_formed() {
        let library = FolderLibrary::sample();
        assert!(find_orphans(&library.folders).is_empty());
        assert_eq!(build_tree(&library.folders).len(), 3);

        let arrhythmias = library.find_by_name("arrhythmias").unwrap();
        assert_eq!(depth(arrhythmias.id, &library.folders), 2);
    }

    #[test]
    fn test_with_counts() {
        let library = FolderLibrary::sample();
        let anatomy = library.find_by_name("Anatomy").unwrap();
        assert_eq!(anatomy.deck_count, 2);
        assert_eq!(anatomy.card_count, 116);

        let preclinical = library.find_by_name("Preclinical").unwrap();
        assert_eq!(preclinical.deck_count, 0);
    }

    #[test]
    fn test_load_round_trip_through_file() {
        let library = FolderLibrary::sample();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string_pretty(&library).unwrap().as_bytes())
            .unwrap();

        let loaded = FolderLibrary::load(file.path()).unwrap();
        assert_eq!(loaded.folders, library.folders);
        assert_eq!(loaded.decks, library.decks);
    }
}
