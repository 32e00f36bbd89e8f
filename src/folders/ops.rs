//! Folder edits
//!
//! Each operation takes the current collection and returns a new one,
//! leaving the input as it was. A rejected edit returns an error and no
//! collection, so the caller keeps showing the old state.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use super::error::{FolderError, Result};
use super::hierarchy::descendant_ids;
use super::models::Folder;

fn position(folders: &[Folder], id: Uuid) -> Result<usize> {
    folders
        .iter()
        .position(|f| f.id == id)
        .ok_or(FolderError::FolderNotFound(id))
}

fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FolderError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Add a folder under `parent_id` (or at the root). Returns the new
/// collection and the created folder.
pub fn create_folder(
    folders: &[Folder],
    name: &str,
    parent_id: Option<Uuid>,
) -> Result<(Vec<Folder>, Folder)> {
    let name = clean_name(name)?;
    if let Some(parent) = parent_id {
        position(folders, parent)?;
    }

    let folder = Folder::new(name, parent_id);
    let mut next = folders.to_vec();
    next.push(folder.clone());
    log::debug!("Created folder {} ({})", folder.name, folder.id);
    Ok((next, folder))
}

pub fn rename_folder(folders: &[Folder], folder_id: Uuid, name: &str) -> Result<Vec<Folder>> {
    let idx = position(folders, folder_id)?;
    let name = clean_name(name)?;

    let mut next = folders.to_vec();
    next[idx].name = name;
    next[idx].updated_at = Utc::now();
    Ok(next)
}

pub fn set_color(folders: &[Folder], folder_id: Uuid, color: Option<String>) -> Result<Vec<Folder>> {
    let idx = position(folders, folder_id)?;
    let mut next = folders.to_vec();
    next[idx].color = color;
    next[idx].updated_at = Utc::now();
    Ok(next)
}

pub fn toggle_expanded(folders: &[Folder], folder_id: Uuid) -> Result<Vec<Folder>> {
    let idx = position(folders, folder_id)?;
    let mut next = folders.to_vec();
    next[idx].is_expanded = !next[idx].is_expanded;
    Ok(next)
}

/// Re-parent a folder. `None` moves it to the root.
///
/// Rejects a destination inside the folder's own subtree, which would
/// otherwise detach the subtree into a cycle.
pub fn move_folder(
    folders: &[Folder],
    folder_id: Uuid,
    new_parent_id: Option<Uuid>,
) -> Result<Vec<Folder>> {
    let idx = position(folders, folder_id)?;

    if let Some(destination) = new_parent_id {
        position(folders, destination)?;
        if descendant_ids(folder_id, folders).contains(&destination) {
            log::warn!(
                "Rejected move of folder {} into its own subtree ({})",
                folder_id,
                destination
            );
            return Err(FolderError::InvalidDestination {
                folder: folder_id,
                destination,
            });
        }
    }

    let mut next = folders.to_vec();
    next[idx].parent_id = new_parent_id;
    next[idx].updated_at = Utc::now();
    log::debug!("Moved folder {} to {:?}", folder_id, new_parent_id);
    Ok(next)
}

/// Delete a folder and everything below it. Returns the remaining
/// collection and the ids removed.
pub fn delete_folder(folders: &[Folder], folder_id: Uuid) -> Result<(Vec<Folder>, HashSet<Uuid>)> {
    position(folders, folder_id)?;

    let removed = descendant_ids(folder_id, folders);
    let next: Vec<Folder> = folders
        .iter()
        .filter(|f| !removed.contains(&f.id))
        .cloned()
        .collect();

    log::info!(
        "Deleted folder {} with {} folder(s) in its subtree",
        folder_id,
        removed.len()
    );
    Ok((next, removed))
}
