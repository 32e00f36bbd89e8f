use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum FolderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Folder not found: {0}")]
    FolderNotFound(Uuid),

    #[error("Cannot move folder {folder} into {destination}: destination is the folder itself or one of its descendants")]
    InvalidDestination { folder: Uuid, destination: Uuid },

    #[error("Folder name cannot be empty")]
    EmptyName,
}

pub type Result<T> = std::result::Result<T, FolderError>;
