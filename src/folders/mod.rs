//! MedCards folder library
//!
//! This module provides:
//! - Folder and deck models
//! - Tree derivation (forest, breadcrumbs, depth, descendant sets)
//! - Cycle-safe folder edits returning new collections
//! - Sample and JSON-backed deck libraries

mod error;
pub mod hierarchy;
pub mod library;
pub mod models;
pub mod ops;

pub use error::{FolderError, Result};
pub use hierarchy::*;
pub use library::FolderLibrary;
pub use models::*;
pub use ops::*;
