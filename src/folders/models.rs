//! Data models for the deck library folder tree

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A folder in the deck library. Parent links form a forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    /// `None` for a root folder
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Decks directly inside this folder
    #[serde(default)]
    pub deck_count: usize,
    /// Cards in the decks directly inside this folder
    #[serde(default)]
    pub card_count: usize,
    #[serde(default)]
    pub is_expanded: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, parent_id: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            parent_id,
            color: None,
            deck_count: 0,
            card_count: 0,
            is_expanded: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn item_count(&self) -> usize {
        self.deck_count + self.card_count
    }
}

/// A flashcard deck, optionally filed in a folder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<Uuid>,
    #[serde(default)]
    pub card_count: usize,
}

impl Deck {
    pub fn new(name: String, folder_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            folder_id,
            card_count: 0,
        }
    }
}

/// A folder with its children attached, for tree views.
///
/// Clone, equality and drop walk the subtree with an explicit stack, so a
/// very deep chain of folders does not exhaust the call stack. Use
/// `flatten_tree` to serialize a tree.
#[derive(Debug)]
pub struct FolderNode {
    pub folder: Folder,
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of folders in this subtree, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl Drop for FolderNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl Clone for FolderNode {
    fn clone(&self) -> Self {
        Self {
            folder: self.folder.clone(),
            children: clone_forest(&self.children),
        }
    }
}

/// Post-order copy: a node is assembled once all of its children are
fn clone_forest(nodes: &[FolderNode]) -> Vec<FolderNode> {
    let mut cloned = Vec::with_capacity(nodes.len());
    let mut stack: Vec<(&FolderNode, Vec<FolderNode>)> = Vec::new();

    for root in nodes {
        stack.push((root, Vec::with_capacity(root.children.len())));
        while let Some(&(node, ref built)) = stack.last() {
            if let Some(child) = node.children.get(built.len()) {
                stack.push((child, Vec::with_capacity(child.children.len())));
                continue;
            }
            if let Some((node, children)) = stack.pop() {
                let copy = FolderNode {
                    folder: node.folder.clone(),
                    children,
                };
                match stack.last_mut() {
                    Some((_, siblings)) => siblings.push(copy),
                    None => cloned.push(copy),
                }
            }
        }
    }

    cloned
}

impl PartialEq for FolderNode {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.folder != b.folder || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

/// One folder of a tree view, in display order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    #[serde(flatten)]
    pub folder: Folder,
    pub depth: usize,
    pub child_ids: Vec<Uuid>,
}

/// Sort order for folder listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FolderSort {
    /// Case-insensitive name, A to Z
    #[default]
    Name,
    /// Newest first
    CreatedAt,
    /// Decks plus cards, largest first
    ItemCount,
}

/// Deck and card sums over a folder and all its descendants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtreeTotals {
    pub folders: usize,
    pub decks: usize,
    pub cards: usize,
}
