//! Tree queries over a flat folder collection
//!
//! Folders are stored flat with parent links. Everything here derives a
//! view from that slice without modifying it. Traversals use explicit
//! stacks and walks are bounded by the collection size, so a malformed
//! collection cannot recurse or loop without end.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use super::models::{Deck, Folder, FolderNode, FolderSort, SubtreeTotals, TreeEntry};

/// Parent id to child indices, in input order
fn children_index(folders: &[Folder]) -> HashMap<Uuid, Vec<usize>> {
    let mut children: HashMap<Uuid, Vec<usize>> = HashMap::new();
    for (idx, folder) in folders.iter().enumerate() {
        if let Some(parent_id) = folder.parent_id {
            children.entry(parent_id).or_default().push(idx);
        }
    }
    children
}

fn find<'a>(folders: &'a [Folder], id: Uuid) -> Option<&'a Folder> {
    folders.iter().find(|f| f.id == id)
}

/// Folders whose parent id is not present in the collection
pub fn find_orphans(folders: &[Folder]) -> Vec<&Folder> {
    let ids: HashSet<Uuid> = folders.iter().map(|f| f.id).collect();
    folders
        .iter()
        .filter(|f| f.parent_id.map_or(false, |p| !ids.contains(&p)))
        .collect()
}

/// Build the forest of root folders with children attached.
///
/// Children keep the order of the input slice. Orphans (and anything
/// below them) are left out of the view and logged.
pub fn build_tree(folders: &[Folder]) -> Vec<FolderNode> {
    for orphan in find_orphans(folders) {
        log::warn!(
            "Folder {} ({}) references missing parent {:?}, hidden from tree",
            orphan.name,
            orphan.id,
            orphan.parent_id
        );
    }

    let children = children_index(folders);
    let mut built: HashMap<usize, FolderNode> = HashMap::new();
    let mut visited: HashSet<usize> = HashSet::new();
    let mut roots = Vec::new();

    for (root_idx, _) in folders.iter().enumerate().filter(|(_, f)| f.is_root()) {
        // Post-order: a node is assembled after all of its children
        let mut stack = vec![(root_idx, false)];
        while let Some((idx, expanded)) = stack.pop() {
            let folder = &folders[idx];
            let child_indices = children.get(&folder.id).map(Vec::as_slice).unwrap_or(&[]);

            if !expanded {
                if !visited.insert(idx) {
                    continue;
                }
                stack.push((idx, true));
                for &child in child_indices.iter().rev() {
                    stack.push((child, false));
                }
                continue;
            }

            let node_children = child_indices
                .iter()
                .filter_map(|child| built.remove(child))
                .collect();
            built.insert(
                idx,
                FolderNode {
                    folder: folder.clone(),
                    children: node_children,
                },
            );
        }

        if let Some(root) = built.remove(&root_idx) {
            roots.push(root);
        }
    }

    roots
}

/// Pre-order listing of a forest with each folder's depth and child ids.
/// Nested output of a deep tree would recurse, so JSON uses this shape.
pub fn flatten_tree(roots: &[FolderNode]) -> Vec<TreeEntry> {
    let mut entries = Vec::new();
    let mut stack: Vec<(&FolderNode, usize)> = roots.iter().rev().map(|n| (n, 0)).collect();

    while let Some((node, depth)) = stack.pop() {
        entries.push(TreeEntry {
            folder: node.folder.clone(),
            depth,
            child_ids: node.children.iter().map(|c| c.folder.id).collect(),
        });
        stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
    }

    entries
}

/// Breadcrumb from the root down to `folder_id`.
///
/// `None` yields an empty path. The walk stops at a missing parent and
/// returns what it has.
pub fn path_to(folder_id: Option<Uuid>, folders: &[Folder]) -> Vec<Folder> {
    let mut path = Vec::new();
    let mut current = folder_id;

    while let Some(id) = current {
        if path.len() >= folders.len() {
            log::warn!("Folder path walk from {:?} exceeded collection size", folder_id);
            break;
        }
        match find(folders, id) {
            Some(folder) => {
                path.push(folder.clone());
                current = folder.parent_id;
            }
            None => break,
        }
    }

    path.reverse();
    path
}

/// The folder itself plus every folder transitively below it
pub fn descendant_ids(folder_id: Uuid, folders: &[Folder]) -> HashSet<Uuid> {
    let children = children_index(folders);
    let mut result = HashSet::new();
    let mut stack = vec![folder_id];

    while let Some(id) = stack.pop() {
        if !result.insert(id) {
            continue;
        }
        if let Some(child_indices) = children.get(&id) {
            stack.extend(child_indices.iter().map(|&idx| folders[idx].id));
        }
    }

    result
}

/// Ancestor hops to a root, 0 for a root folder
pub fn depth(folder_id: Uuid, folders: &[Folder]) -> usize {
    path_to(Some(folder_id), folders).len().saturating_sub(1)
}

/// `depth` of every folder in one pass over a parent index
pub fn depths(folders: &[Folder]) -> HashMap<Uuid, usize> {
    let parents: HashMap<Uuid, Option<Uuid>> =
        folders.iter().map(|f| (f.id, f.parent_id)).collect();
    let mut depths: HashMap<Uuid, usize> = HashMap::with_capacity(folders.len());

    for folder in folders {
        // Climb to a folder of known depth, a root or a missing parent
        let mut chain = vec![folder.id];
        let mut base = None;
        while let Some(&id) = chain.last() {
            if let Some(&known) = depths.get(&id) {
                chain.pop();
                base = Some(known);
                break;
            }
            match parents.get(&id).copied().flatten() {
                Some(parent) if parents.contains_key(&parent) && chain.len() < folders.len() => {
                    chain.push(parent)
                }
                _ => break,
            }
        }

        let mut next = base.map_or(0, |d| d + 1);
        while let Some(id) = chain.pop() {
            depths.insert(id, next);
            next += 1;
        }
    }

    depths
}

/// Sorted copy of the collection
pub fn sort_folders(folders: &[Folder], key: FolderSort) -> Vec<Folder> {
    let mut sorted = folders.to_vec();
    match key {
        FolderSort::Name => sorted.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        FolderSort::CreatedAt => sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        FolderSort::ItemCount => sorted.sort_by(|a, b| b.item_count().cmp(&a.item_count())),
    }
    sorted
}

/// Folders that `folder_id` may be moved into. Moving to the root is
/// always allowed and is not listed.
pub fn valid_move_destinations(folder_id: Uuid, folders: &[Folder]) -> Vec<&Folder> {
    let excluded = descendant_ids(folder_id, folders);
    folders
        .iter()
        .filter(|f| !excluded.contains(&f.id))
        .collect()
}

/// Direct children of a folder, or the roots for `None`
pub fn children_of(parent_id: Option<Uuid>, folders: &[Folder]) -> Vec<&Folder> {
    folders.iter().filter(|f| f.parent_id == parent_id).collect()
}

/// Decks directly in a folder, or unfiled decks for `None`
pub fn decks_in(folder_id: Option<Uuid>, decks: &[Deck]) -> Vec<&Deck> {
    decks.iter().filter(|d| d.folder_id == folder_id).collect()
}

pub fn subtree_totals(folder_id: Uuid, folders: &[Folder]) -> SubtreeTotals {
    let ids = descendant_ids(folder_id, folders);
    folders
        .iter()
        .filter(|f| ids.contains(&f.id))
        .fold(SubtreeTotals::default(), |mut totals, f| {
            totals.folders += 1;
            totals.decks += f.deck_count;
            totals.cards += f.card_count;
            totals
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn folder(name: &str, parent: Option<&Folder>) -> Folder {
        Folder::new(name.to_string(), parent.map(|p| p.id))
    }

    /// A > B > C, plus a second root D
    fn chain() -> (Folder, Folder, Folder, Folder) {
        let a = folder("A", None);
        let b = folder("B", Some(&a));
        let c = folder("C", Some(&b));
        let d = folder("D", None);
        (a, b, c, d)
    }

    #[test]
    fn test_build_tree_structure() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let tree = build_tree(&folders);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].folder.id, a.id);
        assert_eq!(tree[0].children[0].folder.id, b.id);
        assert_eq!(tree[0].children[0].children[0].folder.id, c.id);
        assert_eq!(tree[1].folder.id, d.id);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_handles_children_listed_before_parents() {
        let (a, b, c, _) = chain();
        let folders = vec![c.clone(), b.clone(), a.clone()];
        let tree = build_tree(&folders);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].node_count(), 3);
    }

    #[test]
    fn test_build_tree_keeps_input_order_of_children() {
        let root = folder("Root", None);
        let zeta = folder("Zeta", Some(&root));
        let alpha = folder("Alpha", Some(&root));
        let folders = vec![root, zeta.clone(), alpha.clone()];

        let tree = build_tree(&folders);
        let names: Vec<&str> = tree[0]
            .children
            .iter()
            .map(|n| n.folder.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_build_tree_drops_orphans() {
        let (a, b, _, d) = chain();
        let ghost_parent = folder("Ghost", None);
        let orphan = folder("Orphan", Some(&ghost_parent));
        let folders = vec![a, b, d, orphan.clone()];

        let orphans = find_orphans(&folders);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, orphan.id);

        let tree = build_tree(&folders);
        let total: usize = tree.iter().map(FolderNode::node_count).sum();
        assert_eq!(total, folders.len() - orphans.len());
    }

    #[test]
    fn test_build_tree_hides_orphan_subtree() {
        let (a, b, _, d) = chain();
        let ghost_parent = folder("Ghost", None);
        let orphan = folder("Orphan", Some(&ghost_parent));
        let below_orphan = folder("Below", Some(&orphan));
        let folders = vec![a, b, d, orphan.clone(), below_orphan];

        let orphans = find_orphans(&folders);
        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].id, orphan.id);

        let tree = build_tree(&folders);
        let total: usize = tree.iter().map(FolderNode::node_count).sum();
        assert_eq!(total, folders.len() - 2);
    }

    fn deep_chain(len: usize) -> Vec<Folder> {
        let mut folders = vec![folder("Root", None)];
        for i in 1..len {
            let parent = folders[i - 1].id;
            folders.push(Folder::new(format!("Level {}", i), Some(parent)));
        }
        folders
    }

    #[test]
    fn test_deep_chain_tree_is_stack_safe() {
        let folders = deep_chain(100_000);
        let tree = build_tree(&folders);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].node_count(), folders.len());

        let copy = tree.clone();
        assert!(copy == tree);

        let entries = flatten_tree(&tree);
        assert_eq!(entries.len(), folders.len());
        assert_eq!(entries[folders.len() - 1].depth, folders.len() - 1);
        assert!(serde_json::to_string(&entries).is_ok());

        drop(copy);
        drop(tree);
    }

    #[test]
    fn test_tree_equality_sees_nested_changes() {
        let (a, b, c, d) = chain();
        let tree = build_tree(&[a.clone(), b.clone(), c.clone(), d.clone()]);
        let mut renamed = c.clone();
        renamed.name = "C2".to_string();
        let other = build_tree(&[a, b, renamed, d]);
        assert!(tree != other);
        assert!(tree == tree.clone());
    }

    #[test]
    fn test_flatten_tree_is_preorder() {
        let (a, b, c, d) = chain();
        let tree = build_tree(&[a.clone(), b.clone(), c.clone(), d.clone()]);
        let entries = flatten_tree(&tree);
        let order: Vec<(Uuid, usize)> = entries.iter().map(|e| (e.folder.id, e.depth)).collect();
        assert_eq!(order, vec![(a.id, 0), (b.id, 1), (c.id, 2), (d.id, 0)]);
        assert_eq!(entries[0].child_ids, vec![b.id]);
        assert!(entries[2].child_ids.is_empty());
    }

    #[test]
    fn test_depths_match_depth() {
        let (a, b, c, d) = chain();
        let ghost_parent = folder("Ghost", None);
        let orphan = folder("Orphan", Some(&ghost_parent));
        let below_orphan = folder("Below", Some(&orphan));
        // Children listed before parents on purpose
        let folders = vec![below_orphan, c, orphan, b, d, a];

        let all = depths(&folders);
        assert_eq!(all.len(), folders.len());
        for f in &folders {
            assert_eq!(all[&f.id], depth(f.id, &folders), "depth of {}", f.name);
        }
    }

    #[test]
    fn test_depths_deep_chain() {
        let folders = deep_chain(5_000);
        let all = depths(&folders);
        assert_eq!(all[&folders[4_999].id], 4_999);
        assert_eq!(all[&folders[0].id], 0);
    }

    #[test]
    fn test_build_tree_survives_cycle() {
        let mut x = folder("X", None);
        let mut y = folder("Y", None);
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let root = folder("Root", None);

        let tree = build_tree(&[x, y, root.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].folder.id, root.id);
    }

    #[test]
    fn test_build_tree_does_not_mutate_input() {
        let (a, b, c, d) = chain();
        let folders = vec![a, b, c, d];
        let before = folders.clone();
        let _ = build_tree(&folders);
        assert_eq!(folders, before);
    }

    #[test]
    fn test_path_to() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];

        assert!(path_to(None, &folders).is_empty());

        let root_path = path_to(Some(d.id), &folders);
        assert_eq!(root_path.len(), 1);
        assert_eq!(root_path[0].id, d.id);

        let ids: Vec<Uuid> = path_to(Some(c.id), &folders).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_path_to_stops_at_missing_parent() {
        let (_, b, c, _) = chain();
        let folders = vec![b.clone(), c.clone()];
        let ids: Vec<Uuid> = path_to(Some(c.id), &folders).iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![b.id, c.id]);
    }

    #[test]
    fn test_path_to_bounded_on_cycle() {
        let mut x = folder("X", None);
        let mut y = folder("Y", None);
        x.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let folders = vec![x.clone(), y];
        assert_eq!(path_to(Some(x.id), &folders).len(), 2);
    }

    #[test]
    fn test_descendant_ids_contains_self_and_children() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];

        let ids = descendant_ids(a.id, &folders);
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
        assert!(ids.contains(&c.id));
        assert!(!ids.contains(&d.id));

        // Closed under the children relation
        for f in &folders {
            if let Some(parent) = f.parent_id {
                if ids.contains(&parent) {
                    assert!(ids.contains(&f.id));
                }
            }
        }

        let leaf = descendant_ids(c.id, &folders);
        assert_eq!(leaf.len(), 1);
        assert!(leaf.contains(&c.id));
    }

    #[test]
    fn test_depth() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        assert_eq!(depth(a.id, &folders), 0);
        assert_eq!(depth(b.id, &folders), 1);
        assert_eq!(depth(c.id, &folders), 2);
        assert_eq!(depth(d.id, &folders), 0);
    }

    #[test]
    fn test_sort_by_name() {
        let folders = vec![
            folder("cardiology", None),
            folder("Anatomy", None),
            folder("biochemistry", None),
        ];
        let names: Vec<String> = sort_folders(&folders, FolderSort::Name)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Anatomy", "biochemistry", "cardiology"]);
        // Input untouched
        assert_eq!(folders[0].name, "cardiology");
    }

    #[test]
    fn test_sort_by_created_at_newest_first() {
        let mut old = folder("Old", None);
        old.created_at = Utc::now() - Duration::days(10);
        let mut mid = folder("Mid", None);
        mid.created_at = Utc::now() - Duration::days(5);
        let new = folder("New", None);

        let names: Vec<String> = sort_folders(&[old, new, mid], FolderSort::CreatedAt)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["New", "Mid", "Old"]);
    }

    #[test]
    fn test_sort_by_item_count() {
        let mut small = folder("Small", None);
        small.deck_count = 1;
        small.card_count = 10;
        let mut large = folder("Large", None);
        large.deck_count = 3;
        large.card_count = 120;
        let empty = folder("Empty", None);

        let names: Vec<String> = sort_folders(&[small, empty, large], FolderSort::ItemCount)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["Large", "Small", "Empty"]);
    }

    #[test]
    fn test_valid_move_destinations_exclude_subtree() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c.clone(), d.clone()];
        let ids: Vec<Uuid> = valid_move_destinations(b.id, &folders)
            .iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![a.id, d.id]);
    }

    #[test]
    fn test_subtree_totals() {
        let (mut a, mut b, mut c, mut d) = chain();
        a.deck_count = 1;
        a.card_count = 10;
        b.deck_count = 2;
        b.card_count = 20;
        c.deck_count = 1;
        c.card_count = 5;
        d.deck_count = 4;
        let folders = vec![a.clone(), b, c, d];

        let totals = subtree_totals(a.id, &folders);
        assert_eq!(
            totals,
            SubtreeTotals {
                folders: 3,
                decks: 4,
                cards: 35
            }
        );
    }

    #[test]
    fn test_children_and_decks_in() {
        let (a, b, c, d) = chain();
        let folders = vec![a.clone(), b.clone(), c, d.clone()];
        let roots: Vec<Uuid> = children_of(None, &folders).iter().map(|f| f.id).collect();
        assert_eq!(roots, vec![a.id, d.id]);

        let decks = vec![
            Deck::new("Murmurs".to_string(), Some(b.id)),
            Deck::new("Loose".to_string(), None),
        ];
        assert_eq!(decks_in(Some(b.id), &decks).len(), 1);
        assert_eq!(decks_in(None, &decks)[0].name, "Loose");
    }
}
