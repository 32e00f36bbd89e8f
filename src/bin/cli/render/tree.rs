use medstudy_lib::folders::{Deck, FolderNode};

use super::terminal::{hex_to_ansi, paint, Color};

const BRANCH: &str = "\u{251c}\u{2500}\u{2500} ";
const LAST_BRANCH: &str = "\u{2514}\u{2500}\u{2500} ";
const PIPE: &str = "\u{2502}   ";
const SPACE: &str = "    ";

enum Item<'a> {
    Folder(&'a FolderNode),
    Deck(&'a Deck),
}

/// Render a folder forest with box-drawing connectors. Each folder lists
/// its subfolders, then its decks; unfiled decks follow the roots.
pub fn render_tree(roots: &[FolderNode], decks: &[Deck], use_color: bool) -> Vec<String> {
    let mut top: Vec<Item> = roots.iter().map(Item::Folder).collect();
    top.extend(decks.iter().filter(|d| d.folder_id.is_none()).map(Item::Deck));

    let mut lines = Vec::new();
    let mut stack: Vec<(Item, String, bool)> = Vec::new();
    push_children(&mut stack, top, String::new());

    while let Some((item, prefix, is_last)) = stack.pop() {
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        match item {
            Item::Deck(deck) => lines.push(format!(
                "{}{}{} {}",
                prefix,
                connector,
                deck.name,
                paint(&format!("[{}]", deck.card_count), Color::GRAY, use_color)
            )),
            Item::Folder(node) => {
                let folder = &node.folder;
                let style = folder
                    .color
                    .as_deref()
                    .map(hex_to_ansi)
                    .unwrap_or(Color::BOLD);
                lines.push(format!(
                    "{}{}{}/ {}",
                    prefix,
                    connector,
                    paint(&folder.name, style, use_color),
                    paint(
                        &format!("({} decks, {} cards)", folder.deck_count, folder.card_count),
                        Color::GRAY,
                        use_color
                    ),
                ));

                let mut children: Vec<Item> = node.children.iter().map(Item::Folder).collect();
                children.extend(
                    decks
                        .iter()
                        .filter(|d| d.folder_id == Some(folder.id))
                        .map(Item::Deck),
                );
                let child_prefix = format!("{}{}", prefix, if is_last { SPACE } else { PIPE });
                push_children(&mut stack, children, child_prefix);
            }
        }
    }

    lines
}

/// Push siblings in reverse so they pop in order
fn push_children<'a>(stack: &mut Vec<(Item<'a>, String, bool)>, items: Vec<Item<'a>>, prefix: String) {
    let count = items.len();
    for (i, item) in items.into_iter().enumerate().rev() {
        stack.push((item, prefix.clone(), i + 1 == count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medstudy_lib::folders::{build_tree, Folder};

    #[test]
    fn test_render_tree_plain() {
        let mut a = Folder::new("Clinical".to_string(), None);
        a.deck_count = 1;
        a.card_count = 40;
        let b = Folder::new("Cardiology".to_string(), Some(a.id));
        let decks = vec![
            Deck {
                card_count: 40,
                ..Deck::new("Heart Failure".to_string(), Some(a.id))
            },
            Deck::new("Loose".to_string(), None),
        ];

        let tree = build_tree(&[a, b]);
        let lines = render_tree(&tree, &decks, false);
        assert_eq!(
            lines,
            vec![
                "\u{251c}\u{2500}\u{2500} Clinical/ (1 decks, 40 cards)",
                "\u{2502}   \u{251c}\u{2500}\u{2500} Cardiology/ (0 decks, 0 cards)",
                "\u{2502}   \u{2514}\u{2500}\u{2500} Heart Failure [40]",
                "\u{2514}\u{2500}\u{2500} Loose [0]",
            ]
        );
    }
}
