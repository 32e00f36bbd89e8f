use anyhow::{Context, Result};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::render::tree::render_tree;
use crate::OutputFormat;
use medstudy_lib::folders::{self, Deck, Folder, FolderSort};

fn print_tree(collection: &[Folder], decks: &[Deck], format: &OutputFormat, use_color: bool) -> Result<()> {
    let roots = folders::build_tree(collection);
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&folders::flatten_tree(&roots))?
        ),
        OutputFormat::Plain => {
            println!("{}", paint("All Decks", Color::BOLD, use_color));
            for line in render_tree(&roots, decks, use_color) {
                println!("{}", line);
            }
            let orphans = folders::find_orphans(collection);
            if !orphans.is_empty() {
                println!();
                println!(
                    "{}",
                    paint(
                        &format!("{} folder(s) hidden: parent missing", orphans.len()),
                        Color::YELLOW,
                        use_color
                    )
                );
                for orphan in orphans {
                    println!("  - {}", orphan.name);
                }
            }
        }
    }
    Ok(())
}

pub fn run_tree(app: &App, sort: Option<FolderSort>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let sort = sort.unwrap_or(app.config.folders.sort);
    let sorted = folders::sort_folders(&app.library.folders, sort);
    print_tree(&sorted, &app.library.decks, format, use_color)
}

pub fn run_path(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let folder = app.find_folder(name)?;
    let path = folders::path_to(Some(folder.id), &app.library.folders);
    let totals = folders::subtree_totals(folder.id, &app.library.folders);

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path,
                "depth": folders::depth(folder.id, &app.library.folders),
                "totals": totals,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let crumbs: Vec<String> = std::iter::once("All Decks".to_string())
                .chain(path.iter().map(|f| f.name.clone()))
                .collect();
            println!("{}", paint(&crumbs.join(" / "), Color::BOLD, use_color));
            println!(
                "  {} folder(s), {} deck(s), {} card(s) in this subtree",
                totals.folders, totals.decks, totals.cards
            );
            for deck in folders::decks_in(Some(folder.id), &app.library.decks) {
                println!("  - {} [{}]", deck.name, deck.card_count);
            }
        }
    }
    Ok(())
}

pub fn run_destinations(app: &App, name: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let folder = app.find_folder(name)?;
    let destinations = folders::valid_move_destinations(folder.id, &app.library.folders);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&destinations)?),
        OutputFormat::Plain => {
            let depths = folders::depths(&app.library.folders);
            println!("All Decks (root)");
            for dest in destinations {
                let indent = "  ".repeat(depths.get(&dest.id).copied().unwrap_or(0) + 1);
                println!("{}{}", indent, dest.name);
            }
        }
    }
    Ok(())
}

pub fn run_move(
    app: &App,
    name: &str,
    to: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let folder = app.find_folder(name)?;
    let destination = to.map(|n| app.find_folder(n)).transpose()?;

    let next = folders::move_folder(
        &app.library.folders,
        folder.id,
        destination.as_ref().map(|d| d.id),
    )
    .with_context(|| match &destination {
        Some(dest) => format!("Cannot move '{}' into '{}'", folder.name, dest.name),
        None => format!("Cannot move '{}' to the root", folder.name),
    })?;
    print_tree(&next, &app.library.decks, format, use_color)
}

pub fn run_delete(app: &App, name: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let folder = app.find_folder(name)?;
    let (next, removed) =
        folders::delete_folder(&app.library.folders, folder.id).context("Failed to delete folder")?;

    // Decks filed under removed folders go with them
    let decks: Vec<Deck> = app
        .library
        .decks
        .iter()
        .filter(|d| d.folder_id.map_or(true, |id| !removed.contains(&id)))
        .cloned()
        .collect();
    let dropped = app.library.decks.len() - decks.len();

    if let OutputFormat::Plain = format {
        println!(
            "Deleted '{}' and {} subfolder(s), {} deck(s)",
            folder.name,
            removed.len() - 1,
            dropped
        );
    }
    print_tree(&next, &decks, format, use_color)
}

pub fn run_create(
    app: &App,
    name: &str,
    parent: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let parent = parent.map(|n| app.find_folder(n)).transpose()?;
    let (next, created) = folders::create_folder(&app.library.folders, name, parent.map(|p| p.id))
        .context("Failed to create folder")?;
    if let OutputFormat::Plain = format {
        println!("Created '{}'", created.name);
    }
    print_tree(&next, &app.library.decks, format, use_color)
}

pub fn run_rename(
    app: &App,
    name: &str,
    new_name: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let folder = app.find_folder(name)?;
    let next = folders::rename_folder(&app.library.folders, folder.id, new_name)
        .context("Failed to rename folder")?;
    print_tree(&next, &app.library.decks, format, use_color)
}

pub fn run_color(
    app: &App,
    name: &str,
    color: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let folder = app.find_folder(name)?;
    let next = folders::set_color(&app.library.folders, folder.id, color.map(str::to_string))
        .context("Failed to set folder color")?;
    print_tree(&next, &app.library.decks, format, use_color)
}

pub fn run_expand(app: &App, name: &str, format: &OutputFormat, _use_color: bool) -> Result<()> {
    let folder = app.find_folder(name)?;
    let next = folders::toggle_expanded(&app.library.folders, folder.id)
        .context("Failed to toggle folder")?;
    let expanded = next
        .iter()
        .find(|f| f.id == folder.id)
        .map_or(false, |f| f.is_expanded);

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "id": folder.id, "isExpanded": expanded })
        ),
        OutputFormat::Plain => println!(
            "{} is now {}",
            folder.name,
            if expanded { "expanded" } else { "collapsed" }
        ),
    }
    Ok(())
}
