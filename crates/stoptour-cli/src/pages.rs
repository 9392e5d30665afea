//! Page-file editing commands. These work on local files only and never touch
//! the store.

use std::path::{Path, PathBuf};

use clap::Subcommand;
use stoptour_core::{load_page, save_page, BlockKind, Coordinate, StopPage, ValidationErrors};

/// Sub-commands available under `block`.
#[derive(Debug, Subcommand)]
pub enum BlockCommands {
    /// Append an empty block of the given type
    Add {
        path: PathBuf,
        /// One of: text, media, location, howToGetFrom, links, social, openingTimes, imageSlider
        kind: BlockKind,
    },
    /// Remove a block by id
    Remove { path: PathBuf, id: String },
    /// Move a block to a new zero-based position
    Move {
        path: PathBuf,
        id: String,
        index: usize,
    },
    /// List blocks in display order
    List { path: PathBuf },
}

pub(crate) fn run_new(
    path: &Path,
    title: &str,
    center: Coordinate,
    radius_meters: f64,
    force: bool,
) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }

    let page = StopPage::new(title, center, radius_meters);
    if let Err(errors) = page.validate_for_save() {
        print_errors(&errors);
        anyhow::bail!("refusing to create an invalid page");
    }
    save_page(path, &page)?;
    println!("created page {} at {}", page.id, path.display());
    Ok(())
}

pub(crate) fn run_validate(path: &Path) -> anyhow::Result<()> {
    let page = load_page(path)?;
    match page.validate_for_save() {
        Ok(()) => {
            println!("{}: ok ({} blocks)", path.display(), page.blocks().len());
            Ok(())
        }
        Err(errors) => {
            print_errors(&errors);
            anyhow::bail!("{}: {} validation error(s)", path.display(), errors.len())
        }
    }
}

pub(crate) fn run_block(command: BlockCommands) -> anyhow::Result<()> {
    match command {
        BlockCommands::Add { path, kind } => {
            let mut page = load_page(&path)?;
            let block = page.add_block(kind);
            let (id, order) = (block.id().to_string(), block.order());
            save_page(&path, &page)?;
            println!("added {kind} block {id} at position {order}");
        }
        BlockCommands::Remove { path, id } => {
            let mut page = load_page(&path)?;
            let removed = page.remove_block(&id)?;
            save_page(&path, &page)?;
            println!("removed {} block {id}", removed.kind());
        }
        BlockCommands::Move { path, id, index } => {
            let mut page = load_page(&path)?;
            page.reorder_block(&id, index)?;
            save_page(&path, &page)?;
            println!("moved block {id} to position {index}");
        }
        BlockCommands::List { path } => {
            let page = load_page(&path)?;
            print_blocks(&page);
        }
    }
    Ok(())
}

fn print_blocks(page: &StopPage) {
    if page.blocks().is_empty() {
        println!(
            "no blocks on page '{}'; add one with `block add`",
            page.title
        );
        return;
    }

    let header = format!("{:<7}{:<14}{:<10}ID", "ORDER", "TYPE", "STATUS");
    println!("{header}");
    for block in page.blocks() {
        let status = match block.validate() {
            Ok(()) => "ok".to_string(),
            Err(errors) => format!("{} err", errors.len()),
        };
        println!(
            "{:<7}{:<14}{:<10}{}",
            block.order(),
            block.kind().as_str(),
            status,
            block.id()
        );
    }
}

fn print_errors(errors: &ValidationErrors) {
    for error in errors.errors() {
        eprintln!("  {error}");
    }
}
