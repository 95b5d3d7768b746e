use std::path::Path;

use anyhow::{Context, Result};
use datemark_core::share::{export_ics, import_ics, share_text};
use datemark_core::store::EventStore;
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn export(store: &EventStore, id: &str, output: Option<&Path>) -> Result<()> {
    let event = store.find(id)?;
    let ics = export_ics(event);

    match output {
        Some(path) => {
            std::fs::write(path, ics)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{}",
                format!("  Exported: {} → {}", event.title, path.display()).green()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}

pub fn import(store: &mut EventStore, file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let draft =
        import_ics(&content).with_context(|| format!("Failed to import {}", file.display()))?;

    let event = store.add(draft)?;
    store.save()?;

    println!("{}", format!("  Imported: {}", event.title).green());
    println!("  {}", event.render());
    Ok(())
}

pub fn share(store: &EventStore, id: &str) -> Result<()> {
    println!("{}", share_text(store.find(id)?));
    Ok(())
}
