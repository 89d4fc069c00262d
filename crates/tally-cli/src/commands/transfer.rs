//! Backup and restore through the portable document format.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dialoguer::Confirm;

use tally_core::transfer::{export, import};
use tally_core::SqliteStore;

pub fn handle_export(store: &Arc<SqliteStore>, path: Option<&str>) -> anyhow::Result<()> {
    let document = export(store.as_ref())?;
    let json = serde_json::to_string_pretty(&document)?;

    match path {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write backup to {path}"))?;
            println!(
                "Exported {} clients and {} entries to {}",
                document.clients.len(),
                document.tx.len(),
                path
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

pub fn handle_import(store: &Arc<SqliteStore>, path: &str, yes: bool) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("Failed to read {path}"))?;
    let document: serde_json::Value =
        serde_json::from_str(&contents).with_context(|| format!("{path} is not JSON"))?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Importing replaces everything in the store. Continue?")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let outcome = import(store.as_ref(), &document)?;
    println!(
        "Imported {} clients and {} entries ({} records skipped)",
        outcome.clients, outcome.entries, outcome.skipped
    );
    Ok(())
}
