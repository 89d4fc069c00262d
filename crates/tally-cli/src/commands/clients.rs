//! Client lifecycle: add (direct or interactive), archive, delete.

use std::sync::Arc;

use anyhow::bail;
use dialoguer::{Confirm, Input};

use tally_core::autosave::{AutosaveController, Draft, FlushOutcome};
use tally_core::storage::{delete_client_with_history, Client, StoreGateway};
use tally_core::SqliteStore;

pub async fn handle_add(store: &Arc<SqliteStore>, name: Option<&str>) -> anyhow::Result<()> {
    match name {
        Some(name) => {
            if name.trim().is_empty() {
                bail!("Client name must not be empty");
            }
            let client = Client::new(name.trim());
            store.upsert_client(&client)?;
            println!("Added '{}' ({})", client.name, client.id);
            Ok(())
        }
        None => add_interactive(store).await,
    }
}

/// Interactive add: every answered prompt schedules an autosave, so a
/// half-entered client is already durable and an abandoned one (name left
/// blank, or emptied again) leaves nothing behind.
async fn add_interactive(store: &Arc<SqliteStore>) -> anyhow::Result<()> {
    let controller = AutosaveController::for_new(Arc::clone(store));
    let mut draft = Client::new("");

    draft.name = Input::<String>::new()
        .with_prompt("Name")
        .allow_empty(true)
        .interact_text()?;
    controller.schedule(Draft::Client(draft.clone()));

    let phone: String = Input::new()
        .with_prompt("Phone (optional)")
        .allow_empty(true)
        .interact_text()?;
    if !phone.trim().is_empty() {
        draft.phone = Some(phone);
    }
    controller.schedule(Draft::Client(draft.clone()));

    let note: String = Input::new()
        .with_prompt("Note (optional)")
        .allow_empty(true)
        .interact_text()?;
    if !note.trim().is_empty() {
        draft.note = Some(note);
    }
    controller.schedule(Draft::Client(draft.clone()));

    // Closing the editor commits whatever is pending.
    match controller.flush(true)? {
        FlushOutcome::Saved | FlushOutcome::Unchanged => {
            println!("Added '{}' ({})", draft.name.trim(), draft.id);
        }
        FlushOutcome::SkippedEmpty | FlushOutcome::Retracted | FlushOutcome::Idle => {
            println!("Nothing to add.");
        }
    }
    Ok(())
}

pub fn handle_archive(
    store: &Arc<SqliteStore>,
    needle: &str,
    restore: bool,
) -> anyhow::Result<()> {
    let mut client = super::resolve_client(store.as_ref(), needle)?;
    client.archived = !restore;
    store.upsert_client(&client)?;
    if restore {
        println!("Restored '{}'", client.name);
    } else {
        println!("Archived '{}'", client.name);
    }
    Ok(())
}

pub fn handle_rm(store: &Arc<SqliteStore>, needle: &str, yes: bool) -> anyhow::Result<()> {
    let client = super::resolve_client(store.as_ref(), needle)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete '{}' and their whole history?",
                client.name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    delete_client_with_history(store.as_ref(), &client.id)?;
    println!("Deleted '{}'", client.name);
    Ok(())
}
