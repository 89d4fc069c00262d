//! Ledger entry commands: took/gave movements, interactive edit, delete.

use std::sync::Arc;

use anyhow::{anyhow, bail};
use chrono::{Local, NaiveDate};
use dialoguer::Input;

use tally_core::autosave::{AutosaveController, Draft};
use tally_core::normalize::normalize_entry;
use tally_core::storage::{Entry, RawEntry, StoreGateway};
use tally_core::SqliteStore;

use crate::cli::MovementArgs;
use crate::output::fmt_amount;

/// Record a movement. `took` grows the client's debt (positive amount),
/// `gave` shrinks it (negative).
pub fn handle_movement(
    store: &Arc<SqliteStore>,
    args: &MovementArgs,
    took: bool,
) -> anyhow::Result<()> {
    if args.amount <= 0 {
        bail!("Amount must be positive; direction comes from took/gave");
    }
    let client = super::resolve_client(store.as_ref(), &args.client)?;
    let date = parse_date_arg(args.date.as_deref())?;
    let amount = if took { args.amount } else { -args.amount };

    let mut entry = Entry::new(&client.id, date, amount);
    if let Some(comment) = &args.comment {
        entry = entry.with_comment(comment.trim());
    }
    store.upsert_entry(&RawEntry::from(entry))?;

    let verb = if took { "took" } else { "gave" };
    println!(
        "{} {} {} on {}",
        client.name,
        verb,
        fmt_amount(args.amount),
        date
    );
    Ok(())
}

/// Interactive edit of an existing entry. Every answered prompt schedules
/// an autosave; switching direction commits immediately, like the editor's
/// mode switch. The record is never deleted by this path, only rewritten.
pub async fn handle_edit(store: &Arc<SqliteStore>, id: &str) -> anyhow::Result<()> {
    let raw = store
        .read_entries()?
        .into_iter()
        .find(|entry| entry.id == id)
        .ok_or_else(|| anyhow!("No entry with id '{id}'"))?;
    let mut entry = normalize_entry(&raw, Local::now().date_naive());

    let controller = AutosaveController::for_existing(Arc::clone(store), Draft::Entry(entry.clone()));

    let took_default = entry.amount >= 0;
    let direction: String = Input::new()
        .with_prompt("Direction (took/gave)")
        .default(if took_default { "took" } else { "gave" }.to_string())
        .interact_text()?;
    let took = match direction.trim() {
        "took" => true,
        "gave" => false,
        other => bail!("Unknown direction '{other}'"),
    };
    if took != took_default {
        entry.amount = -entry.amount;
        controller.schedule(Draft::Entry(entry.clone()));
        // Mode switches are committing actions, not just edits.
        controller.flush(true)?;
    }

    let magnitude: i64 = Input::new()
        .with_prompt("Amount")
        .default(entry.amount.abs())
        .interact_text()?;
    if magnitude < 0 {
        bail!("Amount must not be negative; direction comes from took/gave");
    }
    entry.amount = if took { magnitude } else { -magnitude };
    controller.schedule(Draft::Entry(entry.clone()));

    let date: String = Input::new()
        .with_prompt("Date")
        .default(entry.date.to_string())
        .interact_text()?;
    entry.date = parse_date_arg(Some(&date))?;
    controller.schedule(Draft::Entry(entry.clone()));

    let comment: String = Input::new()
        .with_prompt("Comment")
        .default(entry.comment.clone())
        .allow_empty(true)
        .interact_text()?;
    entry.comment = comment;
    controller.schedule(Draft::Entry(entry.clone()));

    controller.flush(true)?;
    println!("Saved entry {id}");
    Ok(())
}

pub fn handle_rm(store: &Arc<SqliteStore>, id: &str) -> anyhow::Result<()> {
    store.delete_entry(id)?;
    println!("Deleted entry {id}");
    Ok(())
}

fn parse_date_arg(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        None => Ok(Local::now().date_naive()),
        Some(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map_err(|_| anyhow!("Invalid date '{value}', expected YYYY-MM-DD")),
    }
}
