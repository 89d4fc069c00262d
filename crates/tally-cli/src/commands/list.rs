//! Overview and per-client detail views.

use std::sync::Arc;

use anyhow::anyhow;

use tally_core::filter::filter_clients;
use tally_core::model::build_model;
use tally_core::SqliteStore;

use crate::output::{client_table, fmt_amount, history_table, stats_line};

pub async fn handle_list(store: &Arc<SqliteStore>, query: Option<&str>) -> anyhow::Result<()> {
    let model = build_model(store).await?;
    let views = filter_clients(model.clients, query.unwrap_or(""));

    if views.is_empty() {
        println!("Nothing here yet. Add a client with `tally add`.");
        return Ok(());
    }

    println!("{}", client_table(&views));
    println!("{}", stats_line(&model.stats));
    Ok(())
}

pub async fn handle_show(store: &Arc<SqliteStore>, needle: &str) -> anyhow::Result<()> {
    let model = build_model(store).await?;
    let resolved = super::resolve_client(store.as_ref(), needle)?;
    let view = model
        .client(&resolved.id)
        .ok_or_else(|| anyhow!("Client '{needle}' is archived; restore them first with `tally archive --restore`"))?;

    println!("{}", view.client.name);
    if let Some(phone) = &view.client.phone {
        println!("Phone: {phone}");
    }
    if let Some(note) = &view.client.note {
        println!("Note: {note}");
    }
    println!("Balance: {}", fmt_amount(view.balance));

    if view.entries.is_empty() {
        println!("No entries.");
    } else {
        println!("{}", history_table(view));
    }
    Ok(())
}
