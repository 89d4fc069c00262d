//! Derivation of the read-optimized model from raw stored records.
//!
//! The model is rebuilt from scratch after every mutation; nothing here is
//! patched incrementally, so the derived view can never drift from the
//! store. Each build is independent: overlapping builds are safe and the
//! caller simply discards stale results.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::task;

use crate::error::{Result, TallyError};
use crate::normalize::normalize_entry;
use crate::storage::{Client, Entry, RawEntry, StoreGateway};

/// A client joined with its derived balance and sorted history.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientView {
    pub client: Client,
    /// Sum of the signed amounts of all entries. Positive means the client
    /// owes the user, negative the reverse, zero settled.
    pub balance: i64,
    /// Date of the newest entry, absent when there are none.
    pub last_date: Option<NaiveDate>,
    /// All entries, newest date first.
    pub entries: Vec<Entry>,
}

/// Aggregates recomputed alongside the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerStats {
    /// Clients present in the model.
    pub clients: usize,
    /// Sum of positive balances: the total currently owed to the user.
    pub total_owed: i64,
}

/// The full derived view for one render cycle. Never cached across
/// mutations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerModel {
    pub clients: Vec<ClientView>,
    pub stats: LedgerStats,
}

impl LedgerModel {
    /// Find a client view by id.
    pub fn client(&self, id: &str) -> Option<&ClientView> {
        self.clients.iter().find(|view| view.client.id == id)
    }
}

/// Build the model from durable state.
///
/// Both collections are read concurrently; everything after that is pure.
/// Read-only and safe to call repeatedly or concurrently.
pub async fn build_model<S>(store: &Arc<S>) -> Result<LedgerModel>
where
    S: StoreGateway + 'static,
{
    let clients_store = Arc::clone(store);
    let entries_store = Arc::clone(store);
    let clients_task = task::spawn_blocking(move || clients_store.read_clients());
    let entries_task = task::spawn_blocking(move || entries_store.read_entries());

    let (clients, entries) = tokio::try_join!(clients_task, entries_task)
        .map_err(|e| TallyError::StoreUnavailable(format!("store read task failed: {e}")))?;

    Ok(assemble_model(
        clients?,
        entries?,
        Local::now().date_naive(),
    ))
}

/// Pure assembly step behind [`build_model`].
///
/// - unnamed and archived clients are excluded
/// - transactions without a surviving owner are excluded, never an error
/// - per-client entries sort newest first; ties keep stored order
/// - clients sort by descending absolute balance, then case-insensitive
///   name
pub fn assemble_model(clients: Vec<Client>, raw: Vec<RawEntry>, today: NaiveDate) -> LedgerModel {
    let mut groups: HashMap<String, Vec<Entry>> = HashMap::new();
    for record in &raw {
        let entry = normalize_entry(record, today);
        if entry.debtor_id.is_empty() {
            continue;
        }
        groups.entry(entry.debtor_id.clone()).or_default().push(entry);
    }

    let mut views: Vec<ClientView> = Vec::with_capacity(clients.len());
    for client in clients {
        if !client.has_name() || client.archived {
            continue;
        }
        let mut entries = groups.remove(&client.id).unwrap_or_default();
        // Stable sort: equal dates keep their stored relative order.
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        let balance = entries.iter().map(|entry| entry.amount).sum();
        let last_date = entries.first().map(|entry| entry.date);
        views.push(ClientView {
            client,
            balance,
            last_date,
            entries,
        });
    }

    views.sort_by(|a, b| {
        b.balance
            .abs()
            .cmp(&a.balance.abs())
            .then_with(|| {
                a.client
                    .name
                    .to_lowercase()
                    .cmp(&b.client.name.to_lowercase())
            })
            .then_with(|| a.client.name.cmp(&b.client.name))
    });

    let stats = LedgerStats {
        clients: views.len(),
        total_owed: views
            .iter()
            .filter(|view| view.balance > 0)
            .map(|view| view.balance)
            .sum(),
    };

    LedgerModel {
        clients: views,
        stats,
    }
}
