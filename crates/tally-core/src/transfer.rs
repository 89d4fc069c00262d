//! Portable backup documents: export the full dataset, restore it.
//!
//! The document is a versioned JSON envelope. Export always writes the
//! canonical transaction shape; import runs everything through the
//! normalizer anyway, so hand-edited or older documents still load.

use std::collections::HashSet;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TallyError};
use crate::normalize::normalize_entry;
use crate::storage::{Client, Entry, RawEntry, StoreGateway};

/// Portable document format version.
pub const TRANSFER_VERSION: u64 = 1;

/// A client as it appears in a portable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortableClient {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Client> for PortableClient {
    fn from(client: Client) -> Self {
        PortableClient {
            id: client.id,
            name: client.name,
            created_at: client.created_at,
        }
    }
}

/// The versioned envelope written by [`export`] and read by [`import`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDocument {
    pub version: u64,
    pub exported_at: DateTime<Utc>,
    pub clients: Vec<PortableClient>,
    pub tx: Vec<Entry>,
}

/// Counts reported back after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportOutcome {
    pub clients: usize,
    pub entries: usize,
    /// Records present in the document but rejected during validation.
    pub skipped: usize,
}

/// Serialize the full dataset into a portable document.
///
/// Archived clients are left out; transactions are normalized to the
/// canonical signed shape, and those without a resolvable owner id are
/// dropped here rather than shipped.
pub fn export<S: StoreGateway + ?Sized>(store: &S) -> Result<TransferDocument> {
    let today = Local::now().date_naive();

    let clients: Vec<PortableClient> = store
        .read_clients()?
        .into_iter()
        .filter(|client| !client.archived)
        .map(PortableClient::from)
        .collect();

    let tx: Vec<Entry> = store
        .read_entries()?
        .iter()
        .map(|raw| normalize_entry(raw, today))
        .filter(|entry| !entry.debtor_id.is_empty())
        .collect();

    Ok(TransferDocument {
        version: TRANSFER_VERSION,
        exported_at: Utc::now(),
        clients,
        tx,
    })
}

/// Restore a portable document, replacing the store's current contents.
///
/// Validation is an all-or-nothing gate: the document must carry
/// array-typed `clients` and `tx` collections or nothing is written at
/// all. Past the gate, acceptance is per record (a client needs a
/// non-empty id and name, a transaction a normalized owner id naming an
/// accepted client), and everything durable is deleted before the
/// accepted records are written. Importing the same document twice yields
/// the same final state; this is a replace, never a merge.
pub fn import<S: StoreGateway + ?Sized>(
    store: &S,
    document: &serde_json::Value,
) -> Result<ImportOutcome> {
    let client_values = document
        .get("clients")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            TallyError::Validation("import document must carry a `clients` array".to_string())
        })?;
    let tx_values = document
        .get("tx")
        .and_then(serde_json::Value::as_array)
        .ok_or_else(|| {
            TallyError::Validation("import document must carry a `tx` array".to_string())
        })?;

    let today = Local::now().date_naive();
    let mut skipped = 0usize;

    let mut clients: Vec<Client> = Vec::with_capacity(client_values.len());
    for value in client_values {
        let client: Client = match serde_json::from_value(value.clone()) {
            Ok(client) => client,
            Err(error) => {
                warn!(%error, "import rejected unreadable client record");
                skipped += 1;
                continue;
            }
        };
        if client.id.trim().is_empty() || !client.has_name() {
            warn!(id = %client.id, "import rejected client without id or name");
            skipped += 1;
            continue;
        }
        clients.push(client);
    }

    let accepted_ids: HashSet<&str> = clients.iter().map(|client| client.id.as_str()).collect();

    let mut entries: Vec<Entry> = Vec::with_capacity(tx_values.len());
    for value in tx_values {
        let raw: RawEntry = match serde_json::from_value(value.clone()) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%error, "import rejected unreadable transaction record");
                skipped += 1;
                continue;
            }
        };
        let entry = normalize_entry(&raw, today);
        if entry.id.is_empty() || !accepted_ids.contains(entry.debtor_id.as_str()) {
            warn!(id = %entry.id, "import rejected transaction without resolvable owner");
            skipped += 1;
            continue;
        }
        entries.push(entry);
    }

    // Validation passed; the destructive replace starts here. Each step is
    // an independent single-record operation.
    for client in store.read_clients()? {
        store.delete_client(&client.id)?;
    }
    for raw in store.read_entries()? {
        if !raw.id.is_empty() {
            store.delete_entry(&raw.id)?;
        }
    }

    for client in &clients {
        store.upsert_client(client)?;
    }
    for entry in &entries {
        store.upsert_entry(&RawEntry::from(entry.clone()))?;
    }

    Ok(ImportOutcome {
        clients: clients.len(),
        entries: entries.len(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;

    #[test]
    fn test_import_rejects_non_array_collections() {
        let store = SqliteStore::in_memory();
        store.upsert_client(&Client::new("Keep")).expect("seed");

        let document = serde_json::json!({ "version": 1, "clients": {}, "tx": [] });
        let result = import(&store, &document);
        assert!(matches!(result, Err(TallyError::Validation(_))));
        // The gate failed before any mutation.
        assert_eq!(store.read_clients().expect("read").len(), 1);
    }

    #[test]
    fn test_import_replaces_existing_contents() {
        let store = SqliteStore::in_memory();
        let old = Client::new("Old");
        store.upsert_client(&old).expect("seed");

        let document = serde_json::json!({
            "version": 1,
            "exportedAt": "2024-06-01T00:00:00Z",
            "clients": [{ "id": "c1", "name": "Ivan" }],
            "tx": [{ "id": "t1", "debtorId": "c1", "date": "2024-05-01", "amount": 500, "comment": "" }],
        });
        let outcome = import(&store, &document).expect("import should succeed");
        assert_eq!(outcome.clients, 1);
        assert_eq!(outcome.entries, 1);

        let clients = store.read_clients().expect("read");
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id, "c1");
    }

    #[test]
    fn test_import_skips_unowned_transactions() {
        let store = SqliteStore::in_memory();
        let document = serde_json::json!({
            "clients": [{ "id": "c1", "name": "Ivan" }],
            "tx": [
                { "id": "t1", "debtorId": "c1", "amount": 100 },
                { "id": "t2", "debtorId": "ghost", "amount": 900 },
                { "id": "t3", "amount": 900 },
            ],
        });
        let outcome = import(&store, &document).expect("import should succeed");
        assert_eq!(outcome.entries, 1);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn test_import_skips_nameless_clients() {
        let store = SqliteStore::in_memory();
        let document = serde_json::json!({
            "clients": [
                { "id": "c1", "name": "Ivan" },
                { "id": "c2", "name": "   " },
                { "id": "", "name": "Ghost" },
            ],
            "tx": [],
        });
        let outcome = import(&store, &document).expect("import should succeed");
        assert_eq!(outcome.clients, 1);
        assert_eq!(outcome.skipped, 2);
    }

    #[test]
    fn test_export_drops_archived_and_orphans() {
        let store = SqliteStore::in_memory();
        store.upsert_client(&Client::new("Ivan")).expect("seed");
        let mut archived = Client::new("Old");
        archived.archived = true;
        store.upsert_client(&archived).expect("seed");
        store
            .upsert_entry(&RawEntry {
                id: "t1".to_string(),
                debtor_id: String::new(),
                amount: Some(serde_json::Value::from(100)),
                ..RawEntry::default()
            })
            .expect("seed");

        let document = export(&store).expect("export should succeed");
        assert_eq!(document.clients.len(), 1);
        assert_eq!(document.clients[0].name, "Ivan");
        assert!(document.tx.is_empty());
        assert_eq!(document.version, TRANSFER_VERSION);
    }

    #[test]
    fn test_reimport_is_idempotent() {
        let store = SqliteStore::in_memory();
        let document = serde_json::json!({
            "clients": [{ "id": "c1", "name": "Ivan" }],
            "tx": [{ "id": "t1", "debtorId": "c1", "amount": 250 }],
        });
        import(&store, &document).expect("first import");
        import(&store, &document).expect("second import");

        assert_eq!(store.read_clients().expect("read").len(), 1);
        assert_eq!(store.read_entries().expect("read").len(), 1);
    }
}
