use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tally_core::model::build_model;
use tally_core::storage::{
    delete_client_with_history, Client, RawEntry, SqliteStore, StoreGateway,
};
use tally_core::{Result, TallyError};

/// Gateway double whose `delete_entry` fails for chosen ids, simulating a
/// crash partway through a cascade.
struct FlakyStore {
    inner: SqliteStore,
    failing_entries: Mutex<HashSet<String>>,
}

impl FlakyStore {
    fn new(failing: &[&str]) -> Self {
        Self {
            inner: SqliteStore::in_memory(),
            failing_entries: Mutex::new(failing.iter().map(|id| id.to_string()).collect()),
        }
    }
}

impl StoreGateway for FlakyStore {
    fn read_clients(&self) -> Result<Vec<Client>> {
        self.inner.read_clients()
    }

    fn read_entries(&self) -> Result<Vec<RawEntry>> {
        self.inner.read_entries()
    }

    fn upsert_client(&self, client: &Client) -> Result<()> {
        self.inner.upsert_client(client)
    }

    fn upsert_entry(&self, entry: &RawEntry) -> Result<()> {
        self.inner.upsert_entry(entry)
    }

    fn delete_client(&self, id: &str) -> Result<()> {
        self.inner.delete_client(id)
    }

    fn delete_entry(&self, id: &str) -> Result<()> {
        let failing = self
            .failing_entries
            .lock()
            .expect("lock should not be poisoned");
        if failing.contains(id) {
            return Err(TallyError::StoreUnavailable(format!(
                "simulated failure deleting {id}"
            )));
        }
        drop(failing);
        self.inner.delete_entry(id)
    }
}

fn entry(id: &str, debtor: &str, amount: i64) -> RawEntry {
    RawEntry {
        id: id.to_string(),
        debtor_id: debtor.to_string(),
        date: Some("2024-01-10".to_string()),
        amount: Some(serde_json::Value::from(amount)),
        ..RawEntry::default()
    }
}

#[tokio::test]
async fn test_cascade_removes_client_and_history() {
    let store = Arc::new(SqliteStore::in_memory());
    let client = Client::new("Ivan");
    store.upsert_client(&client).expect("seed");
    store.upsert_entry(&entry("t1", &client.id, 100)).expect("seed");
    store.upsert_entry(&entry("t2", &client.id, -50)).expect("seed");
    store.upsert_entry(&entry("t3", "other", 999)).expect("seed");

    delete_client_with_history(store.as_ref(), &client.id).expect("cascade should succeed");

    assert!(store.read_clients().expect("read").is_empty());
    let remaining = store.read_entries().expect("read");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "t3");
}

#[tokio::test]
async fn test_partial_cascade_failure_leaves_tolerated_orphans() {
    let store = Arc::new(FlakyStore::new(&["t2"]));
    let client = Client::new("Ivan");
    store.upsert_client(&client).expect("seed");
    store.upsert_entry(&entry("t1", &client.id, 100)).expect("seed");
    store.upsert_entry(&entry("t2", &client.id, 200)).expect("seed");
    store.upsert_entry(&entry("t3", &client.id, 300)).expect("seed");

    // The cascade reports the failure but still runs to completion: the
    // client is gone and only the failing entry survives as an orphan.
    let result = delete_client_with_history(store.as_ref(), &client.id);
    assert!(matches!(result, Err(TallyError::StoreUnavailable(_))));
    assert!(store.read_clients().expect("read").is_empty());
    let remaining = store.read_entries().expect("read");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "t2");

    // The orphan never reaches a view: excluded, not resurrected, and not
    // an error.
    let model = build_model(&store).await.expect("build should succeed");
    assert!(model.clients.is_empty());
    assert_eq!(model.stats.clients, 0);
    assert_eq!(model.stats.total_owed, 0);
}
