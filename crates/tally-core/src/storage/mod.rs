//! Durable storage: the gateway trait, its SQLite implementation, and the
//! record types shared by both on-disk shapes.

mod sqlite;
mod traits;
mod types;

pub use sqlite::{SqliteStore, SCHEMA_VERSION};
pub use traits::StoreGateway;
pub use types::{Client, Collection, Entry, RawEntry};

use tracing::warn;

use crate::error::Result;

/// Delete a client together with its transaction history.
///
/// This is a sequence of independent single-record deletes, not one atomic
/// unit: the owned transactions go first, best-effort, then the client
/// itself. A failure partway through leaves orphaned transactions behind,
/// which every read path tolerates by excluding them from views. The first
/// transaction-delete failure is reported after the cascade has run to
/// completion.
pub fn delete_client_with_history<S: StoreGateway + ?Sized>(
    store: &S,
    client_id: &str,
) -> Result<()> {
    let owned: Vec<String> = store
        .read_entries()?
        .into_iter()
        .filter(|entry| entry.debtor_id.trim() == client_id)
        .map(|entry| entry.id)
        .filter(|id| !id.is_empty())
        .collect();

    let mut first_failure = None;
    for id in owned {
        if let Err(error) = store.delete_entry(&id) {
            warn!(entry = %id, %error, "cascade delete left an orphaned transaction");
            if first_failure.is_none() {
                first_failure = Some(error);
            }
        }
    }

    store.delete_client(client_id)?;

    match first_failure {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
