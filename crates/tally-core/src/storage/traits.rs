//! Store gateway trait definition.
//!
//! `StoreGateway` is the only doorway to durable state. The trait keeps the
//! contract small on purpose: read a whole collection, replace-or-insert one
//! record by primary key, delete one record by primary key. There is no
//! cross-collection transaction; multi-record operations (cascade delete,
//! import replace) are sequences of these single-record calls.

use super::types::{Client, RawEntry};
use crate::error::Result;

/// Gateway to the two durable collections (`clients`, `transactions`).
///
/// All implementations must ensure:
/// - each operation is atomic at single-record granularity
/// - `upsert` replaces the stored record whole, never merging fields
/// - `delete` of an absent key is a no-op, not an error
/// - a failing backend surfaces as `TallyError::StoreUnavailable`
pub trait StoreGateway: Send + Sync {
    /// Read every client record.
    ///
    /// Unreadable rows are skipped (tolerant read), not fatal.
    fn read_clients(&self) -> Result<Vec<Client>>;

    /// Read every transaction record in its stored shape.
    fn read_entries(&self) -> Result<Vec<RawEntry>>;

    /// Replace-or-insert a client by its `id`.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Validation` if the record id is empty.
    fn upsert_client(&self, client: &Client) -> Result<()>;

    /// Replace-or-insert a transaction by its `id`.
    ///
    /// # Errors
    ///
    /// Returns `TallyError::Validation` if the record id is empty.
    fn upsert_entry(&self, entry: &RawEntry) -> Result<()>;

    /// Delete a client by id. No-op if absent.
    fn delete_client(&self, id: &str) -> Result<()>;

    /// Delete a transaction by id. No-op if absent.
    fn delete_entry(&self, id: &str) -> Result<()>;
}
