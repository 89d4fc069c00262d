//! Core data types for the storage layer.
//!
//! Stored records are JSON documents; the structs here are serde views of
//! them. `RawEntry` deliberately models *both* on-disk transaction shapes
//! (the legacy `type`/`note` form and the canonical signed form) so that
//! records written by older versions of the app deserialize without loss.
//! The canonical in-memory shape is [`Entry`], produced by the normalizer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two named collections of the on-disk layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Transactions,
}

impl Collection {
    /// Table name backing this collection.
    pub fn table(self) -> &'static str {
        match self {
            Collection::Clients => "clients",
            Collection::Transactions => "transactions",
        }
    }
}

/// A counterparty in the ledger.
///
/// `name` is the sole required field; a client whose name is empty or
/// whitespace-only is treated as non-existent by every view. The legacy
/// `isArchived` flag and the optional `phone`/`note` metadata are carried
/// through storage untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Creation timestamp; set once, never mutated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Archived clients are excluded from the built model and from export.
    #[serde(rename = "isArchived", default)]
    pub archived: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Client {
    /// Create a new client with a fresh id and creation timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: Some(Utc::now()),
            archived: false,
            phone: None,
            note: None,
        }
    }

    /// Whether this client counts as existing at all.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// A transaction record as stored, in whichever shape it was written.
///
/// Legacy records carry `type: "debt"|"payment"`, an unsigned `amount` and a
/// `note`; canonical records carry a signed integer `amount` and a `comment`.
/// Every field is optional or defaulted so any historical record parses.
/// `amount` is kept as a raw JSON value: older hand-written backups have been
/// seen carrying it as a string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEntry {
    #[serde(default)]
    pub id: String,

    /// Owning client's id. A record with no resolvable owner is dropped by
    /// the model builder and the transfer codec, never by the store.
    #[serde(default)]
    pub debtor_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<serde_json::Value>,

    /// Legacy sign tag. Present only on records written by old versions.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Legacy spelling of `comment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// The canonical in-memory transaction shape used by all current logic.
///
/// `amount` is a signed integer: positive increases what the client owes
/// ("took"), negative decreases it ("gave"). No fractional currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: String,
    pub debtor_id: String,
    pub date: NaiveDate,
    pub amount: i64,
    pub comment: String,
}

impl Entry {
    /// Create a new entry with a fresh id.
    pub fn new(debtor_id: impl Into<String>, date: NaiveDate, amount: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            debtor_id: debtor_id.into(),
            date,
            amount,
            comment: String::new(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}

impl From<Entry> for RawEntry {
    /// The canonical on-disk rendering: signed integer amount, `comment`
    /// field, no legacy tag. Writing an entry through this conversion is
    /// what naturalizes a legacy record.
    fn from(entry: Entry) -> Self {
        RawEntry {
            id: entry.id,
            debtor_id: entry.debtor_id,
            date: Some(entry.date.to_string()),
            amount: Some(serde_json::Value::from(entry.amount)),
            kind: None,
            comment: Some(entry.comment),
            note: None,
        }
    }
}
