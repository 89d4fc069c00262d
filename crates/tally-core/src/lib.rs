//! # Tally Core
//!
//! Core library for Tally - a local, offline-first ledger of informal debts
//! between a user and a set of counterparties.
//!
//! This crate is the persistent data layer, independent of any interface:
//!
//! - **storage**: the store gateway trait, its SQLite implementation, and
//!   the record types covering both on-disk transaction shapes
//! - **normalize**: read-time projection of stored records onto the
//!   canonical shape
//! - **model**: derivation of per-client balances, sorted history, and
//!   aggregate stats from raw records
//! - **filter**: free-text narrowing of a built model
//! - **autosave**: the debounced, idempotent persistence protocol used by
//!   edit sessions
//! - **transfer**: portable backup documents (export/import)
//!
//! Everything derived is recomputed from durable state on demand; no
//! component caches derived data across mutations.

pub mod autosave;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod storage;
pub mod transfer;

pub use error::{Result, TallyError};
pub use storage::{SqliteStore, StoreGateway};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
