//! Debounced, idempotent autosave for a single edit session.
//!
//! One controller instance serves one logical editable record: a client
//! being added, or a ledger entry being created or edited. The session is
//! an explicit state machine (Unsaved-Empty, Saved, Unsaved-Dirty) rather
//! than timer callbacks capturing form fields:
//!
//! - [`AutosaveController::schedule`] records the latest field values and
//!   re-arms the debounce timer; within a burst of edits only the last
//!   state is ever persisted.
//! - [`AutosaveController::flush`] canonicalizes the draft, fingerprints
//!   it, and skips the write when nothing changed since the last save.
//! - A brand-new draft with no required content is never persisted; if it
//!   was persisted earlier in the session and the user then empties it
//!   again, the durable record is deleted rather than left behind as an
//!   empty placeholder.
//!
//! Only one edit session is live at a time in this design, so there is no
//! arbitration between controllers; last write wins per record id.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::storage::{Client, Entry, RawEntry, StoreGateway};

/// Pause after the last edit before the debounced write fires.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(350);

/// The record being edited, with its current in-memory field values.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Client(Client),
    Entry(Entry),
}

impl Draft {
    /// The canonical payload: field values as they would be persisted.
    fn canonical(&self) -> Draft {
        match self {
            Draft::Client(client) => {
                let mut client = client.clone();
                client.name = client.name.trim().to_string();
                client.phone = normalize_opt(client.phone.take());
                client.note = normalize_opt(client.note.take());
                Draft::Client(client)
            }
            Draft::Entry(entry) => {
                let mut entry = entry.clone();
                entry.debtor_id = entry.debtor_id.trim().to_string();
                entry.comment = entry.comment.trim().to_string();
                Draft::Entry(entry)
            }
        }
    }

    /// Whether the draft has enough content to exist durably at all.
    /// Clients need a name; entries need a non-zero amount or a comment.
    fn has_required_content(&self) -> bool {
        match self {
            Draft::Client(client) => !client.name.is_empty(),
            Draft::Entry(entry) => entry.amount != 0 || !entry.comment.is_empty(),
        }
    }

    /// Primary key of the underlying record.
    pub fn record_id(&self) -> &str {
        match self {
            Draft::Client(client) => &client.id,
            Draft::Entry(entry) => &entry.id,
        }
    }

    /// Content fingerprint of the canonical payload. Two drafts with the
    /// same persisted bytes share a fingerprint.
    fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        match self {
            Draft::Client(client) => {
                hasher.update(b"client\0");
                hasher.update(&serde_json::to_vec(client).unwrap_or_default());
            }
            Draft::Entry(entry) => {
                hasher.update(b"entry\0");
                hasher.update(&serde_json::to_vec(entry).unwrap_or_default());
            }
        }
        hasher.finalize()
    }
}

fn normalize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Where the session stands relative to durable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing durable has been written by this session.
    UnsavedEmpty,
    /// The durable record matches the last flushed payload.
    Saved,
    /// A durable record exists but pending edits have not been persisted.
    UnsavedDirty,
}

/// What a flush actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// The payload was written.
    Saved,
    /// Fingerprint matched the last save; write skipped.
    Unchanged,
    /// New draft without required content; nothing to persist.
    SkippedEmpty,
    /// Previously saved draft was emptied; the durable record was deleted.
    Retracted,
    /// No draft has been scheduled yet.
    Idle,
}

#[derive(Debug)]
struct Session {
    draft: Option<Draft>,
    /// True when the record existed before this session began (edit path).
    preexisting: bool,
    state: SessionState,
    last_saved: Option<blake3::Hash>,
}

/// Debounced autosave for one in-progress editable record.
pub struct AutosaveController<S: StoreGateway + 'static> {
    store: Arc<S>,
    session: Arc<Mutex<Session>>,
    delay: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<S: StoreGateway + 'static> AutosaveController<S> {
    /// Session for a record that does not exist yet (create path).
    pub fn for_new(store: Arc<S>) -> Self {
        Self {
            store,
            session: Arc::new(Mutex::new(Session {
                draft: None,
                preexisting: false,
                state: SessionState::UnsavedEmpty,
                last_saved: None,
            })),
            delay: DEBOUNCE_INTERVAL,
            timer: Mutex::new(None),
        }
    }

    /// Session for a record that already exists (edit path). `flush` on
    /// this session always upserts, never deletes; unchanged flushes are
    /// still skipped because the initial payload seeds the fingerprint.
    pub fn for_existing(store: Arc<S>, draft: Draft) -> Self {
        let fingerprint = draft.canonical().fingerprint();
        Self {
            store,
            session: Arc::new(Mutex::new(Session {
                draft: Some(draft),
                preexisting: true,
                state: SessionState::Saved,
                last_saved: Some(fingerprint),
            })),
            delay: DEBOUNCE_INTERVAL,
            timer: Mutex::new(None),
        }
    }

    /// Override the debounce interval (tests).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state
    }

    /// Record the latest field values and re-arm the debounce timer.
    ///
    /// Every call cancels the previous timer: a burst of edits produces a
    /// single debounced flush of the final state. Must run inside a tokio
    /// runtime.
    pub fn schedule(&self, draft: Draft) {
        {
            let mut session = self
                .session
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            session.draft = Some(draft);
            session.state = if session.preexisting || session.last_saved.is_some() {
                SessionState::UnsavedDirty
            } else {
                SessionState::UnsavedEmpty
            };
        }

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        let store = Arc::clone(&self.store);
        let session = Arc::clone(&self.session);
        let delay = self.delay;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(error) = flush_session(store.as_ref(), &session, false) {
                warn!(%error, "debounced autosave failed");
            }
        }));
    }

    /// Persist the current draft now, cancelling any pending timer.
    ///
    /// With `force` false the write is skipped when the canonical payload
    /// fingerprint matches the last successful save. `force` is used on
    /// discrete committing actions (mode switches, closing the editor) so
    /// no pending debounced write is lost when the session ends.
    pub fn flush(&self, force: bool) -> Result<FlushOutcome> {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }
        drop(timer);
        flush_session(self.store.as_ref(), &self.session, force)
    }
}

impl<S: StoreGateway + 'static> Drop for AutosaveController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

fn flush_session<S: StoreGateway + ?Sized>(
    store: &S,
    session: &Mutex<Session>,
    force: bool,
) -> Result<FlushOutcome> {
    let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(draft) = session.draft.clone() else {
        return Ok(FlushOutcome::Idle);
    };

    let payload = draft.canonical();
    let fingerprint = payload.fingerprint();

    if !force && session.last_saved == Some(fingerprint) {
        session.state = SessionState::Saved;
        return Ok(FlushOutcome::Unchanged);
    }

    if !session.preexisting && !payload.has_required_content() {
        if session.last_saved.is_some() {
            // The session wrote this record earlier and the user has since
            // emptied it; retract rather than leave a durable placeholder.
            match &payload {
                Draft::Client(client) => store.delete_client(&client.id)?,
                Draft::Entry(entry) => store.delete_entry(&entry.id)?,
            }
            session.last_saved = None;
            session.state = SessionState::UnsavedEmpty;
            debug!(record = payload.record_id(), "autosave retracted empty draft");
            return Ok(FlushOutcome::Retracted);
        }
        session.state = SessionState::UnsavedEmpty;
        return Ok(FlushOutcome::SkippedEmpty);
    }

    match &payload {
        Draft::Client(client) => store.upsert_client(client)?,
        Draft::Entry(entry) => store.upsert_entry(&RawEntry::from(entry.clone()))?,
    }
    session.last_saved = Some(fingerprint);
    session.state = SessionState::Saved;
    debug!(record = payload.record_id(), "autosave persisted draft");
    Ok(FlushOutcome::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStore;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date")
    }

    #[tokio::test]
    async fn test_flush_without_draft_is_idle() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));
        assert_eq!(controller.flush(true).expect("flush"), FlushOutcome::Idle);
        assert_eq!(controller.state(), SessionState::UnsavedEmpty);
    }

    #[tokio::test]
    async fn test_empty_draft_never_persisted() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));
        controller.schedule(Draft::Client(Client::new("   ")));
        assert_eq!(
            controller.flush(true).expect("flush"),
            FlushOutcome::SkippedEmpty
        );
        assert!(store.read_clients().expect("read").is_empty());
    }

    #[tokio::test]
    async fn test_unchanged_flush_skips_write() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));
        controller.schedule(Draft::Client(Client::new("Ivan")));
        assert_eq!(controller.flush(false).expect("flush"), FlushOutcome::Saved);
        assert_eq!(
            controller.flush(false).expect("flush"),
            FlushOutcome::Unchanged
        );
        assert_eq!(controller.state(), SessionState::Saved);
    }

    #[tokio::test]
    async fn test_create_then_retract() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));

        let mut client = Client::new("Ivan");
        controller.schedule(Draft::Client(client.clone()));
        controller.flush(false).expect("flush");
        assert_eq!(store.read_clients().expect("read").len(), 1);

        client.name = String::new();
        controller.schedule(Draft::Client(client));
        assert_eq!(
            controller.flush(false).expect("flush"),
            FlushOutcome::Retracted
        );
        assert!(store.read_clients().expect("read").is_empty());
        assert_eq!(controller.state(), SessionState::UnsavedEmpty);
    }

    #[tokio::test]
    async fn test_edit_path_never_deletes() {
        let store = Arc::new(SqliteStore::in_memory());
        let existing = Client::new("Ivan");
        store.upsert_client(&existing).expect("seed");

        let controller =
            AutosaveController::for_existing(Arc::clone(&store), Draft::Client(existing.clone()));
        let mut emptied = existing;
        emptied.name = String::new();
        controller.schedule(Draft::Client(emptied));
        assert_eq!(controller.flush(true).expect("flush"), FlushOutcome::Saved);
        // The record survives, with the emptied name persisted as-is.
        let stored = store.read_clients().expect("read");
        assert_eq!(stored.len(), 1);
        assert!(stored[0].name.is_empty());
    }

    #[tokio::test]
    async fn test_edit_path_unchanged_initial_flush_skips() {
        let store = Arc::new(SqliteStore::in_memory());
        let existing = Client::new("Ivan");
        store.upsert_client(&existing).expect("seed");

        let controller =
            AutosaveController::for_existing(Arc::clone(&store), Draft::Client(existing));
        assert_eq!(
            controller.flush(false).expect("flush"),
            FlushOutcome::Unchanged
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_burst() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store))
            .with_delay(Duration::from_millis(50));

        let mut client = Client::new("I");
        for name in ["Iv", "Iva", "Ivan"] {
            client.name = name.to_string();
            controller.schedule(Draft::Client(client.clone()));
            tokio::time::advance(Duration::from_millis(10)).await;
        }
        // Let the final timer fire.
        tokio::time::advance(Duration::from_millis(60)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let stored = store.read_clients().expect("read");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].name, "Ivan");
        assert_eq!(controller.state(), SessionState::Saved);
    }

    #[tokio::test]
    async fn test_entry_draft_saves_canonical_shape() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));
        let entry = Entry::new("c1", date(), 500).with_comment("  advance  ");
        controller.schedule(Draft::Entry(entry));
        controller.flush(true).expect("flush");

        let stored = store.read_entries().expect("read");
        assert_eq!(stored.len(), 1);
        assert!(stored[0].kind.is_none());
        assert_eq!(stored[0].comment.as_deref(), Some("advance"));
        assert_eq!(stored[0].amount, Some(serde_json::Value::from(500)));
    }

    #[tokio::test]
    async fn test_zero_amount_entry_with_comment_is_substantial() {
        let store = Arc::new(SqliteStore::in_memory());
        let controller = AutosaveController::for_new(Arc::clone(&store));
        let entry = Entry::new("c1", date(), 0).with_comment("placeholder note");
        controller.schedule(Draft::Entry(entry));
        assert_eq!(controller.flush(false).expect("flush"), FlushOutcome::Saved);
    }
}
