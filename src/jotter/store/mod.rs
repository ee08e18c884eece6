//! # Notes Store
//!
//! The client-side cache of notes and the only place that mutates it.
//!
//! ## State
//!
//! Four independent streams, each a [`tokio::sync::watch`] channel:
//! - `notes`: ordered, newest mutation first, ids unique
//! - `loading`: true while an operation is in flight
//! - `error`: message of the last failure, cleared when the next operation begins
//! - `selected_id`: the note a detail view is looking at
//!
//! Subscribers receive the current value first and every later change. Every
//! change to `notes` is published as one whole-list replace, so an observer
//! never sees a half-applied edit.
//!
//! ## Operation Protocol
//!
//! `load_all`, `create`, `update`, `remove` and `get_by_id` share three phases:
//!
//! 1. **Begin**: `loading = true`, `error = None`. Mutations apply their
//!    optimistic change right away and keep a [`PendingOp`].
//! 2. **Success**: the server's copy replaces the optimistic one, a success
//!    toast is queued, `loading = false`.
//! 3. **Failure**: the [`PendingOp`] is rolled back, `error` is set and the
//!    same text goes out as an error toast, `loading = false`.
//!
//! Failures never escape the store. Callers observe `error` and the toast
//! queue, not [`crate::error::JotterError`].
//!
//! ## Overlapping Operations
//!
//! Nothing is serialized per id. Two updates of the same note in flight settle
//! in arrival order and the last one wins. `loading` is a flag, not a counter,
//! so the first operation to settle clears it even if another is still running.

use crate::client::NotesApi;
use crate::error::JotterError;
use crate::model::{CreateNote, Note, UpdateNote};
use crate::search::filter_notes;
use crate::toast::{ToastKind, ToastQueue};
use log::{debug, warn};
use tokio::sync::watch;

pub mod list;
pub mod pending;

pub use pending::PendingOp;

const SUCCESS_TIMEOUT_MS: u64 = 2500;
const NOTE_LOADED_TIMEOUT_MS: u64 = 2000;

/// Snapshot of every stream at one moment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub notes: Vec<Note>,
    pub loading: bool,
    pub error: Option<String>,
    pub selected_id: Option<String>,
}

/// Generic over [`NotesApi`] so tests run against the in-memory server.
pub struct NotesStore<A: NotesApi> {
    api: A,
    toasts: ToastQueue,
    notes: watch::Sender<Vec<Note>>,
    loading: watch::Sender<bool>,
    error: watch::Sender<Option<String>>,
    selected_id: watch::Sender<Option<String>>,
}

impl<A: NotesApi> NotesStore<A> {
    pub fn new(api: A, toasts: ToastQueue) -> Self {
        Self {
            api,
            toasts,
            notes: watch::Sender::new(Vec::new()),
            loading: watch::Sender::new(false),
            error: watch::Sender::new(None),
            selected_id: watch::Sender::new(None),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    // --- Commands ---

    /// Replace the cache with the server's list.
    pub async fn load_all(&self) {
        self.begin("load_all");
        match self.api.list().await {
            Ok(notes) => {
                self.notes.send_replace(list::deduplicated(notes));
                self.toasts
                    .add("Notes loaded", ToastKind::Success, Some(SUCCESS_TIMEOUT_MS));
            }
            Err(err) => self.fail(&err, "Failed to load notes"),
        }
        self.settle();
    }

    /// Blank `query` reloads from the server. Anything else filters the
    /// cached list in place, so getting the full list back takes another
    /// blank search or a `load_all`.
    pub async fn search(&self, query: &str) {
        if query.trim().is_empty() {
            self.load_all().await;
            return;
        }
        debug!("filtering cached notes by {:?}", query);
        self.notes.send_modify(|notes| *notes = filter_notes(notes, query));
    }

    /// Select `id` now, then fetch it and upsert the result.
    pub async fn get_by_id(&self, id: &str) {
        if id.is_empty() {
            self.reject("Note id is required");
            return;
        }
        self.selected_id.send_replace(Some(id.to_string()));
        self.begin("get_by_id");
        match self.api.get(id).await {
            Ok(note) => {
                self.notes
                    .send_modify(|notes| *notes = list::upserted(notes, note));
                self.toasts
                    .add("Note loaded", ToastKind::Success, Some(NOTE_LOADED_TIMEOUT_MS));
            }
            Err(err) => self.fail(&err, "Failed to load note"),
        }
        self.settle();
    }

    /// Show a provisional note at the head until the server answers.
    pub async fn create(&self, payload: CreateNote) {
        if payload.title.trim().is_empty() {
            self.reject("Title cannot be empty");
            return;
        }
        let op = PendingOp::Create {
            provisional: Note::provisional(&payload),
        };
        self.begin(op.label());
        self.apply(&op);

        match self.api.create(&payload).await {
            Ok(created) => {
                debug!("note {} created", created.id);
                self.notes
                    .send_modify(|notes| *notes = op.confirm(notes, created));
                self.toasts
                    .add("Note created", ToastKind::Success, Some(SUCCESS_TIMEOUT_MS));
            }
            Err(err) => {
                self.rollback(&op);
                self.fail(&err, "Failed to create note");
            }
        }
        self.settle();
    }

    /// Patch a cached note. Ids missing from the cache are ignored.
    pub async fn update(&self, id: &str, patch: UpdateNote) {
        if id.is_empty() {
            self.reject("Note id is required");
            return;
        }
        let Some(snapshot) = self.note_by_id(id) else {
            debug!("update of uncached note {} ignored", id);
            return;
        };
        let op = PendingOp::Update {
            patched: snapshot.patched(&patch),
            snapshot,
        };
        self.begin(op.label());
        self.apply(&op);

        match self.api.update(id, &patch).await {
            Ok(updated) => {
                self.notes
                    .send_modify(|notes| *notes = op.confirm(notes, updated));
                self.toasts
                    .add("Note updated", ToastKind::Success, Some(SUCCESS_TIMEOUT_MS));
            }
            Err(err) => {
                self.rollback(&op);
                self.fail(&err, "Failed to update note");
            }
        }
        self.settle();
    }

    /// Drop a cached note. Ids missing from the cache are ignored.
    pub async fn remove(&self, id: &str) {
        if id.is_empty() {
            self.reject("Note id is required");
            return;
        }
        let Some(removed) = self.note_by_id(id) else {
            debug!("removal of uncached note {} ignored", id);
            return;
        };
        let op = PendingOp::Remove { removed };
        self.begin(op.label());
        self.apply(&op);

        match self.api.remove(id).await {
            Ok(()) => {
                self.toasts
                    .add("Note removed", ToastKind::Success, Some(SUCCESS_TIMEOUT_MS));
                self.selected_id.send_if_modified(|selected| {
                    if selected.as_deref() == Some(id) {
                        *selected = None;
                        true
                    } else {
                        false
                    }
                });
            }
            Err(err) => {
                self.rollback(&op);
                self.fail(&err, "Failed to remove note");
            }
        }
        self.settle();
    }

    pub fn select(&self, id: Option<&str>) {
        self.selected_id.send_replace(id.map(str::to_string));
    }

    // --- Selectors ---

    pub fn notes(&self) -> Vec<Note> {
        self.notes.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn error(&self) -> Option<String> {
        self.error.borrow().clone()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_id.borrow().clone()
    }

    /// The cached note matching `selected_id`, if both exist.
    pub fn selected_note(&self) -> Option<Note> {
        let selected = self.selected_id.borrow();
        let id = selected.as_deref()?;
        list::find(&self.notes.borrow(), id).cloned()
    }

    pub fn note_by_id(&self, id: &str) -> Option<Note> {
        list::find(&self.notes.borrow(), id).cloned()
    }

    /// Filtered view over the cache that leaves the cache alone.
    pub fn filtered(&self, query: &str) -> Vec<Note> {
        filter_notes(&self.notes.borrow(), query)
    }

    pub fn state(&self) -> StoreState {
        StoreState {
            notes: self.notes(),
            loading: self.loading(),
            error: self.error(),
            selected_id: self.selected_id(),
        }
    }

    pub fn subscribe_notes(&self) -> watch::Receiver<Vec<Note>> {
        fresh(self.notes.subscribe())
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        fresh(self.loading.subscribe())
    }

    pub fn subscribe_error(&self) -> watch::Receiver<Option<String>> {
        fresh(self.error.subscribe())
    }

    pub fn subscribe_selection(&self) -> watch::Receiver<Option<String>> {
        fresh(self.selected_id.subscribe())
    }

    // --- Phases ---

    fn begin(&self, op: &str) {
        debug!("{}: begin", op);
        self.loading.send_replace(true);
        self.error.send_replace(None);
    }

    fn settle(&self) {
        self.loading.send_replace(false);
    }

    fn apply(&self, op: &PendingOp) {
        self.notes.send_modify(|notes| *notes = op.apply(notes));
    }

    fn rollback(&self, op: &PendingOp) {
        warn!("{}: rolling back optimistic change", op.label());
        self.notes.send_modify(|notes| *notes = op.rollback(notes));
    }

    fn fail(&self, err: &JotterError, fallback: &str) {
        let message = err.user_message(fallback);
        warn!("{}", message);
        self.error.send_replace(Some(message.clone()));
        self.toasts.error(message);
    }

    /// Refused before any request: only a warning toast, state untouched.
    fn reject(&self, message: &str) {
        debug!("rejected: {}", message);
        self.toasts.warning(message);
    }
}

/// Marks the receiver so its first `changed()` yields the current value.
fn fresh<T>(mut rx: watch::Receiver<T>) -> watch::Receiver<T> {
    rx.mark_changed();
    rx
}
