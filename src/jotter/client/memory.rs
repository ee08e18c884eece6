use super::NotesApi;
use crate::error::{JotterError, Result};
use crate::model::{CreateNote, Note, UpdateNote};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Which API call a recorded request or injected failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Remove,
}

#[derive(Default)]
struct ServerState {
    notes: Vec<Note>,
    next_id: u64,
    failures: HashMap<Operation, VecDeque<JotterError>>,
    calls: Vec<Operation>,
    offline: bool,
}

/// In-process notes server. Behaves like the REST endpoint: assigns ids and
/// timestamps, answers `NotFound` for unknown ids.
#[derive(Default)]
pub struct InMemoryApi {
    state: Mutex<ServerState>,
    latency: Option<Duration>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the server with notes that already carry ids.
    pub fn with_notes(self, notes: Vec<Note>) -> Self {
        {
            let mut state = self.state.lock();
            for note in notes {
                if let Ok(n) = note.id.parse::<u64>() {
                    state.next_id = state.next_id.max(n);
                }
                state.notes.push(note);
            }
        }
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Queues a one-shot failure for the next call of `op`.
    pub fn fail_next(&self, op: Operation, err: JotterError) {
        self.state.lock().failures.entry(op).or_default().push_back(err);
    }

    /// While offline every call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<Operation> {
        self.state.lock().calls.clone()
    }

    /// Server-side view of the collection.
    pub fn server_notes(&self) -> Vec<Note> {
        self.state.lock().notes.clone()
    }

    async fn begin(&self, op: Operation) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let mut state = self.state.lock();
        state.calls.push(op);
        if state.offline {
            return Err(JotterError::Transport("connection refused".to_string()));
        }
        match state.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotesApi for InMemoryApi {
    async fn list(&self) -> Result<Vec<Note>> {
        self.begin(Operation::List).await?;
        Ok(self.state.lock().notes.clone())
    }

    async fn get(&self, id: &str) -> Result<Note> {
        self.begin(Operation::Get).await?;
        self.state
            .lock()
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or_else(|| JotterError::not_found(id))
    }

    async fn create(&self, payload: &CreateNote) -> Result<Note> {
        self.begin(Operation::Create).await?;
        let mut state = self.state.lock();
        state.next_id += 1;
        let now = Utc::now();
        let note = Note {
            id: state.next_id.to_string(),
            title: payload.title.clone(),
            content: payload.content.clone().unwrap_or_default(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: &str, payload: &UpdateNote) -> Result<Note> {
        self.begin(Operation::Update).await?;
        let mut state = self.state.lock();
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| JotterError::not_found(id))?;
        *note = note.patched(payload);
        Ok(note.clone())
    }

    async fn remove(&self, id: &str) -> Result<()> {
        self.begin(Operation::Remove).await?;
        let mut state = self.state.lock();
        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        if state.notes.len() == before {
            return Err(JotterError::not_found(id));
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;

    /// Two notes with ids "1" and "2", in server order.
    pub fn sample_notes() -> Vec<Note> {
        vec![Note::new("1", "A", "first"), Note::new("2", "B", "second")]
    }

    /// A server already holding [`sample_notes`].
    pub fn seeded_api() -> InMemoryApi {
        InMemoryApi::new().with_notes(sample_notes())
    }

    /// A server that fails the next call of `op` with an HTTP 500 carrying `message`.
    pub fn failing_api(op: Operation, message: &str) -> InMemoryApi {
        let api = seeded_api();
        api.fail_next(
            op,
            JotterError::Status {
                status: 500,
                message: Some(message.to_string()),
            },
        );
        api
    }
}
