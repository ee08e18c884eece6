use crate::model::Note;
use tokio::sync::watch;

/// Notes whose title or content contains `query`, case-insensitively.
///
/// Blank queries return the input unchanged. Output keeps input order.
pub fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    if query.trim().is_empty() {
        return notes.to_vec();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|n| matches_query(n, &needle))
        .cloned()
        .collect()
}

/// `needle` must already be lower-cased.
fn matches_query(note: &Note, needle: &str) -> bool {
    note.title.to_lowercase().contains(needle) || note.content.to_lowercase().contains(needle)
}

/// The places a list view can take its search term from. Each is the latest
/// value seen; they are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuerySources {
    /// The `q` parameter of the list route
    pub url_param: Option<String>,
    /// The last value published on the [`SearchBus`]
    pub broadcast: Option<String>,
}

impl QuerySources {
    /// URL parameter first, else the broadcast value, else empty.
    pub fn effective(&self) -> &str {
        self.url_param
            .as_deref()
            .filter(|q| !q.is_empty())
            .or(self.broadcast.as_deref())
            .unwrap_or("")
    }
}

/// Cross-component search broadcast. New subscribers see the current term.
#[derive(Clone)]
pub struct SearchBus {
    tx: watch::Sender<String>,
}

impl Default for SearchBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchBus {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(String::new());
        Self { tx }
    }

    pub fn set(&self, query: impl Into<String>) {
        self.tx.send_replace(query.into());
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        let mut rx = self.tx.subscribe();
        rx.mark_changed();
        rx
    }
}
