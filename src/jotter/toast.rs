//! # Toast Queue
//!
//! Transient user facing messages, newest first. A message added with a
//! positive timeout dismisses itself after that delay; dismissing it by hand
//! first cancels the pending timer.
//!
//! The queue owns every timer. Timers are tokio tasks holding only a weak
//! reference back to the queue, so a timer firing after the queue is gone does
//! nothing. Observers get the whole list on every change through
//! [`ToastQueue::subscribe`].

use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const ERROR_TIMEOUT_MS: u64 = 6000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToastMessage {
    pub id: u64,
    pub kind: ToastKind,
    pub text: String,
    pub timeout_ms: Option<u64>,
}

struct QueueState {
    messages: Vec<ToastMessage>,
    timers: HashMap<u64, AbortHandle>,
    next_id: u64,
}

struct Shared {
    state: Mutex<QueueState>,
    tx: watch::Sender<Vec<ToastMessage>>,
}

impl Drop for Shared {
    fn drop(&mut self) {
        for (_, timer) in self.state.get_mut().timers.drain() {
            timer.abort();
        }
    }
}

/// Cloning yields another handle to the same queue.
#[derive(Clone)]
pub struct ToastQueue {
    shared: Arc<Shared>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState {
                    messages: Vec::new(),
                    timers: HashMap::new(),
                    next_id: 1,
                }),
                tx,
            }),
        }
    }

    /// Adds a message at the front and returns its id. A `timeout_ms` of
    /// `Some(n)` with `n > 0` schedules an auto-dismiss.
    pub fn add(&self, text: impl Into<String>, kind: ToastKind, timeout_ms: Option<u64>) -> u64 {
        let mut state = self.shared.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let text = text.into();
        debug!("toast {} [{}]: {}", id, kind, text);
        state.messages.insert(
            0,
            ToastMessage {
                id,
                kind,
                text,
                timeout_ms,
            },
        );

        if let Some(ms) = timeout_ms.filter(|ms| *ms > 0) {
            if let Some(timer) = self.schedule_dismiss(id, ms) {
                state.timers.insert(id, timer);
            }
        }

        self.shared.tx.send_replace(state.messages.clone());
        id
    }

    pub fn info(&self, text: impl Into<String>) -> u64 {
        self.add(text, ToastKind::Info, Some(DEFAULT_TIMEOUT_MS))
    }

    pub fn success(&self, text: impl Into<String>) -> u64 {
        self.add(text, ToastKind::Success, Some(DEFAULT_TIMEOUT_MS))
    }

    pub fn warning(&self, text: impl Into<String>) -> u64 {
        self.add(text, ToastKind::Warning, Some(DEFAULT_TIMEOUT_MS))
    }

    /// Error toasts linger a little longer than the rest.
    pub fn error(&self, text: impl Into<String>) -> u64 {
        self.error_with_timeout(text, Some(ERROR_TIMEOUT_MS))
    }

    pub fn error_with_timeout(&self, text: impl Into<String>, timeout_ms: Option<u64>) -> u64 {
        self.add(text, ToastKind::Error, timeout_ms)
    }

    /// Removes the message if present and cancels its timer.
    pub fn dismiss(&self, id: u64) {
        let mut state = self.shared.state.lock();
        if let Some(timer) = state.timers.remove(&id) {
            timer.abort();
        }
        self.remove_locked(&mut state, id);
    }

    /// Cancels every timer and empties the queue.
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        for (_, timer) in state.timers.drain() {
            timer.abort();
        }
        state.messages.clear();
        self.shared.tx.send_replace(Vec::new());
    }

    /// Current messages, newest first.
    pub fn messages(&self) -> Vec<ToastMessage> {
        self.shared.state.lock().messages.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A receiver that reports the current list first, then every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ToastMessage>> {
        let mut rx = self.shared.tx.subscribe();
        rx.mark_changed();
        rx
    }

    fn remove_locked(&self, state: &mut QueueState, id: u64) {
        let before = state.messages.len();
        state.messages.retain(|m| m.id != id);
        if state.messages.len() != before {
            debug!("toast {} dismissed", id);
            self.shared.tx.send_replace(state.messages.clone());
        }
    }

    fn schedule_dismiss(&self, id: u64, ms: u64) -> Option<AbortHandle> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("no async runtime; toast {} will not auto-dismiss", id);
            return None;
        };
        let weak: Weak<Shared> = Arc::downgrade(&self.shared);
        let task = runtime.spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            if let Some(shared) = weak.upgrade() {
                ToastQueue { shared }.expire(id);
            }
        });
        Some(task.abort_handle())
    }

    /// Timer-driven dismissal: the timer is finishing, so it is only forgotten.
    fn expire(&self, id: u64) {
        let mut state = self.shared.state.lock();
        state.timers.remove(&id);
        self.remove_locked(&mut state, id);
    }

    #[cfg(test)]
    fn pending_timers(&self) -> usize {
        self.shared.state.lock().timers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn auto_dismisses_after_timeout() {
        let toasts = ToastQueue::new();
        let id = toasts.add("Saved", ToastKind::Success, Some(100));
        assert_eq!(toasts.messages()[0].id, id);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(toasts.messages().iter().all(|m| m.id != id));
        assert_eq!(toasts.pending_timers(), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn newest_first_with_increasing_ids() {
        let toasts = ToastQueue::new();
        let first = toasts.info("one");
        let second = toasts.warning("two");
        assert!(second > first);

        let messages = toasts.messages();
        assert_eq!(messages[0].text, "two");
        assert_eq!(messages[1].text, "one");
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn manual_dismiss_cancels_timer() {
        let toasts = ToastQueue::new();
        let id = toasts.add("Bye", ToastKind::Info, Some(1000));
        assert_eq!(toasts.pending_timers(), 1);

        toasts.dismiss(id);
        assert!(toasts.is_empty());
        assert_eq!(toasts.pending_timers(), 0);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(toasts.is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn dismiss_unknown_id_is_noop() {
        let toasts = ToastQueue::new();
        toasts.info("stays");
        toasts.dismiss(999);
        assert_eq!(toasts.len(), 1);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn zero_or_missing_timeout_is_sticky() {
        let toasts = ToastQueue::new();
        toasts.add("sticky", ToastKind::Info, None);
        toasts.add("also sticky", ToastKind::Info, Some(0));
        assert_eq!(toasts.pending_timers(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(toasts.len(), 2);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn error_uses_longer_default() {
        let toasts = ToastQueue::new();
        toasts.error("boom");
        let message = &toasts.messages()[0];
        assert_eq!(message.kind, ToastKind::Error);
        assert_eq!(message.timeout_ms, Some(ERROR_TIMEOUT_MS));

        tokio::time::sleep(Duration::from_millis(DEFAULT_TIMEOUT_MS + 100)).await;
        assert_eq!(toasts.len(), 1);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(toasts.is_empty());
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn error_timeout_can_be_overridden() {
        let toasts = ToastQueue::new();
        toasts.error_with_timeout("quick", Some(1000));
        toasts.error_with_timeout("stays", None);
        assert_eq!(toasts.pending_timers(), 1);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        let left = toasts.messages();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].text, "stays");
        assert_eq!(left[0].kind, ToastKind::Error);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn clear_cancels_everything() {
        let toasts = ToastQueue::new();
        toasts.success("a");
        toasts.error("b");
        toasts.clear();
        assert!(toasts.is_empty());
        assert_eq!(toasts.pending_timers(), 0);
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn subscribers_see_current_state_first() {
        let toasts = ToastQueue::new();
        toasts.info("already here");

        let mut rx = toasts.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update()[0].text, "already here");

        toasts.info("later");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 2);
    }

    #[test]
    fn works_without_runtime() {
        let toasts = ToastQueue::new();
        let id = toasts.success("no timers here");
        assert_eq!(toasts.len(), 1);
        toasts.dismiss(id);
        assert!(toasts.is_empty());
    }
}
