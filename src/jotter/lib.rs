//! # Jotter Architecture
//!
//! Jotter is a **UI-agnostic notes client library**. It keeps a local cache of
//! notes in step with a REST notes service, applying every change locally
//! first and undoing it if the server refuses. The CLI in `main.rs` is one
//! client of the library; a desktop or web front end would be another.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  View Layer (main.rs + args.rs, or any other UI)            │
//! │  - Dispatches commands, renders state and toasts            │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Store (store/)                         Toasts (toast.rs)   │
//! │  - Optimistic CRUD with rollback  ───▶  - Newest first      │
//! │  - Observable notes/loading/error/      - Auto-dismiss      │
//! │    selection streams                      timers            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Client (client/)                                       │
//! │  - Abstract NotesApi trait                                  │
//! │  - HttpNotesApi (production), InMemoryApi (testing)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Failures Stop at the Store
//!
//! The API client returns `Result`. The store never does: it catches every
//! failure, rolls back whatever it applied optimistically, records a message
//! in its `error` stream and queues an error toast. A view only ever observes
//! state, it never handles a transport error.
//!
//! ## Testing Strategy
//!
//! 1. **Store** (`store/`): the bulk of the tests, run against
//!    [`client::memory::InMemoryApi`] with injected failures.
//! 2. **Toasts** (`toast.rs`): timer behaviour under a paused tokio clock.
//! 3. **HTTP client** (`client/http.rs`, `tests/`): against a local server.
//!
//! ## Module Overview
//!
//! - [`store`]: the notes store and its pending-operation records
//! - [`client`]: API trait and implementations
//! - [`toast`]: toast queue
//! - [`search`]: pure filter, query precedence and the search bus
//! - [`model`]: `Note` and the create/update payloads
//! - [`config`]: startup configuration
//! - [`error`]: error types

pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod search;
pub mod store;
pub mod toast;
