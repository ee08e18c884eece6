//! # Notes API Client
//!
//! The store never talks HTTP directly. Everything goes through the
//! [`NotesApi`] trait so the same orchestration runs against a real server or
//! an in-process fake.
//!
//! ## Implementations
//!
//! - [`http::HttpNotesApi`]: production client over `reqwest`
//!   - `GET /notes`, `GET /notes/{id}`, `POST /notes`, `PATCH /notes/{id}`,
//!     `DELETE /notes/{id}` under a configurable base (default `/api`)
//!   - Ids are percent-escaped into the path
//!
//! - [`memory::InMemoryApi`]: in-process server stand-in
//!   - Assigns ids and timestamps the way the server does
//!   - Failures can be injected per operation for rollback tests
//!
//! ## Failure Contract
//!
//! Every method returns [`crate::error::Result`]. Failures carry enough detail
//! (status plus optional body message) for the store to derive a user facing
//! message; the store catches them, callers of the store never see them.

use crate::error::Result;
use crate::model::{CreateNote, Note, UpdateNote};
use async_trait::async_trait;

pub mod http;
pub mod memory;

/// Asynchronous CRUD over a notes collection.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Fetch every note
    async fn list(&self) -> Result<Vec<Note>>;

    /// Fetch one note; fails with `NotFound` when the server does not know the id
    async fn get(&self, id: &str) -> Result<Note>;

    /// Create a note. The server assigns id and timestamps.
    async fn create(&self, payload: &CreateNote) -> Result<Note>;

    /// Patch a note. The server recomputes `updated_at`.
    async fn update(&self, id: &str, payload: &UpdateNote) -> Result<Note>;

    /// Delete a note
    async fn remove(&self, id: &str) -> Result<()>;
}
