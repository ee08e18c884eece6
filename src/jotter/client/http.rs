//! Typed HTTP client for the notes collection endpoint.

use super::NotesApi;
use crate::error::{JotterError, Result};
use crate::model::{CreateNote, Note, UpdateNote};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const COLLECTION: &str = "notes";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpNotesApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpNotesApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, COLLECTION)
    }

    fn note_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), urlencoding::encode(id))
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list(&self) -> Result<Vec<Note>> {
        let url = self.collection_url();
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        let resp = ensure_success(resp, None).await?;

        let body = resp.text().await.map_err(transport)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        decode(&body)
    }

    async fn get(&self, id: &str) -> Result<Note> {
        let url = self.note_url(id);
        debug!("GET {}", url);
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        let resp = ensure_success(resp, Some(id)).await?;
        read_json(resp).await
    }

    async fn create(&self, payload: &CreateNote) -> Result<Note> {
        let url = self.collection_url();
        debug!("POST {}", url);
        let resp = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        let resp = ensure_success(resp, None).await?;
        read_json(resp).await
    }

    async fn update(&self, id: &str, payload: &UpdateNote) -> Result<Note> {
        let url = self.note_url(id);
        debug!("PATCH {}", url);
        let resp = self
            .client
            .patch(&url)
            .json(payload)
            .send()
            .await
            .map_err(transport)?;
        let resp = ensure_success(resp, Some(id)).await?;
        read_json(resp).await
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let url = self.note_url(id);
        debug!("DELETE {}", url);
        let resp = self.client.delete(&url).send().await.map_err(transport)?;
        ensure_success(resp, Some(id)).await?;
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> JotterError {
    warn!("notes request failed: {}", err);
    JotterError::from(err)
}

/// Turns a non-2xx response into the matching error. A 404 on a single-note
/// route becomes `NotFound`. Either way the body's message is kept.
async fn ensure_success(resp: Response, id: Option<&str>) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = match resp.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!("could not read HTTP {} error body: {}", status, err);
            String::new()
        }
    };
    warn!("notes request returned HTTP {}", status);
    let message = body_message(&body);

    if status == StatusCode::NOT_FOUND {
        if let Some(id) = id {
            return Err(JotterError::NotFound {
                id: id.to_string(),
                message,
            });
        }
    }

    Err(JotterError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Pulls a human readable message out of an error body: a JSON `message` or
/// `error` field, else the raw text.
pub(crate) fn body_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let field = ["message", "error"]
            .iter()
            .find_map(|key| value.get(key).and_then(|v| v.as_str()))
            .map(str::to_string);
        if field.is_some() {
            return field;
        }
        if let Some(text) = value.as_str() {
            return Some(text.to_string());
        }
    }

    Some(trimmed.to_string())
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let body = resp.text().await.map_err(transport)?;
    decode(&body)
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| JotterError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_trailing_slash_from_base() {
        let api = HttpNotesApi::new("http://localhost:3000/api/").unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert_eq!(api.collection_url(), "http://localhost:3000/api/notes");
    }

    #[test]
    fn escapes_ids_into_path() {
        let api = HttpNotesApi::new("http://localhost:3000/api").unwrap();
        assert_eq!(
            api.note_url("a b/c"),
            "http://localhost:3000/api/notes/a%20b%2Fc"
        );
    }

    #[test]
    fn body_message_prefers_json_fields() {
        assert_eq!(
            body_message(r#"{"message":"title is required"}"#).as_deref(),
            Some("title is required")
        );
        assert_eq!(
            body_message(r#"{"error":"Bad Request"}"#).as_deref(),
            Some("Bad Request")
        );
        assert_eq!(body_message("plain failure").as_deref(), Some("plain failure"));
        assert_eq!(body_message("   "), None);
    }

    #[test]
    fn body_message_keeps_json_without_known_fields() {
        assert_eq!(
            body_message(r#"{"code":42}"#).as_deref(),
            Some(r#"{"code":42}"#)
        );
    }
}
