use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use jotter::client::http::HttpNotesApi;
use jotter::client::NotesApi;
use jotter::error::JotterError;
use jotter::model::{CreateNote, Note, UpdateNote};
use jotter::store::NotesStore;
use jotter::toast::{ToastKind, ToastQueue};
use serde_json::json;
use std::sync::{Arc, Mutex};

type Db = Arc<Mutex<Vec<Note>>>;

async fn list(State(db): State<Db>) -> Json<Vec<Note>> {
    Json(db.lock().unwrap().clone())
}

async fn get_one(State(db): State<Db>, Path(id): Path<String>) -> Response {
    match db.lock().unwrap().iter().find(|n| n.id == id) {
        Some(note) => Json(note.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "no such note" }))).into_response(),
    }
}

async fn create(State(db): State<Db>, Json(payload): Json<CreateNote>) -> Response {
    if payload.title == "boom" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "message": "title rejected" })),
        )
            .into_response();
    }
    let mut notes = db.lock().unwrap();
    let note = Note::new(
        (notes.len() + 100).to_string(),
        payload.title,
        payload.content.unwrap_or_default(),
    );
    notes.push(note.clone());
    (StatusCode::CREATED, Json(note)).into_response()
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateNote>,
) -> Response {
    let mut notes = db.lock().unwrap();
    match notes.iter_mut().find(|n| n.id == id) {
        Some(note) => {
            *note = note.patched(&patch);
            Json(note.clone()).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn remove(State(db): State<Db>, Path(id): Path<String>) -> StatusCode {
    let mut notes = db.lock().unwrap();
    let before = notes.len();
    notes.retain(|n| n.id != id);
    if notes.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn spawn_server(seed: Vec<Note>) -> (String, Db) {
    let db: Db = Arc::new(Mutex::new(seed));
    let app = Router::new()
        .route("/api/notes", get(list).post(create))
        .route("/api/notes/:id", get(get_one).patch(update).delete(remove))
        .with_state(db.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/", addr), db)
}

#[tokio::test]
async fn crud_round_trip() {
    let (base, db) = spawn_server(vec![Note::new("1", "First", "one")]).await;
    let api = HttpNotesApi::new(&base).unwrap();

    let notes = api.list().await.unwrap();
    assert_eq!(notes, vec![Note::new("1", "First", "one")]);

    let created = api
        .create(&CreateNote::new("Second").with_content("two"))
        .await
        .unwrap();
    assert_eq!(created.title, "Second");

    let updated = api
        .update(&created.id, &UpdateNote::default().content("2"))
        .await
        .unwrap();
    assert_eq!(updated.title, "Second");
    assert_eq!(updated.content, "2");

    api.remove("1").await.unwrap();
    let remaining: Vec<_> = db.lock().unwrap().iter().map(|n| n.id.clone()).collect();
    assert_eq!(remaining, vec![created.id]);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (base, _db) = spawn_server(Vec::new()).await;
    let api = HttpNotesApi::new(&base).unwrap();

    match api.get("nope").await {
        Err(err @ JotterError::NotFound { .. }) => {
            assert_eq!(err.payload_message(), Some("no such note"));
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(matches!(
        api.remove("nope").await,
        Err(JotterError::NotFound { id, message: None }) if id == "nope"
    ));
}

#[tokio::test]
async fn not_found_message_reaches_store() {
    let (base, _db) = spawn_server(Vec::new()).await;
    let store = NotesStore::new(HttpNotesApi::new(&base).unwrap(), ToastQueue::new());

    store.get_by_id("7").await;
    assert_eq!(store.error().as_deref(), Some("no such note"));
    assert!(store
        .toasts()
        .messages()
        .iter()
        .any(|t| t.kind == ToastKind::Error && t.text == "no such note"));
}

#[tokio::test]
async fn ids_are_escaped_into_path() {
    let (base, _db) = spawn_server(vec![Note::new("a b/c", "Odd id", "")]).await;
    let api = HttpNotesApi::new(&base).unwrap();

    let note = api.get("a b/c").await.unwrap();
    assert_eq!(note.title, "Odd id");
}

#[tokio::test]
async fn error_body_message_is_kept() {
    let (base, _db) = spawn_server(Vec::new()).await;
    let api = HttpNotesApi::new(&base).unwrap();

    match api.create(&CreateNote::new("boom")).await {
        Err(err @ JotterError::Status { status: 422, .. }) => {
            assert_eq!(err.payload_message(), Some("title rejected"));
        }
        other => panic!("expected 422, got {:?}", other),
    }
}

#[tokio::test]
async fn connection_refused_is_transport() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let api = HttpNotesApi::new(&format!("http://127.0.0.1:{}/api", port)).unwrap();
    assert!(matches!(api.list().await, Err(JotterError::Transport(_))));
}

#[tokio::test]
async fn store_over_http() {
    let (base, _db) = spawn_server(vec![
        Note::new("1", "A", ""),
        Note::new("2", "B", ""),
    ])
    .await;
    let store = NotesStore::new(HttpNotesApi::new(&base).unwrap(), ToastQueue::new());

    store.load_all().await;
    assert_eq!(store.notes().len(), 2);

    store.create(CreateNote::new("boom")).await;
    assert_eq!(store.notes().len(), 2);
    assert_eq!(store.error().as_deref(), Some("title rejected"));
    assert!(store
        .toasts()
        .messages()
        .iter()
        .any(|t| t.kind == ToastKind::Error && t.text == "title rejected"));

    store.create(CreateNote::new("C")).await;
    assert_eq!(store.notes()[0].title, "C");
    assert!(!store.notes()[0].is_placeholder());
    assert_eq!(store.error(), None);
}
