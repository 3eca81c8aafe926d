#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use noteful_api::config::AppConfig;
use noteful_api::database::{MemoryStore, Relation, Row};
use noteful_api::{app, AppState};

/// Router over a fresh in-memory store
pub struct TestApp {
    pub store: Arc<MemoryStore>,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub text: String,
    /// Parsed JSON body, `Value::Null` when the body is empty or not JSON
    pub body: Value,
}

impl TestResponse {
    pub fn error_message(&self) -> &str {
        self.body["error"]["message"].as_str().unwrap_or_default()
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get("location").and_then(|v| v.to_str().ok())
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.api.enable_request_logging = false;
    config
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(test_config())
}

pub fn spawn_app_with(config: AppConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let router = app(AppState::new(store.clone(), config));
    TestApp { store, router }
}

impl TestApp {
    pub async fn request(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("router call failed")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let text = String::from_utf8(bytes.to_vec())?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(TestResponse { status, headers, text, body })
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Result<TestResponse> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };
        self.request(request).await
    }

    pub async fn get(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> Result<TestResponse> {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Result<TestResponse> {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn seed_folders(&self) -> Result<()> {
        self.store.seed(Relation::Folders, make_folders()).await?;
        Ok(())
    }

    pub async fn seed_folders_and_notes(&self) -> Result<()> {
        self.seed_folders().await?;
        self.store.seed(Relation::Notes, make_notes()).await?;
        Ok(())
    }
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object: {}", other),
    }
}

pub fn make_folders() -> Vec<Row> {
    [
        (1, "First test folder!"),
        (2, "Second test folder!"),
        (3, "Third test folder!"),
        (4, "Fourth test folder!"),
        (5, "Fifth test folder!"),
    ]
    .into_iter()
    .map(|(id, name)| row(json!({ "id": id, "folder_name": name })))
    .collect()
}

pub fn make_notes() -> Vec<Row> {
    vec![
        row(json!({
            "id": 1,
            "modified": "2029-01-22T16:28:32.615Z",
            "note_name": "First test note!",
            "content": "Lorem ipsum dolor sit amet, consectetur adipisicing elit. Natus consequuntur deserunt commodi.",
            "folder_id": 1
        })),
        row(json!({
            "id": 2,
            "modified": "2100-05-22T16:28:32.615Z",
            "note_name": "Second test note!",
            "content": "Lorem ipsum dolor sit amet consectetur adipisicing elit. Cum, exercitationem cupiditate.",
            "folder_id": 1
        })),
        row(json!({
            "id": 3,
            "modified": "1919-12-22T16:28:32.615Z",
            "note_name": "Third test note!",
            "content": "Lorem ipsum dolor sit amet, consectetur adipisicing elit. Possimus, voluptate?",
            "folder_id": 2
        })),
        row(json!({
            "id": 4,
            "modified": "1919-12-22T16:28:32.615Z",
            "note_name": "Fourth test note!",
            "content": "Lorem ipsum dolor sit amet consectetur adipisicing elit. Earum molestiae accusamus veniam.",
            "folder_id": 3
        })),
    ]
}

/// Wire form of a stored folder row
pub fn folder_json(folder: &Row) -> Value {
    json!({ "id": folder["id"], "folderName": folder["folder_name"] })
}

/// Wire form of a stored note row
pub fn note_json(note: &Row) -> Value {
    json!({
        "id": note["id"],
        "noteName": note["note_name"],
        "content": note["content"],
        "folderId": note["folder_id"],
        "modified": note["modified"],
    })
}

pub const NAUGHTY_NAME: &str = r#"Naughty naughty very naughty <script>alert("xss");</script>"#;
pub const NAUGHTY_NAME_ESCAPED: &str = r#"Naughty naughty very naughty &lt;script&gt;alert("xss");&lt;/script&gt;"#;
pub const NAUGHTY_CONTENT: &str = r#"Bad image <img src="https://url.to.file.which/does-not.exist" onerror="alert(document.cookie);">. But not <strong>all</strong> bad."#;
pub const NAUGHTY_CONTENT_CLEAN: &str = r#"Bad image <img src="https://url.to.file.which/does-not.exist">. But not <strong>all</strong> bad."#;

/// Stored malicious folder and the folder clients should see
pub fn make_malicious_folder() -> (Row, Value) {
    let folder = row(json!({ "id": 911, "folder_name": NAUGHTY_NAME }));
    let expected = json!({ "id": 911, "folderName": NAUGHTY_NAME_ESCAPED });
    (folder, expected)
}

/// Stored malicious note (in folder 1) and the note clients should see
pub fn make_malicious_note() -> (Row, Value) {
    let note = row(json!({
        "id": 911,
        "modified": "2024-03-01T12:00:00.000Z",
        "folder_id": 1,
        "note_name": NAUGHTY_NAME,
        "content": NAUGHTY_CONTENT,
    }));
    let expected = json!({
        "id": 911,
        "modified": "2024-03-01T12:00:00.000Z",
        "folderId": 1,
        "noteName": NAUGHTY_NAME_ESCAPED,
        "content": NAUGHTY_CONTENT_CLEAN,
    });
    (note, expected)
}
