//! In-process stand-in for the RAG backend.
//!
//! Serves the four endpoints the client uses, records every chat request
//! body, and can be switched into failure modes.

#![allow(dead_code)]

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatMode {
    Answer,
    /// 500 with `{"detail": "backend down"}`.
    FailWithDetail,
    /// 500 with an HTML body.
    FailWithGarbage,
}

#[derive(Debug)]
struct StubInner {
    mode: ChatMode,
    /// Held before each chat answer.
    delay: Duration,
    requests: Vec<Value>,
    answered: usize,
    conversations: Vec<String>,
}

#[derive(Clone)]
pub struct StubBackend {
    inner: Arc<Mutex<StubInner>>,
    pub base_url: String,
    server: Arc<tokio::task::JoinHandle<()>>,
}

impl StubBackend {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(StubInner {
            mode: ChatMode::Answer,
            delay: Duration::ZERO,
            requests: Vec::new(),
            answered: 0,
            conversations: Vec::new(),
        }));

        let app = Router::new()
            .route("/api/chat", post(handle_chat))
            .route("/api/chat/{id}", delete(handle_clear))
            .route("/api/health", get(handle_health))
            .route("/api/conversations", get(handle_list))
            .with_state(inner.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            inner,
            base_url: format!("http://127.0.0.1:{}", port),
            server: Arc::new(server),
        }
    }

    pub fn set_mode(&self, mode: ChatMode) {
        self.inner.lock().unwrap().mode = mode;
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().delay = delay;
    }

    /// Chat responses fully sent so far.
    pub fn answered(&self) -> usize {
        self.inner.lock().unwrap().answered
    }

    pub fn requests(&self) -> Vec<Value> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn shutdown(&self) {
        self.server.abort();
    }
}

type Shared = Arc<Mutex<StubInner>>;

async fn handle_chat(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let delay = {
        let mut inner = state.lock().unwrap();
        inner.requests.push(body.clone());
        inner.delay
    };
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut inner = state.lock().unwrap();
    inner.answered += 1;
    match inner.mode {
        ChatMode::FailWithDetail => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"detail": "backend down"})),
            )
                .into_response();
        }
        ChatMode::FailWithGarbage => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "<html><body>Internal Server Error</body></html>",
            )
                .into_response();
        }
        ChatMode::Answer => {}
    }

    let conversation_id = match body.get("conversation_id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = format!("conv-{}", inner.conversations.len() + 1);
            inner.conversations.push(id.clone());
            id
        }
    };
    let query = body.get("query").and_then(Value::as_str).unwrap_or_default();
    let grounded = body.get("selected_text").is_some_and(|v| !v.is_null());

    Json(json!({
        "answer": format!("Answer to: {}", query),
        "sources": [
            {"chunk_id": "ch01-s02-0", "chapter": "Foundations", "section": "Embodiment", "score": 0.87}
        ],
        "grounded": grounded,
        "conversation_id": conversation_id,
    }))
    .into_response()
}

async fn handle_clear(State(state): State<Shared>, Path(id): Path<String>) -> Json<Value> {
    let mut inner = state.lock().unwrap();
    let before = inner.conversations.len();
    inner.conversations.retain(|c| c != &id);
    if inner.conversations.len() < before {
        Json(json!({"success": true, "message": format!("Conversation {} cleared successfully", id)}))
    } else {
        Json(json!({"success": false, "message": format!("Conversation {} not found", id)}))
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "qdrant_connected": true,
        "collection_exists": true,
        "chunk_count": 128
    }))
}

async fn handle_list(State(state): State<Shared>) -> Json<Value> {
    let inner = state.lock().unwrap();
    Json(json!({
        "conversations": inner.conversations,
        "count": inner.conversations.len()
    }))
}
