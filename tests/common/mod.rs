//! Mock todo server and helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct MockState {
    hits: Arc<AtomicUsize>,
}

/// An HTTP server answering like a small todo API.
///
/// - `/todos` returns five todos, honoring `_limit`
/// - `/slow` returns the same list after 200ms
/// - `/missing` answers 404
/// - `/broken` answers 200 with a body that is not JSON
/// - `/wrong-shape` answers 200 with JSON that is not a list
pub struct MockTodoServer {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl MockTodoServer {
    pub async fn start() -> Self {
        let state = MockState::default();
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/todos", get(todos))
            .route("/slow", get(slow))
            .route("/missing", get(missing))
            .route("/broken", get(broken))
            .route("/wrong-shape", get(wrong_shape))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Number of requests answered so far, across all routes.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockTodoServer {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

pub fn todo_json(id: u64) -> Value {
    json!({
        "userId": 1,
        "id": id,
        "title": format!("todo {id}"),
        "completed": id % 2 == 0,
    })
}

fn list(params: &HashMap<String, String>) -> Value {
    let limit = params
        .get("_limit")
        .and_then(|limit| limit.parse::<u64>().ok())
        .unwrap_or(5)
        .min(5);
    Value::Array((1..=limit).map(todo_json).collect())
}

async fn todos(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(list(&params))
}

async fn slow(
    State(state): State<MockState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(200)).await;
    Json(list(&params))
}

async fn missing(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (StatusCode::NOT_FOUND, "not found").into_response()
}

async fn broken(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        "{ this is not json",
    )
        .into_response()
}

async fn wrong_shape(State(state): State<MockState>) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "todos": [] }))
}

pub fn test_terminal() -> Terminal<TestBackend> {
    Terminal::new(TestBackend::new(60, 12)).expect("test terminal")
}

/// The terminal contents, one string per row.
pub fn screen(terminal: &Terminal<TestBackend>) -> Vec<String> {
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| {
            (0..buffer.area.width)
                .map(|x| buffer[(x, y)].symbol().to_string())
                .collect::<String>()
        })
        .collect()
}
