// src/test_utils/mock_judge0_server.rs
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::net::TcpListener;

/// Scripted behaviour for the mock Judge0 backend.
#[derive(Clone, Debug)]
pub struct MockJudge0Script {
    pub languages: Value,
    pub languages_status: u16,
    pub issue_token: bool,
    /// Replayed in order; the last entry repeats once the script runs out.
    pub statuses: Vec<Value>,
}

impl Default for MockJudge0Script {
    fn default() -> Self {
        Self {
            languages: json!([
                {"id": 50, "name": "C (GCC 9.2.0)"},
                {"id": 54, "name": "C++ (GCC 9.2.0)"},
                {"id": 62, "name": "Java (OpenJDK 13.0.1)"},
                {"id": 63, "name": "JavaScript (Node.js 12.14.0)"},
                {"id": 70, "name": "Python (2.7.17)"},
                {"id": 71, "name": "Python (3.8.1)"}
            ]),
            languages_status: 200,
            issue_token: true,
            statuses: vec![json!({"status": {"id": 3, "description": "Accepted"}, "stdout": ""})],
        }
    }
}

#[derive(Clone)]
struct MockJudge0State {
    script: Arc<MockJudge0Script>,
    language_fetches: Arc<AtomicUsize>,
    submissions: Arc<Mutex<Vec<Value>>>,
    status_fetches: Arc<Mutex<Vec<Instant>>>,
}

async fn languages_handler(State(state): State<MockJudge0State>) -> (StatusCode, Json<Value>) {
    state.language_fetches.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(state.script.languages_status).unwrap();
    if status.is_success() {
        (status, Json(state.script.languages.clone()))
    } else {
        (status, Json(json!({"error": "languages unavailable"})))
    }
}

async fn submit_handler(
    State(state): State<MockJudge0State>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    log::debug!("Mock Judge0 received submission: {}", body);
    state.submissions.lock().unwrap().push(body);
    if state.script.issue_token {
        (StatusCode::CREATED, Json(json!({"token": "d85cd024-1548-4165-96c7-7bc88673f194"})))
    } else {
        (StatusCode::CREATED, Json(json!({})))
    }
}

async fn status_handler(
    State(state): State<MockJudge0State>,
    Path(token): Path<String>,
) -> Json<Value> {
    let mut fetches = state.status_fetches.lock().unwrap();
    fetches.push(Instant::now());
    let index = (fetches.len() - 1).min(state.script.statuses.len() - 1);
    log::debug!("Mock Judge0 status fetch {} for {}", fetches.len(), token);
    Json(state.script.statuses[index].clone())
}

pub struct MockJudge0Server {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    state: MockJudge0State,
}

impl MockJudge0Server {
    pub async fn start(script: MockJudge0Script) -> Self {
        let state = MockJudge0State {
            script: Arc::new(script),
            language_fetches: Arc::new(AtomicUsize::new(0)),
            submissions: Arc::new(Mutex::new(Vec::new())),
            status_fetches: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/languages", get(languages_handler))
            .route("/submissions", post(submit_handler))
            .route("/submissions/{token}", get(status_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock Judge0 server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock Judge0 server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| log::error!("Mock Judge0 server error: {}", e));
        });

        MockJudge0Server {
            addr,
            shutdown_tx,
            state,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn language_fetches(&self) -> usize {
        self.state.language_fetches.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<Value> {
        self.state.submissions.lock().unwrap().clone()
    }

    pub fn status_fetches(&self) -> usize {
        self.state.status_fetches.lock().unwrap().len()
    }

    pub fn status_fetch_times(&self) -> Vec<Instant> {
        self.state.status_fetches.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock Judge0 server already stopped.");
        }
    }
}
