// src/test_utils/mock_gemini_server.rs
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedGeminiRequest {
    /// Last path segment, e.g. `gemini-pro:generateContent`.
    pub model_call: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockGeminiState {
    responses: Arc<Mutex<VecDeque<(u16, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedGeminiRequest>>>,
}

async fn generate_content_handler(
    State(state): State<MockGeminiState>,
    Path(model_call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.requests.lock().unwrap().push(RecordedGeminiRequest {
        model_call,
        api_key: query.get("key").cloned(),
        body,
    });

    match state.responses.lock().unwrap().pop_front() {
        Some((status, body)) => (StatusCode::from_u16(status).unwrap(), Json(body)),
        None => {
            log::error!("Mock Gemini server ran out of responses!");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": {"code": 503, "message": "no scripted response"}})),
            )
        }
    }
}

pub struct MockGeminiServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    requests: Arc<Mutex<Vec<RecordedGeminiRequest>>>,
}

impl MockGeminiServer {
    pub async fn start(responses: Vec<(u16, Value)>) -> Self {
        let state = MockGeminiState {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let requests = state.requests.clone();

        let app = Router::new()
            .route("/models/{model_call}", post(generate_content_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock Gemini server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock Gemini server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| log::error!("Mock Gemini server error: {}", e));
        });

        MockGeminiServer {
            addr,
            shutdown_tx,
            requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get_requests(&self) -> Vec<RecordedGeminiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock Gemini server already stopped.");
        }
    }
}
