#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use hat_checker::{CapturedImage, OllamaClient, OllamaConfig, image_from_rgb};
use serde_json::{Value, json};
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, mpsc},
    time::Duration,
};

/// How the fake `/api/generate` endpoint answers.
#[derive(Clone)]
pub enum GenerateReply {
    Json(Value),
    Status(u16),
    Raw(&'static str),
    Delay(Duration),
}

#[derive(Clone)]
struct MockState {
    tags_status: u16,
    reply: GenerateReply,
    requests: Arc<Mutex<Vec<Value>>>,
}

/// A fake Ollama server running on its own tokio runtime thread.
pub struct MockOllama {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<Value>>>,
}

impl MockOllama {
    pub fn start(reply: GenerateReply) -> Self {
        Self::start_with_tags(200, reply)
    }

    /// Like [`MockOllama::start`], but `/api/tags` answers with `tags_status`.
    pub fn start_with_tags(tags_status: u16, reply: GenerateReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            tags_status,
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/api/tags", get(tags))
            .route("/api/generate", post(generate))
            .with_state(state);

        let (addr_tx, addr_rx) = mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind mock server");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("send addr");
                axum::serve(listener, app).await.expect("serve mock");
            });
        });

        let addr = addr_rx.recv().expect("mock server address");
        Self { addr, requests }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> OllamaClient {
        self.client_with_timeout(Duration::from_secs(10))
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            base_url: self.base_url(),
            timeout,
            ..OllamaConfig::default()
        })
        .expect("http client")
    }

    /// Bodies received by `/api/generate`, oldest first.
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("requests lock").clone()
    }
}

async fn tags(State(state): State<MockState>) -> Response {
    let status = StatusCode::from_u16(state.tags_status).expect("valid status");
    (status, Json(json!({ "models": [] }))).into_response()
}

async fn generate(State(state): State<MockState>, Json(body): Json<Value>) -> Response {
    state.requests.lock().expect("requests lock").push(body);

    match state.reply {
        GenerateReply::Json(value) => (StatusCode::OK, Json(value)).into_response(),
        GenerateReply::Status(code) => {
            let status = StatusCode::from_u16(code).expect("valid status");
            (status, Json(json!({ "error": "mock failure" }))).into_response()
        }
        GenerateReply::Raw(body) => (StatusCode::OK, body).into_response(),
        GenerateReply::Delay(delay) => {
            tokio::time::sleep(delay).await;
            (StatusCode::OK, Json(json!({ "response": "too late" }))).into_response()
        }
    }
}

/// A small solid colour frame.
pub fn solid_image(width: usize, height: usize, rgb: [u8; 3]) -> CapturedImage {
    let data = rgb.iter().copied().cycle().take(width * height * 3).collect();
    image_from_rgb(width, height, data).expect("valid image")
}

/// An address nothing is listening on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
