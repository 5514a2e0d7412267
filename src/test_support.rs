//! Helpers shared by the async tests: recording and unresponsive HTTP endpoints, a ready-made
//! `AppState`, and a log capture.

use crate::config::Config;
use crate::types::AppState;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    Json, Router,
};
use serde_json::Value;
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

pub const TEST_WEBHOOK_SECRET: &str = "test-webhook-secret";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockState {
    status: StatusCode,
    response: Value,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A local HTTP server answering every POST with a fixed status and JSON body.
pub struct MockEndpoint {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockEndpoint {
    pub async fn start(status: StatusCode, response: Value) -> Self {
        let state = Arc::new(MockState {
            status,
            response,
            requests: Mutex::new(Vec::new()),
        });
        let app: Router = Router::new()
            .fallback(record)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service());
        tokio::spawn(async move {
            server.await.unwrap();
        });

        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }
}

async fn record(
    State(state): State<Arc<MockState>>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state.requests.lock().await.push(RecordedRequest {
        path: uri.path().to_string(),
        authorization,
        body,
    });
    (state.status, Json(state.response.clone()))
}

/// URL of a listener that accepts connections and never writes a byte back.
pub fn silent_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            held.push(stream);
        }
    });
    format!("http://{addr}")
}

/// URL of a port nothing listens on.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// State wired to the given Vogent base URL and workflow URL.
pub fn state_for(vogent_base_url: &str, n8n_url: &str) -> AppState {
    state_with_timeout(vogent_base_url, n8n_url, None)
}

/// Same as [`state_for`], optionally overriding the outbound request timeout.
pub fn state_with_timeout(
    vogent_base_url: &str,
    n8n_url: &str,
    timeout: Option<Duration>,
) -> AppState {
    let env: HashMap<&str, String> = HashMap::from([
        ("VOGENT_API_KEY", "test-api-key".to_string()),
        ("VOGENT_AGENT_ID", "agent-1".to_string()),
        ("VOGENT_PHONE_NUMBER_ID", "number-1".to_string()),
        ("VOGENT_VOICE_ID", "voice-1".to_string()),
        ("VOGENT_WEBHOOK_SECRET", TEST_WEBHOOK_SECRET.to_string()),
        ("N8N_WEBHOOK_URL", n8n_url.to_string()),
        ("VOGENT_API_BASE_URL", vogent_base_url.to_string()),
    ]);
    let config = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
    match timeout {
        Some(timeout) => AppState::with_timeout(config, timeout).unwrap(),
        None => AppState::new(config).unwrap(),
    }
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<std::sync::Mutex<Vec<u8>>>);

impl LogBuffer {
    /// Number of captured lines at `level` ("ERROR", "WARN", ...).
    pub fn count(&self, level: &str) -> usize {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.split_whitespace().any(|word| word == level))
            .count()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capture WARN and above on the current thread until the guard drops.
pub fn capture_logs() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .with_writer(move || writer.clone())
        .finish();
    (buffer, tracing::subscriber::set_default(subscriber))
}
