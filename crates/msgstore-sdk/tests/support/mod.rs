#![allow(dead_code)]

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{HeaderMap, Method, Response, StatusCode, Uri};
use msgstore_sdk::{ClientConfig, WireEntry};
use serde::Deserialize;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::new(addr.ip().to_string(), addr.port())
}

/// A port with nothing listening on it.
pub async fn closed_port_config() -> ClientConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    drop(listener);
    config_for(addr)
}

#[derive(Clone, Debug)]
pub struct ScriptedResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub delay: Option<Duration>,
}

impl ScriptedResponse {
    pub fn status(code: u16) -> Self {
        Self {
            status: StatusCode::from_u16(code).expect("status code should be valid"),
            headers: Vec::new(),
            body: String::new(),
            delay: None,
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Clone, Default)]
struct ScriptState {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Replays queued responses in order and records every request it sees.
pub struct ScriptedServer {
    pub addr: SocketAddr,
    state: ScriptState,
}

impl ScriptedServer {
    pub async fn start(responses: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        let state = ScriptState::default();
        state
            .responses
            .lock()
            .expect("responses mutex")
            .extend(responses);
        let app = Router::new()
            .fallback(scripted_handler)
            .with_state(state.clone());
        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn config(&self) -> ClientConfig {
        config_for(self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("requests mutex").clone()
    }
}

async fn scripted_handler(
    State(state): State<ScriptState>,
    method: Method,
    uri: Uri,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response<Body> {
    state
        .requests
        .lock()
        .expect("requests mutex")
        .push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            query,
            headers,
            body,
        });

    let next = state.responses.lock().expect("responses mutex").pop_front();
    let Some(scripted) = next else {
        return Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from("no response queued"))
            .expect("response should build");
    };
    if let Some(delay) = scripted.delay {
        tokio::time::sleep(delay).await;
    }
    let mut builder = Response::builder().status(scripted.status);
    for (name, value) in &scripted.headers {
        builder = builder.header(name, value);
    }
    builder
        .body(Body::from(scripted.body))
        .expect("response should build")
}

/// In-memory store speaking the produce/consume protocol, including long-poll.
///
/// A poll at offset `n` waits for the entry at `n + 1`.
pub struct MemoryStoreServer {
    pub addr: SocketAddr,
    state: MemoryState,
}

#[derive(Clone, Default)]
struct MemoryState {
    topics: Arc<Mutex<HashMap<String, Vec<serde_json::Value>>>>,
    appended: Arc<Notify>,
}

impl MemoryState {
    fn lookup(&self, topic: &str, offset: i64) -> Option<serde_json::Value> {
        let index = usize::try_from(offset).ok()?;
        self.topics
            .lock()
            .expect("topics mutex")
            .get(topic)
            .and_then(|entries| entries.get(index))
            .cloned()
    }
}

#[derive(Debug, Deserialize)]
struct ProduceParams {
    topic: String,
}

#[derive(Debug, Deserialize)]
struct ConsumeParams {
    topic: String,
    offset: i64,
    #[serde(rename = "pollDuration")]
    poll_duration: Option<String>,
}

impl MemoryStoreServer {
    pub async fn start() -> Self {
        let state = MemoryState::default();
        let app = Router::new()
            .route("/produce", axum::routing::post(produce_handler))
            .route("/consume", axum::routing::get(consume_handler))
            .with_state(state.clone());
        let addr = serve(app).await;
        Self { addr, state }
    }

    pub fn config(&self) -> ClientConfig {
        config_for(self.addr)
    }

    pub fn stored(&self, topic: &str) -> Vec<serde_json::Value> {
        self.state
            .topics
            .lock()
            .expect("topics mutex")
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }
}

async fn produce_handler(
    State(state): State<MemoryState>,
    Query(params): Query<ProduceParams>,
    body: Bytes,
) -> Response<Body> {
    if serde_json::from_slice::<WireEntry>(&body).is_err() {
        return empty_response(StatusCode::BAD_REQUEST);
    }
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(&body) else {
        return empty_response(StatusCode::BAD_REQUEST);
    };
    let offset = {
        let mut topics = state.topics.lock().expect("topics mutex");
        let entries = topics.entry(params.topic).or_default();
        entries.push(value);
        entries.len() - 1
    };
    state.appended.notify_waiters();
    Response::builder()
        .status(StatusCode::CREATED)
        .header("x-offset", offset.to_string())
        .body(Body::empty())
        .expect("response should build")
}

async fn consume_handler(
    State(state): State<MemoryState>,
    Query(params): Query<ConsumeParams>,
) -> Response<Body> {
    let Some(poll_text) = params.poll_duration else {
        return match state.lookup(&params.topic, params.offset) {
            Some(entry) => entry_response(&entry),
            None => empty_response(StatusCode::NOT_FOUND),
        };
    };
    let Some(window) = parse_go_duration(&poll_text) else {
        return empty_response(StatusCode::BAD_REQUEST);
    };

    let target = params.offset + 1;
    let deadline = Instant::now() + window;
    loop {
        let appended = state.appended.notified();
        if let Some(entry) = state.lookup(&params.topic, target) {
            return entry_response(&entry);
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || tokio::time::timeout(remaining, appended).await.is_err() {
            return empty_response(StatusCode::NO_CONTENT);
        }
    }
}

fn entry_response(entry: &serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "application/json")
        .body(Body::from(entry.to_string()))
        .expect("response should build")
}

fn empty_response(status: StatusCode) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::empty())
        .expect("response should build")
}

/// Parses the subset of Go duration text the client emits, e.g. `1m0.5s`.
pub fn parse_go_duration(text: &str) -> Option<Duration> {
    if text == "0s" {
        return Some(Duration::ZERO);
    }
    let mut total_nanos = 0f64;
    let mut rest = text;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];
        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "h" => 3_600e9,
            "m" => 60e9,
            "s" => 1e9,
            "ms" => 1e6,
            "µs" | "us" => 1e3,
            "ns" => 1.0,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total_nanos += number * scale;
    }
    Some(Duration::from_nanos(total_nanos.round() as u64))
}

/// Shared buffer the fmt subscriber writes into.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("logs mutex")).into_owned()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("logs mutex").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Installs a warn-level subscriber for the current thread. Keep the guard
/// alive for as long as events should be captured; pair with a
/// current-thread runtime so the client runs on this thread.
pub fn capture_warnings() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (tracing::subscriber::set_default(subscriber), logs)
}
