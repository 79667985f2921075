#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use serde_json::{json, Value as JsonValue};
use wpgraphql_http::{AttemptError, RetryEvent};

#[derive(Clone)]
pub struct MockResponse {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: JsonValue) -> Self {
        Self::raw(status, body.to_string())
    }

    pub fn raw(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::from_millis(0),
        }
    }

    pub fn data(data: JsonValue) -> Self {
        Self::json(StatusCode::OK, json!({ "data": data }))
    }

    pub fn errors(messages: &[&str]) -> Self {
        let errors: Vec<JsonValue> = messages
            .iter()
            .map(|message| json!({ "message": message }))
            .collect();
        Self::json(StatusCode::OK, json!({ "data": null, "errors": errors }))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: JsonValue,
}

#[derive(Clone)]
struct MockState {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    hits: Arc<AtomicUsize>,
}

async fn graphql_handler(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    };
    state
        .requests
        .lock()
        .expect("request log mutex must not be poisoned")
        .push(RecordedRequest {
            authorization: header_text(header::AUTHORIZATION),
            content_type: header_text(header::CONTENT_TYPE),
            body: serde_json::from_str(&body).unwrap_or(JsonValue::Null),
        });

    let response = {
        let mut queue = state
            .responses
            .lock()
            .expect("response queue mutex must not be poisoned");
        queue.pop_front().unwrap_or_else(|| {
            MockResponse::json(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "no mock response available"}),
            )
        })
    };

    if !response.delay.is_zero() {
        tokio::time::sleep(response.delay).await;
    }

    (
        response.status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
}

pub struct TestServer {
    base_url: String,
    hits: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl TestServer {
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.base_url)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .expect("request log mutex must not be poisoned")
            .clone()
    }
}

pub async fn spawn_server(responses: Vec<MockResponse>) -> TestServer {
    let state = MockState {
        responses: Arc::new(Mutex::new(responses.into())),
        requests: Arc::new(Mutex::new(Vec::new())),
        hits: Arc::new(AtomicUsize::new(0)),
    };

    let app = Router::new()
        .route("/graphql", post(graphql_handler))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("must bind test listener");
    let address = listener.local_addr().expect("must have local addr");
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("mock server must run");
    });

    TestServer {
        base_url: format!("http://{address}"),
        hits: state.hits,
        requests: state.requests,
        task,
    }
}

/// Returns a URL on a port nothing listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("must bind probe listener");
    let address = listener.local_addr().expect("must have local addr");
    drop(listener);
    format!("http://{address}/graphql")
}

/// Owned copy of a [`RetryEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum Recorded {
    Started(usize),
    Failed {
        attempt: usize,
        kind: &'static str,
        next_delay: Option<Duration>,
    },
    Succeeded(usize),
    Exhausted(usize),
    Cancelled(usize),
}

pub fn attempt_kind(error: &AttemptError) -> &'static str {
    match error {
        AttemptError::Transport(_) => "transport",
        AttemptError::Timeout { .. } => "timeout",
        AttemptError::Http { .. } => "http",
        AttemptError::Remote { .. } => "remote",
        AttemptError::Decode(_) => "decode",
    }
}

/// Observer that records every event, plus a handle to read them back.
pub fn recorder() -> (
    impl Fn(&RetryEvent<'_>) + Send + Sync + 'static,
    Arc<Mutex<Vec<Recorded>>>,
) {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let observer = move |event: &RetryEvent<'_>| {
        let recorded = match event {
            RetryEvent::AttemptStarted { attempt, .. } => Recorded::Started(*attempt),
            RetryEvent::AttemptFailed {
                attempt,
                error,
                next_delay,
            } => Recorded::Failed {
                attempt: *attempt,
                kind: attempt_kind(error),
                next_delay: *next_delay,
            },
            RetryEvent::Succeeded { attempt } => Recorded::Succeeded(*attempt),
            RetryEvent::Exhausted { attempts } => Recorded::Exhausted(*attempts),
            RetryEvent::Cancelled { attempt } => Recorded::Cancelled(*attempt),
        };
        sink.lock().expect("event log mutex").push(recorded);
    };
    (observer, log)
}

pub fn events(log: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Recorded> {
    log.lock().expect("event log mutex").clone()
}

/// Backoff delays announced by failed attempts, in order.
pub fn announced_delays(log: &Arc<Mutex<Vec<Recorded>>>) -> Vec<Duration> {
    events(log)
        .into_iter()
        .filter_map(|event| match event {
            Recorded::Failed {
                next_delay: Some(delay),
                ..
            } => Some(delay),
            _ => None,
        })
        .collect()
}
