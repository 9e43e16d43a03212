#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocketUpgrade};
use axum::extract::{State, Request};
use axum::http::{StatusCode, header::AUTHORIZATION};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct RecorderState {
    password: Option<&'static str>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Controller stand-in that records every command it receives.
pub struct FakeController {
    pub base_url: Url,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeController {
    /// Accepts every command.
    pub async fn open() -> Self {
        Self::spawn(None).await
    }

    /// Answers 401 unless `Authorization` equals `password`.
    pub async fn guarded(password: &'static str) -> Self {
        Self::spawn(Some(password)).await
    }

    async fn spawn(password: Option<&'static str>) -> Self {
        let state = RecorderState {
            password,
            requests: Arc::default(),
        };
        let requests = Arc::clone(&state.requests);
        let app = Router::new().fallback(record).with_state(state);
        let addr = serve(app).await;

        Self {
            base_url: Url::parse(&format!("http://{addr}/")).unwrap(),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn record(
    State(state): State<RecorderState>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, 64 * 1024).await.unwrap();
    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        authorization: authorization.clone(),
        body: (!bytes.is_empty())
            .then(|| serde_json::from_slice(&bytes).unwrap()),
    });

    match state.password {
        Some(expected) if authorization.as_deref() != Some(expected) => {
            (StatusCode::UNAUTHORIZED, "invalid credential").into_response()
        }
        _ => StatusCode::OK.into_response(),
    }
}

/// Serves a WebSocket at `/ws` that sends `frames` to each client and then
/// closes. Returns the feed URL.
pub async fn spawn_feed(frames: Vec<String>) -> Url {
    let frames = Arc::new(frames);
    let app = Router::new().route("/ws", get(feed)).with_state(frames);
    let addr = serve(app).await;
    Url::parse(&format!("ws://{addr}/ws")).unwrap()
}

async fn feed(
    ws: WebSocketUpgrade,
    State(frames): State<Arc<Vec<String>>>,
) -> Response {
    ws.on_upgrade(move |mut socket| async move {
        for frame in frames.iter() {
            if socket.send(Message::Text(frame.clone().into())).await.is_err() {
                return;
            }
        }
        let _ = socket.send(Message::Close(None)).await;
    })
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A loopback address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
