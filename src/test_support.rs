//! Local stand-in for the OpenWeather API used by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;

#[derive(Default)]
struct MockState {
    calls: AtomicUsize,
    failing: AtomicBool,
    requests: Mutex<Vec<String>>,
}

/// Mock upstream that answers every path with `{"path": .., "call": n}`
///
/// `n` increments per request, so two identical payloads prove the second
/// one came from cache. A `lat` that is not a number gets a 400
/// `wrong latitude` reply.
pub struct MockUpstream {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .fallback(respond)
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Make every following request answer 401 like a bad API key
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Path and query of every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn respond(State(state): State<Arc<MockState>>, uri: Uri) -> Response {
    let call = state.calls.fetch_add(1, Ordering::SeqCst) + 1;
    state.requests.lock().unwrap().push(uri.to_string());

    if state.failing.load(Ordering::SeqCst) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"cod": 401, "message": "Invalid API key"})),
        )
            .into_response();
    }

    // OpenWeather's answer for coordinates it cannot parse
    let bad_lat = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.strip_prefix("lat="))
        .any(|lat| lat.parse::<f64>().is_err());
    if bad_lat {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"cod": "400", "message": "wrong latitude"})),
        )
            .into_response();
    }

    Json(json!({"path": uri.path(), "call": call})).into_response()
}

/// Address that refuses connections
pub async fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
