//! Scriptable stub Telemetry & Actuation Service for integration tests.
//!
//! Serves `GET /metrics` and `POST /stabilize` from bodies the test sets
//! up front, counts requests per endpoint, and can delay the stabilize
//! answer to simulate a long-running run.

use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Scripted responses plus request counters.
pub struct StubService {
    metrics_body: Mutex<Value>,
    metrics_status: AtomicU16,
    metrics_delay: Mutex<Option<Duration>>,
    stabilize_body: Mutex<Value>,
    stabilize_status: AtomicU16,
    stabilize_delay: Mutex<Option<Duration>>,
    metrics_hits: AtomicUsize,
    stabilize_hits: AtomicUsize,
}

impl Default for StubService {
    fn default() -> Self {
        Self {
            metrics_body: Mutex::new(json!({"temperature": 22.0, "humidity": 55.0})),
            metrics_status: AtomicU16::new(200),
            metrics_delay: Mutex::new(None),
            stabilize_body: Mutex::new(json!({"stabilization_needed": false})),
            stabilize_status: AtomicU16::new(200),
            stabilize_delay: Mutex::new(None),
            metrics_hits: AtomicUsize::new(0),
            stabilize_hits: AtomicUsize::new(0),
        }
    }
}

impl StubService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_metrics(&self, temperature: f64, humidity: f64) {
        *self.metrics_body.lock().unwrap() =
            json!({"temperature": temperature, "humidity": humidity});
    }

    pub fn set_metrics_status(&self, status: u16) {
        self.metrics_status.store(status, Ordering::SeqCst);
    }

    pub fn set_stabilize_response(&self, body: Value) {
        *self.stabilize_body.lock().unwrap() = body;
        self.stabilize_status.store(200, Ordering::SeqCst);
    }

    pub fn set_stabilize_failure(&self, status: u16, body: Value) {
        *self.stabilize_body.lock().unwrap() = body;
        self.stabilize_status.store(status, Ordering::SeqCst);
    }

    pub fn set_stabilize_delay(&self, delay: Duration) {
        *self.stabilize_delay.lock().unwrap() = Some(delay);
    }

    pub fn set_metrics_delay(&self, delay: Duration) {
        *self.metrics_delay.lock().unwrap() = Some(delay);
    }

    pub fn metrics_hits(&self) -> usize {
        self.metrics_hits.load(Ordering::SeqCst)
    }

    pub fn stabilize_hits(&self) -> usize {
        self.stabilize_hits.load(Ordering::SeqCst)
    }
}

/// Bind the stub on an ephemeral port and return its base URL.
pub async fn spawn(stub: Arc<StubService>) -> String {
    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/stabilize", post(stabilize_handler))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve stub");
    });

    format!("http://{addr}")
}

async fn metrics_handler(State(stub): State<Arc<StubService>>) -> (StatusCode, Json<Value>) {
    stub.metrics_hits.fetch_add(1, Ordering::SeqCst);
    let delay = *stub.metrics_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(stub.metrics_status.load(Ordering::SeqCst))
        .expect("valid status code");
    let body = stub.metrics_body.lock().unwrap().clone();
    (status, Json(body))
}

async fn stabilize_handler(State(stub): State<Arc<StubService>>) -> (StatusCode, Json<Value>) {
    stub.stabilize_hits.fetch_add(1, Ordering::SeqCst);
    let delay = *stub.stabilize_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    let status = StatusCode::from_u16(stub.stabilize_status.load(Ordering::SeqCst))
        .expect("valid status code");
    let body = stub.stabilize_body.lock().unwrap().clone();
    (status, Json(body))
}
