use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use shared::testutils::TestServer;

#[derive(Clone, Copy)]
enum Behavior {
    Sequential,
    AssignZero,
    Fail,
}

struct Inner {
    behavior: Behavior,
    next_id: AtomicU64,
    requests: Mutex<Vec<(String, Value)>>,
}

/// Fake administrative API recording every request it receives.
#[derive(Clone)]
pub struct MockAdmin {
    inner: Arc<Inner>,
}

impl MockAdmin {
    fn with_behavior(behavior: Behavior) -> Self {
        MockAdmin {
            inner: Arc::new(Inner {
                behavior,
                next_id: AtomicU64::new(1),
                requests: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn new() -> Self {
        Self::with_behavior(Behavior::Sequential)
    }

    pub fn assigning_zero() -> Self {
        Self::with_behavior(Behavior::AssignZero)
    }

    pub fn failing() -> Self {
        Self::with_behavior(Behavior::Fail)
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(handle).with_state(self.clone())
    }

    /// `("METHOD /path", body)` in arrival order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.inner.requests.lock().unwrap().clone()
    }
}

async fn handle(
    State(mock): State<MockAdmin>,
    method: Method,
    uri: Uri,
    Json(body): Json<Value>,
) -> Response {
    mock.inner
        .requests
        .lock()
        .unwrap()
        .push((format!("{method} {}", uri.path()), body));

    match mock.inner.behavior {
        Behavior::Fail => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ if method == Method::PUT => StatusCode::OK.into_response(),
        Behavior::AssignZero => Json(json!({"id": 0})).into_response(),
        Behavior::Sequential => {
            let id = mock.inner.next_id.fetch_add(1, Ordering::Relaxed);
            Json(json!({"id": id})).into_response()
        }
    }
}
