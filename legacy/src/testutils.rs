use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub use shared::testutils::TestServer;

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

type Entries = Arc<Vec<(String, Option<String>)>>;

fn entries(entries: &[(&str, Option<&str>)]) -> Entries {
    Arc::new(
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
            .collect(),
    )
}

/// Mimics `GET /v1/kv/<prefix>?recurse=true` of consul.
pub fn consul_router(kvs: &[(&str, Option<&str>)]) -> Router {
    Router::new()
        .route("/v1/kv/{*prefix}", get(consul_list))
        .with_state(entries(kvs))
}

async fn consul_list(State(entries): State<Entries>, Path(prefix): Path<String>) -> Response {
    let pairs: Vec<_> = entries
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, value)| {
            json!({
                "Key": key,
                "Flags": 0,
                "Value": value.as_ref().map(|v| STANDARD.encode(v)),
            })
        })
        .collect();

    if pairs.is_empty() {
        return StatusCode::NOT_FOUND.into_response();
    }

    Json(pairs).into_response()
}

/// Mimics `POST /v3/kv/range` of the etcd JSON gateway for prefix ranges.
pub fn etcd_router(kvs: &[(&str, &str)]) -> Router {
    let kvs: Vec<(&str, Option<&str>)> = kvs.iter().map(|(k, v)| (*k, Some(*v))).collect();
    Router::new()
        .route("/v3/kv/range", post(etcd_range))
        .with_state(entries(&kvs))
}

/// An etcd gateway that accepts range requests and never answers them.
pub fn hanging_etcd_router() -> Router {
    Router::new().route(
        "/v3/kv/range",
        post(|| std::future::pending::<StatusCode>()),
    )
}

#[derive(Deserialize)]
struct RangeBody {
    key: String,
}

async fn etcd_range(State(entries): State<Entries>, Json(body): Json<RangeBody>) -> Response {
    let prefix = String::from_utf8(STANDARD.decode(body.key).unwrap()).unwrap();
    let kvs: Vec<_> = entries
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .map(|(key, value)| {
            json!({
                "key": STANDARD.encode(key),
                "value": STANDARD.encode(value.as_deref().unwrap_or_default()),
            })
        })
        .collect();

    // etcd leaves out `kvs` for an empty range
    if kvs.is_empty() {
        return Json(json!({"header": {}})).into_response();
    }

    let count = kvs.len().to_string();
    Json(json!({"header": {}, "kvs": kvs, "count": count})).into_response()
}
