use crate::model::{Api, Bind, Cluster, Server};
use crate::store::{KeyValue, Layout, LegacyStore, StoreError, decode_values};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use shared::http::{base_url, build_client, ensure_success};
use std::time::Duration;

/// Upper bound for a single listing, across every endpoint tried.
pub const LIST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct RangeRequest {
    key: String,
    range_end: String,
}

#[derive(Deserialize)]
struct RangeResponse {
    // omitted by etcd when the range is empty
    #[serde(default)]
    kvs: Vec<RangeKeyValue>,
}

#[derive(Deserialize)]
struct RangeKeyValue {
    key: String,
    #[serde(default)]
    value: String,
}

/// Legacy store backed by the etcd v3 JSON gateway.
pub struct EtcdStore {
    client: reqwest::Client,
    endpoints: Vec<Url>,
    layout: Layout,
}

impl EtcdStore {
    /// `addrs` is a comma separated list of `host:port` endpoints.
    pub fn new(addrs: &str, prefix: &str) -> Result<Self, StoreError> {
        let endpoints = addrs
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(|addr| base_url(&format!("http://{addr}")))
            .collect::<Result<Vec<_>, _>>()?;

        if endpoints.is_empty() {
            return Err(StoreError::NoEndpoints);
        }

        Ok(EtcdStore {
            client: build_client(None)?,
            endpoints,
            layout: Layout::new(prefix),
        })
    }

    async fn list(&self, dir: &str) -> Result<Vec<KeyValue>, StoreError> {
        tokio::time::timeout(LIST_TIMEOUT, self.list_prefix(dir))
            .await
            .map_err(|_| StoreError::Timeout(LIST_TIMEOUT))?
    }

    async fn list_prefix(&self, dir: &str) -> Result<Vec<KeyValue>, StoreError> {
        let request = RangeRequest {
            key: STANDARD.encode(dir),
            range_end: STANDARD.encode(prefix_end(dir.as_bytes())),
        };

        // Only unreachable endpoints are skipped. An endpoint that answers
        // with an error settles the listing.
        let mut last_error = StoreError::NoEndpoints;
        for endpoint in &self.endpoints {
            match self.range(endpoint, &request).await {
                Ok(response) => {
                    tracing::debug!(dir, %endpoint, keys = response.kvs.len(), "Listed etcd keys");
                    return response.kvs.into_iter().map(decode_entry).collect();
                }
                Err(StoreError::Request(e)) if e.is_connect() => {
                    tracing::warn!(%endpoint, error = %e, "etcd endpoint unreachable");
                    last_error = StoreError::Request(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }

    async fn range(
        &self,
        endpoint: &Url,
        request: &RangeRequest,
    ) -> Result<RangeResponse, StoreError> {
        let url = endpoint.join("v3/kv/range")?;
        let response = self.client.post(url).json(request).send().await?;
        let response = ensure_success(response).await?;

        Ok(response.json().await?)
    }
}

fn decode_entry(entry: RangeKeyValue) -> Result<KeyValue, StoreError> {
    let decode = |field: &str| {
        STANDARD.decode(field).map_err(|source| StoreError::Base64 {
            key: entry.key.clone(),
            source,
        })
    };

    let key = String::from_utf8(decode(&entry.key)?).map_err(|source| StoreError::InvalidKey {
        key: entry.key.clone(),
        source,
    })?;
    let value = decode(&entry.value)?;

    Ok(KeyValue {
        key,
        value: Some(value),
    })
}

/// Smallest key greater than every key starting with `prefix`.
fn prefix_end(prefix: &[u8]) -> Vec<u8> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < 0xff {
            end.push(last + 1);
            return end;
        }
    }

    // all 0xff: range to the end of the keyspace
    vec![0]
}

#[async_trait]
impl LegacyStore for EtcdStore {
    async fn clusters(&self) -> Result<Vec<Cluster>, StoreError> {
        decode_values(self.list(&self.layout.clusters).await?)
    }

    async fn servers(&self) -> Result<Vec<Server>, StoreError> {
        decode_values(self.list(&self.layout.servers).await?)
    }

    async fn binds(&self) -> Result<Vec<Bind>, StoreError> {
        decode_values(self.list(&self.layout.binds).await?)
    }

    async fn apis(&self) -> Result<Vec<Api>, StoreError> {
        decode_values(self.list(&self.layout.apis).await?)
    }
}
