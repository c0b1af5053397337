use crate::model::{Api, Bind, Cluster, Server};
use crate::store::{KeyValue, Layout, LegacyStore, StoreError, decode_values};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use shared::http::{base_url, build_client, ensure_success};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ConsulPair {
    key: String,
    value: Option<String>,
}

/// Legacy store backed by the consul KV HTTP API.
///
/// Binds are the odd one out: consul keeps them as bare keys named
/// `<serverAddr>-<clusterName>` with no value.
pub struct ConsulStore {
    client: reqwest::Client,
    base_url: Url,
    layout: Layout,
}

impl ConsulStore {
    pub fn new(addr: &str, prefix: &str) -> Result<Self, StoreError> {
        // consul keys never start with a slash
        let prefix = prefix.strip_prefix('/').unwrap_or(prefix);

        Ok(ConsulStore {
            client: build_client(None)?,
            base_url: base_url(addr)?,
            layout: Layout::new(prefix),
        })
    }

    async fn list(&self, dir: &str) -> Result<Vec<KeyValue>, StoreError> {
        let mut url = self.base_url.join(&format!("v1/kv/{dir}"))?;
        url.query_pairs_mut().append_pair("recurse", "true");

        let response = self.client.get(url).send().await?;
        // consul answers 404 when nothing lives under the prefix
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        let pairs: Vec<ConsulPair> = ensure_success(response).await?.json().await?;
        tracing::debug!(dir, keys = pairs.len(), "Listed consul keys");

        pairs
            .into_iter()
            .filter(|pair| !(pair.value.is_none() && pair.key.ends_with('/')))
            .map(|pair| {
                let value = match pair.value {
                    Some(encoded) => Some(STANDARD.decode(encoded).map_err(|source| {
                        StoreError::Base64 {
                            key: pair.key.clone(),
                            source,
                        }
                    })?),
                    None => None,
                };

                Ok(KeyValue {
                    key: pair.key,
                    value,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LegacyStore for ConsulStore {
    async fn clusters(&self) -> Result<Vec<Cluster>, StoreError> {
        decode_values(self.list(&self.layout.clusters).await?)
    }

    async fn servers(&self) -> Result<Vec<Server>, StoreError> {
        decode_values(self.list(&self.layout.servers).await?)
    }

    async fn binds(&self) -> Result<Vec<Bind>, StoreError> {
        let dir = format!("{}/", self.layout.binds);

        self.list(&self.layout.binds)
            .await?
            .into_iter()
            .map(|entry| {
                let key = entry.key.strip_prefix(&dir).unwrap_or(&entry.key);
                Bind::from_key(key).ok_or_else(|| StoreError::MalformedBindKey(entry.key.clone()))
            })
            .collect()
    }

    async fn apis(&self) -> Result<Vec<Api>, StoreError> {
        decode_values(self.list(&self.layout.apis).await?)
    }
}
