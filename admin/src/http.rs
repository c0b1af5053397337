use crate::client::{AdminClient, AdminError};
use crate::types::{Api, Cluster, Id, Server};
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use shared::http::{base_url, build_client, ensure_success};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct Created {
    id: Id,
}

#[derive(Serialize)]
struct BindRequest {
    cluster_id: Id,
    server_id: Id,
}

/// Talks JSON to the administrative endpoint of the new control-plane.
pub struct HttpAdminClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpAdminClient {
    pub fn new(addr: &str, timeout: Duration) -> Result<Self, AdminError> {
        Ok(HttpAdminClient {
            client: build_client(Some(timeout))?,
            base_url: base_url(addr)?,
        })
    }

    async fn create<T: Serialize + Sync>(
        &self,
        entity: &'static str,
        path: &str,
        body: &T,
    ) -> Result<Id, AdminError> {
        let url = self.base_url.join(path)?;
        let response = self.client.post(url).json(body).send().await?;
        let created: Created = ensure_success(response).await?.json().await?;

        if created.id == 0 {
            return Err(AdminError::ZeroId(entity));
        }

        tracing::debug!(entity, id = created.id, "Created entity");
        Ok(created.id)
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Id, AdminError> {
        self.create("cluster", "v1/clusters", cluster).await
    }

    async fn create_server(&self, server: &Server) -> Result<Id, AdminError> {
        self.create("server", "v1/servers", server).await
    }

    async fn create_api(&self, api: &Api) -> Result<Id, AdminError> {
        self.create("api", "v1/apis", api).await
    }

    async fn add_bind(&self, cluster_id: Id, server_id: Id) -> Result<(), AdminError> {
        let url = self.base_url.join("v1/binds")?;
        let body = BindRequest {
            cluster_id,
            server_id,
        };

        let response = self.client.put(url).json(&body).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}
