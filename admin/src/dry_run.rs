use crate::client::{AdminClient, AdminError};
use crate::types::{Api, Cluster, Id, Server};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Logs what would be committed and hands out sequential identifiers
/// starting at 1, without contacting any control-plane.
pub struct DryRunClient {
    next_id: AtomicU64,
}

impl Default for DryRunClient {
    fn default() -> Self {
        DryRunClient {
            next_id: AtomicU64::new(1),
        }
    }
}

impl DryRunClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign<T: Serialize>(&self, entity: &'static str, value: &T) -> Result<Id, AdminError> {
        let body = serde_json::to_string(value)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::info!(entity, id, %body, "Dry run, not committed");
        Ok(id)
    }
}

#[async_trait]
impl AdminClient for DryRunClient {
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Id, AdminError> {
        self.assign("cluster", cluster)
    }

    async fn create_server(&self, server: &Server) -> Result<Id, AdminError> {
        self.assign("server", server)
    }

    async fn create_api(&self, api: &Api) -> Result<Id, AdminError> {
        self.assign("api", api)
    }

    async fn add_bind(&self, cluster_id: Id, server_id: Id) -> Result<(), AdminError> {
        tracing::info!(cluster_id, server_id, "Dry run, bind not committed");
        Ok(())
    }
}
