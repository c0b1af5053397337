use admin::types::{Api, Cluster, Server};
use admin::{AdminClient, AdminError, Id};
use async_trait::async_trait;
use legacy::model;
use legacy::{LegacyStore, StoreError};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// In-memory legacy registry.
#[derive(Default)]
pub struct FakeStore {
    pub clusters: Vec<model::Cluster>,
    pub servers: Vec<model::Server>,
    pub binds: Vec<model::Bind>,
    pub apis: Vec<model::Api>,
    /// Makes the api listing fail.
    pub broken_apis: bool,
}

#[async_trait]
impl LegacyStore for FakeStore {
    async fn clusters(&self) -> Result<Vec<model::Cluster>, StoreError> {
        Ok(self.clusters.clone())
    }

    async fn servers(&self) -> Result<Vec<model::Server>, StoreError> {
        Ok(self.servers.clone())
    }

    async fn binds(&self) -> Result<Vec<model::Bind>, StoreError> {
        Ok(self.binds.clone())
    }

    async fn apis(&self) -> Result<Vec<model::Api>, StoreError> {
        if self.broken_apis {
            return Err(StoreError::Timeout(Duration::from_secs(30)));
        }
        Ok(self.apis.clone())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Commit {
    Cluster(Id, Cluster),
    Server(Id, Server),
    Bind(Id, Id),
    Api(Id, Api),
}

/// Admin client that keeps every commit in memory, assigning ids from 1.
pub struct RecordingClient {
    next_id: AtomicU64,
    commits: Mutex<Vec<Commit>>,
    reject_servers: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        RecordingClient {
            next_id: AtomicU64::new(1),
            commits: Mutex::new(Vec::new()),
            reject_servers: false,
        }
    }

    pub fn rejecting_servers() -> Self {
        RecordingClient {
            reject_servers: true,
            ..Self::new()
        }
    }

    pub fn commits(&self) -> Vec<Commit> {
        self.commits.lock().unwrap().clone()
    }

    pub fn clusters(&self) -> Vec<Cluster> {
        self.commits()
            .into_iter()
            .filter_map(|c| match c {
                Commit::Cluster(_, cluster) => Some(cluster),
                _ => None,
            })
            .collect()
    }

    pub fn servers(&self) -> Vec<Server> {
        self.commits()
            .into_iter()
            .filter_map(|c| match c {
                Commit::Server(_, server) => Some(server),
                _ => None,
            })
            .collect()
    }

    pub fn binds(&self) -> Vec<(Id, Id)> {
        self.commits()
            .into_iter()
            .filter_map(|c| match c {
                Commit::Bind(cluster, server) => Some((cluster, server)),
                _ => None,
            })
            .collect()
    }

    pub fn apis(&self) -> Vec<Api> {
        self.commits()
            .into_iter()
            .filter_map(|c| match c {
                Commit::Api(_, api) => Some(api),
                _ => None,
            })
            .collect()
    }

    fn record(&self, commit: impl FnOnce(Id) -> Commit) -> Id {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.commits.lock().unwrap().push(commit(id));
        id
    }
}

#[async_trait]
impl AdminClient for RecordingClient {
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Id, AdminError> {
        Ok(self.record(|id| Commit::Cluster(id, cluster.clone())))
    }

    async fn create_server(&self, server: &Server) -> Result<Id, AdminError> {
        if self.reject_servers {
            return Err(AdminError::Invalid {
                entity: "server",
                reason: "rejected",
            });
        }
        Ok(self.record(|id| Commit::Server(id, server.clone())))
    }

    async fn create_api(&self, api: &Api) -> Result<Id, AdminError> {
        Ok(self.record(|id| Commit::Api(id, api.clone())))
    }

    async fn add_bind(&self, cluster_id: Id, server_id: Id) -> Result<(), AdminError> {
        self.commits
            .lock()
            .unwrap()
            .push(Commit::Bind(cluster_id, server_id));
        Ok(())
    }
}
