use crate::types::{Api, Cluster, Id, Server};
use async_trait::async_trait;

#[derive(thiserror::Error, Debug)]
pub enum AdminError {
    #[error("admin api request failed: {0}")]
    Http(#[from] shared::http::HttpError),
    #[error("admin api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("could not encode request: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("invalid {entity}: {reason}")]
    Invalid {
        entity: &'static str,
        reason: &'static str,
    },
    #[error("admin api returned identifier 0 for a new {0}")]
    ZeroId(&'static str),
}

/// The commit half of the administrative API.
///
/// Every create call persists one entity and returns its new identifier; the
/// identifier is never zero.
#[async_trait]
pub trait AdminClient: Send + Sync {
    async fn create_cluster(&self, cluster: &Cluster) -> Result<Id, AdminError>;

    async fn create_server(&self, server: &Server) -> Result<Id, AdminError>;

    async fn create_api(&self, api: &Api) -> Result<Id, AdminError>;

    /// Associates an existing cluster with an existing server.
    async fn add_bind(&self, cluster_id: Id, server_id: Id) -> Result<(), AdminError>;
}
