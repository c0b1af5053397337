use crate::config::ConfigError;
use admin::AdminError;
use legacy::StoreError;
use legacy::model::{Api, Bind, Cluster, Server};

/// Every variant is fatal to the run. Commit failures carry the legacy entity
/// being migrated.
#[derive(thiserror::Error, Debug)]
pub enum MigrateError {
    #[error("could not load legacy config: {0}")]
    Config(#[from] ConfigError),

    #[error("could not open legacy registry: {0}")]
    Registry(#[from] StoreError),

    #[error("could not create admin client: {0}")]
    Client(#[from] AdminError),

    #[error("could not load legacy {kind}: {source}")]
    Load {
        kind: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("migrate legacy cluster {cluster:?} failed: {source}")]
    Cluster {
        cluster: Box<Cluster>,
        #[source]
        source: AdminError,
    },

    #[error("migrate legacy server {server:?} failed: {source}")]
    Server {
        server: Box<Server>,
        #[source]
        source: AdminError,
    },

    #[error("migrate legacy bind {bind:?} failed: {source}")]
    Bind {
        bind: Bind,
        #[source]
        source: AdminError,
    },

    #[error("migrate legacy api {api:?} failed: {source}")]
    Api {
        api: Box<Api>,
        #[source]
        source: AdminError,
    },
}
