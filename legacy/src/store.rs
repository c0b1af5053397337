use crate::consul::ConsulStore;
use crate::etcd::EtcdStore;
use crate::model::{Api, Bind, Cluster, Server};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("registry request failed: {0}")]
    Http(#[from] shared::http::HttpError),
    #[error("registry request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid registry address: {0}")]
    InvalidAddress(String),
    #[error("unsupported registry: {0}")]
    UnsupportedScheme(String),
    #[error("invalid base64 payload under {key}: {source}")]
    Base64 {
        key: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("could not decode {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("registry key is not valid UTF-8: {key}")]
    InvalidKey {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("malformed bind key: {0}")]
    MalformedBindKey(String),
    #[error("no registry endpoint configured")]
    NoEndpoints,
    #[error("registry listing timed out after {0:?}")]
    Timeout(Duration),
}

/// Read-only view of the legacy configuration held in a registry.
///
/// Each listing returns every entity of its type, or fails as a whole if a
/// single entry cannot be decoded.
#[async_trait]
pub trait LegacyStore: Send + Sync {
    async fn clusters(&self) -> Result<Vec<Cluster>, StoreError>;
    async fn servers(&self) -> Result<Vec<Server>, StoreError>;
    async fn binds(&self) -> Result<Vec<Bind>, StoreError>;
    async fn apis(&self) -> Result<Vec<Api>, StoreError>;
}

/// Registry directories holding each entity type.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub clusters: String,
    pub servers: String,
    pub binds: String,
    pub apis: String,
}

impl Layout {
    /// Directories are `<prefix>/<kind>` verbatim. A prefix ending in `/`
    /// yields a doubled slash, which is where the legacy proxy wrote its keys.
    pub fn new(prefix: &str) -> Self {
        Layout {
            clusters: format!("{prefix}/clusters"),
            servers: format!("{prefix}/servers"),
            binds: format!("{prefix}/binds"),
            apis: format!("{prefix}/apis"),
        }
    }
}

/// A raw registry entry. `value` is `None` when the key carries no payload.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub value: Option<Vec<u8>>,
}

pub(crate) fn decode_values<T: DeserializeOwned>(
    entries: Vec<KeyValue>,
) -> Result<Vec<T>, StoreError> {
    entries
        .into_iter()
        .map(|entry| {
            let value = entry.value.unwrap_or_default();
            serde_json::from_slice(&value).map_err(|source| StoreError::Decode {
                key: entry.key,
                source,
            })
        })
        .collect()
}

type Connect = fn(&str, &str) -> Result<Box<dyn LegacyStore>, StoreError>;

const BACKENDS: &[(&str, Connect)] = &[
    ("consul", connect_consul as Connect),
    ("etcd", connect_etcd as Connect),
];

fn connect_consul(hosts: &str, prefix: &str) -> Result<Box<dyn LegacyStore>, StoreError> {
    Ok(Box::new(ConsulStore::new(hosts, prefix)?))
}

fn connect_etcd(hosts: &str, prefix: &str) -> Result<Box<dyn LegacyStore>, StoreError> {
    Ok(Box::new(EtcdStore::new(hosts, prefix)?))
}

/// Opens the registry named by `registry_addr`, e.g. `consul://127.0.0.1:8500`
/// or `etcd://10.0.0.1:2379,10.0.0.2:2379`.
pub fn open(registry_addr: &str, prefix: &str) -> Result<Box<dyn LegacyStore>, StoreError> {
    let (scheme, hosts) = parse_registry_addr(registry_addr)?;

    let connect = BACKENDS
        .iter()
        .find(|(name, _)| *name == scheme)
        .map(|(_, connect)| connect)
        .ok_or_else(|| StoreError::UnsupportedScheme(registry_addr.to_string()))?;

    tracing::info!(registry = %scheme, hosts, prefix, "Opening legacy registry");
    connect(hosts, prefix)
}

fn parse_registry_addr(addr: &str) -> Result<(String, &str), StoreError> {
    let invalid = || StoreError::InvalidAddress(addr.to_string());

    let (scheme, rest) = addr.trim().split_once("://").ok_or_else(invalid)?;
    let hosts = rest.split('/').next().unwrap_or_default();
    if scheme.is_empty() || hosts.is_empty() {
        return Err(invalid());
    }

    Ok((scheme.to_ascii_lowercase(), hosts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry_addr() {
        assert_eq!(
            parse_registry_addr("consul://127.0.0.1:8500").unwrap(),
            ("consul".to_string(), "127.0.0.1:8500")
        );
        assert_eq!(
            parse_registry_addr("ETCD://10.0.0.1:2379,10.0.0.2:2379/").unwrap(),
            ("etcd".to_string(), "10.0.0.1:2379,10.0.0.2:2379")
        );
        assert!(matches!(
            parse_registry_addr("127.0.0.1:8500"),
            Err(StoreError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_registry_addr("consul://"),
            Err(StoreError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_open_selects_backend_by_scheme() {
        assert!(open("consul://127.0.0.1:8500", "/gateway").is_ok());
        assert!(open("etcd://127.0.0.1:2379,127.0.0.1:22379", "/gateway").is_ok());
        assert!(matches!(
            open("zookeeper://127.0.0.1:2181", "/gateway"),
            Err(StoreError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn test_layout() {
        let layout = Layout::new("/gateway");
        assert_eq!(layout.clusters, "/gateway/clusters");
        assert_eq!(layout.servers, "/gateway/servers");
        assert_eq!(layout.binds, "/gateway/binds");
        assert_eq!(layout.apis, "/gateway/apis");

        let layout = Layout::new("/gateway/");
        assert_eq!(layout.clusters, "/gateway//clusters");
        assert_eq!(layout.apis, "/gateway//apis");
    }

    #[test]
    fn test_decode_values_fails_as_a_whole() {
        let entries = vec![
            KeyValue {
                key: "gateway/clusters/c1".into(),
                value: Some(br#"{"name": "c1"}"#.to_vec()),
            },
            KeyValue {
                key: "gateway/clusters/c2".into(),
                value: Some(b"{not json".to_vec()),
            },
        ];

        match decode_values::<Cluster>(entries) {
            Err(StoreError::Decode { key, .. }) => assert_eq!(key, "gateway/clusters/c2"),
            other => panic!("expected decode error, got {other:?}"),
        }

        assert!(decode_values::<Cluster>(Vec::new()).unwrap().is_empty());
    }
}
