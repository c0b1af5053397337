//! Entities as the legacy gateway stored them in the registry.
//!
//! Every field is optional on the wire and falls back to its zero value. The
//! legacy writer serialized empty lists as `null`, so list fields accept that too.
use serde::{Deserialize, Deserializer};

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    pub lb_name: String,
    pub external: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Server {
    pub schema: String,
    pub addr: String,
    /// Registered by an external service discovery rather than by an operator.
    pub external: bool,
    pub check_path: String,
    /// Expected health check response body. Empty means only the status code is checked.
    pub check_responsed_body: String,
    /// Seconds between health checks.
    pub check_duration: i64,
    /// Seconds before a health check times out.
    pub check_timeout: i64,
    pub status: i32,
    /// Zero means unlimited.
    #[serde(rename = "maxQPS")]
    pub max_qps: i64,
    pub half_to_open_seconds: i64,
    pub half_traffic_rate: i32,
    pub half_to_open_succeed_rate: i32,
    pub half_to_open_collect_seconds: i64,
    pub open_to_close_failure_rate: i32,
    pub open_to_close_collect_seconds: i64,
}

impl Server {
    /// The breaker thresholds only mean something as a block: all of them must
    /// be positive, otherwise the server has no breaker.
    pub fn has_circuit_breaker(&self) -> bool {
        self.half_to_open_collect_seconds > 0
            && self.open_to_close_collect_seconds > 0
            && self.half_to_open_seconds > 0
            && self.half_to_open_succeed_rate > 0
            && self.half_traffic_rate > 0
            && self.open_to_close_failure_rate > 0
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Bind {
    pub cluster_name: String,
    pub server_addr: String,
}

impl Bind {
    /// Decodes a bind stored as a `<serverAddr>-<clusterName>` key.
    /// Only the first `-` separates the two halves.
    pub fn from_key(key: &str) -> Option<Self> {
        let (server_addr, cluster_name) = key.split_once('-')?;
        Some(Bind {
            cluster_name: cluster_name.to_string(),
            server_addr: server_addr.to_string(),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub rule_type: i32,
    pub expression: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Validation {
    pub attr: String,
    /// 1 reads the attribute from the form body, anything else from the query string.
    pub get_from: i32,
    pub required: bool,
    #[serde(deserialize_with = "nullable")]
    pub rules: Vec<ValidationRule>,
}

/// A dispatch target of an API.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    pub cluster_name: String,
    pub rewrite: String,
    pub attr_name: String,
    #[serde(deserialize_with = "nullable")]
    pub validations: Vec<Validation>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AccessControl {
    #[serde(deserialize_with = "nullable")]
    pub whitelist: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub blacklist: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MockHeader {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Mock {
    pub value: String,
    pub content_type: String,
    #[serde(deserialize_with = "nullable")]
    pub headers: Vec<MockHeader>,
    #[serde(deserialize_with = "nullable")]
    pub cookies: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Api {
    pub name: String,
    pub url: String,
    pub method: String,
    pub domain: String,
    /// 1 published, 2 unpublished.
    pub status: i32,
    pub access_control: Option<AccessControl>,
    pub mock: Option<Mock>,
    #[serde(deserialize_with = "nullable")]
    pub nodes: Vec<Node>,
    pub desc: String,
}
