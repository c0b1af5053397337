use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifier assigned by the control-plane on commit. Never zero.
pub type Id = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadBalance {
    #[default]
    RoundRobin,
    IpHash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Down,
    Up,
}

/// Where a validated request attribute is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    QueryString,
    FormData,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    #[default]
    Regexp,
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub name: String,
    pub load_balance: LoadBalance,
}

/// HTTP health check. Without a `body` only the status code is checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck {
    pub path: String,
    pub body: Option<String>,
    #[serde(with = "secs")]
    pub interval: Duration,
    #[serde(with = "secs")]
    pub timeout: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CircuitBreaker {
    /// Time spent open before probing in half-open state.
    #[serde(with = "secs")]
    pub close_timeout: Duration,
    /// Percentage of traffic let through while half-open.
    pub half_traffic_rate: i32,
    #[serde(with = "secs")]
    pub rate_check_period: Duration,
    /// Failure rate that trips a half-open breaker back to open.
    pub failure_rate_to_close: i32,
    /// Success rate that closes a half-open breaker.
    pub succeed_rate_to_open: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub addr: String,
    pub max_qps: i64,
    pub health_check: Option<HealthCheck>,
    pub circuit_breaker: Option<CircuitBreaker>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub source: Source,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule_type: RuleType,
    pub expression: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Validation {
    pub parameter: Parameter,
    pub required: bool,
    pub rules: Vec<ValidationRule>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DispatchNode {
    pub cluster_id: Id,
    pub attr_name: Option<String>,
    pub url_rewrite: Option<String>,
    pub validations: Vec<Validation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// Response served instead of dispatching.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultValue {
    pub body: String,
    pub headers: Vec<Header>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Api {
    pub name: String,
    pub url_pattern: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    pub status: Option<Status>,
    pub whitelist: Vec<String>,
    pub blacklist: Vec<String>,
    pub default_value: Option<DefaultValue>,
    pub nodes: Vec<DispatchNode>,
}
