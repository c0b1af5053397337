use crate::client::{AdminClient, AdminError};
use crate::types::{
    Api, CircuitBreaker, Cluster, DefaultValue, DispatchNode, Header, HealthCheck, Id,
    LoadBalance, Parameter, RuleType, Server, Status, Validation, ValidationRule,
};
use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct ClusterBuilder {
    name: String,
    load_balance: LoadBalance,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn load_balance(&mut self, load_balance: LoadBalance) -> &mut Self {
        self.load_balance = load_balance;
        self
    }

    pub fn build(&self) -> Result<Cluster, AdminError> {
        if self.name.is_empty() {
            return Err(AdminError::Invalid {
                entity: "cluster",
                reason: "missing name",
            });
        }

        Ok(Cluster {
            name: self.name.clone(),
            load_balance: self.load_balance,
        })
    }

    pub async fn commit(&self, client: &dyn AdminClient) -> Result<Id, AdminError> {
        client.create_cluster(&self.build()?).await
    }
}

#[derive(Clone, Debug)]
pub struct ServerBuilder {
    value: Server,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        ServerBuilder {
            value: Server {
                addr: String::new(),
                max_qps: i64::MAX,
                health_check: None,
                circuit_breaker: None,
            },
        }
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addr(&mut self, addr: impl Into<String>) -> &mut Self {
        self.value.addr = addr.into();
        self
    }

    pub fn max_qps(&mut self, max_qps: i64) -> &mut Self {
        self.value.max_qps = max_qps;
        self
    }

    /// Checks `path` and expects a 200 response.
    pub fn check_http_code(
        &mut self,
        path: impl Into<String>,
        interval: Duration,
        timeout: Duration,
    ) -> &mut Self {
        self.value.health_check = Some(HealthCheck {
            path: path.into(),
            body: None,
            interval,
            timeout,
        });
        self
    }

    /// Checks `path` and expects the response body to equal `body`.
    pub fn check_http_body(
        &mut self,
        path: impl Into<String>,
        body: impl Into<String>,
        interval: Duration,
        timeout: Duration,
    ) -> &mut Self {
        self.value.health_check = Some(HealthCheck {
            path: path.into(),
            body: Some(body.into()),
            interval,
            timeout,
        });
        self
    }

    pub fn no_health_check(&mut self) -> &mut Self {
        self.value.health_check = None;
        self
    }

    fn circuit_breaker(&mut self) -> &mut CircuitBreaker {
        self.value
            .circuit_breaker
            .get_or_insert_with(CircuitBreaker::default)
    }

    pub fn circuit_breaker_half_traffic_rate(&mut self, rate: i32) -> &mut Self {
        self.circuit_breaker().half_traffic_rate = rate;
        self
    }

    pub fn circuit_breaker_check_period(&mut self, period: Duration) -> &mut Self {
        self.circuit_breaker().rate_check_period = period;
        self
    }

    pub fn circuit_breaker_close_to_half_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.circuit_breaker().close_timeout = timeout;
        self
    }

    pub fn circuit_breaker_half_to_close_condition(&mut self, failure_rate: i32) -> &mut Self {
        self.circuit_breaker().failure_rate_to_close = failure_rate;
        self
    }

    pub fn circuit_breaker_half_to_open_condition(&mut self, succeed_rate: i32) -> &mut Self {
        self.circuit_breaker().succeed_rate_to_open = succeed_rate;
        self
    }

    pub fn build(&self) -> Result<Server, AdminError> {
        if self.value.addr.is_empty() {
            return Err(AdminError::Invalid {
                entity: "server",
                reason: "missing addr",
            });
        }

        Ok(self.value.clone())
    }

    pub async fn commit(&self, client: &dyn AdminClient) -> Result<Id, AdminError> {
        client.create_server(&self.build()?).await
    }
}

#[derive(Clone, Debug, Default)]
pub struct ApiBuilder {
    value: Api,
}

impl ApiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.value.name = name.into();
        self
    }

    pub fn match_url_pattern(&mut self, pattern: impl Into<String>) -> &mut Self {
        self.value.url_pattern = pattern.into();
        self
    }

    pub fn match_method(&mut self, method: impl Into<String>) -> &mut Self {
        self.value.method = method.into();
        self
    }

    pub fn match_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.value.domain = domain.into();
        self
    }

    pub fn up(&mut self) -> &mut Self {
        self.value.status = Some(Status::Up);
        self
    }

    pub fn down(&mut self) -> &mut Self {
        self.value.status = Some(Status::Down);
        self
    }

    pub fn add_whitelist<I, S>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value
            .whitelist
            .extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn add_blacklist<I, S>(&mut self, entries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value
            .blacklist
            .extend(entries.into_iter().map(Into::into));
        self
    }

    pub fn default_value(&mut self, body: impl Into<String>) -> &mut Self {
        self.value.default_value.get_or_insert_with(DefaultValue::default).body = body.into();
        self
    }

    /// Headers are appended as given; repeated names are kept.
    pub fn add_default_value_header(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.value
            .default_value
            .get_or_insert_with(DefaultValue::default)
            .headers
            .push(Header {
                name: name.into(),
                value: value.into(),
            });
        self
    }

    pub fn add_dispatch_node(&mut self, cluster_id: Id) -> &mut Self {
        self.value.nodes.push(DispatchNode {
            cluster_id,
            attr_name: None,
            url_rewrite: None,
            validations: Vec::new(),
        });
        self
    }

    // The node settings below address the most recently added node for the cluster
    // and are ignored when there is none.
    fn node(&mut self, cluster_id: Id) -> Option<&mut DispatchNode> {
        self.value
            .nodes
            .iter_mut()
            .rev()
            .find(|node| node.cluster_id == cluster_id)
    }

    pub fn dispatch_node_value_attr_name(
        &mut self,
        cluster_id: Id,
        attr_name: impl Into<String>,
    ) -> &mut Self {
        if let Some(node) = self.node(cluster_id) {
            node.attr_name = Some(attr_name.into());
        }
        self
    }

    pub fn dispatch_node_url_rewrite(
        &mut self,
        cluster_id: Id,
        rewrite: impl Into<String>,
    ) -> &mut Self {
        if let Some(node) = self.node(cluster_id) {
            node.url_rewrite = Some(rewrite.into());
        }
        self
    }

    /// Registers a validation of `parameter` against a single regular expression.
    pub fn add_dispatch_node_validation(
        &mut self,
        cluster_id: Id,
        parameter: Parameter,
        expression: impl Into<String>,
        required: bool,
    ) -> &mut Self {
        if let Some(node) = self.node(cluster_id) {
            node.validations.push(Validation {
                parameter,
                required,
                rules: vec![ValidationRule {
                    rule_type: RuleType::Regexp,
                    expression: expression.into(),
                }],
            });
        }
        self
    }

    pub fn build(&self) -> Result<Api, AdminError> {
        if self.value.name.is_empty() {
            return Err(AdminError::Invalid {
                entity: "api",
                reason: "missing name",
            });
        }

        Ok(self.value.clone())
    }

    pub async fn commit(&self, client: &dyn AdminClient) -> Result<Id, AdminError> {
        client.create_api(&self.build()?).await
    }
}
