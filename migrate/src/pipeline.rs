//! The migration itself: clusters, servers, binds and APIs, in that order.
//!
//! Clusters and servers go first since binds and APIs refer to them by their
//! legacy names. A bind or dispatch node whose reference can't be resolved is
//! dropped with a warning; every other failure aborts the run.
use crate::errors::MigrateError;
use crate::ids::{IdMap, IdTables};
use admin::types::{LoadBalance, Parameter, Source};
use admin::{AdminClient, ApiBuilder, ClusterBuilder, ServerBuilder};
use legacy::LegacyStore;
use legacy::model::{Api, Cluster, Server};
use std::time::Duration;

const STATUS_UP: i32 = 1;
const STATUS_DOWN: i32 = 2;
const GET_FROM_FORM: i32 = 1;

/// Counts for one phase. `skipped` covers binds and dispatch nodes left out
/// for a missing cluster or server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseReport {
    pub loaded: usize,
    pub committed: usize,
    pub skipped: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub clusters: PhaseReport,
    pub servers: PhaseReport,
    pub binds: PhaseReport,
    pub apis: PhaseReport,
}

pub struct Migration<'a> {
    store: &'a dyn LegacyStore,
    client: &'a dyn AdminClient,
    skip_binds: bool,
}

impl<'a> Migration<'a> {
    pub fn new(store: &'a dyn LegacyStore, client: &'a dyn AdminClient) -> Self {
        Migration {
            store,
            client,
            skip_binds: false,
        }
    }

    /// Leaves the bind phase out, as the legacy migration tool did.
    pub fn skip_binds(mut self, skip: bool) -> Self {
        self.skip_binds = skip;
        self
    }

    pub async fn run(&self) -> Result<Summary, MigrateError> {
        let (clusters, cluster_report) = self.migrate_clusters().await?;
        let (servers, server_report) = self.migrate_servers().await?;
        let ids = IdTables { clusters, servers };

        let bind_report = if self.skip_binds {
            tracing::info!("Skipping binds");
            PhaseReport::default()
        } else {
            self.migrate_binds(&ids).await?
        };

        let api_report = self.migrate_apis(&ids.clusters).await?;

        Ok(Summary {
            clusters: cluster_report,
            servers: server_report,
            binds: bind_report,
            apis: api_report,
        })
    }

    pub async fn migrate_clusters(&self) -> Result<(IdMap, PhaseReport), MigrateError> {
        let olds = self
            .store
            .clusters()
            .await
            .map_err(|source| MigrateError::Load {
                kind: "clusters",
                source,
            })?;

        tracing::info!("Migrate clusters started");
        tracing::info!(count = olds.len(), "Loaded legacy clusters");

        let mut ids = IdMap::new();
        let mut report = PhaseReport {
            loaded: olds.len(),
            ..Default::default()
        };

        for cluster in olds {
            let id = cluster_builder(&cluster)
                .commit(self.client)
                .await
                .map_err(|source| MigrateError::Cluster {
                    cluster: Box::new(cluster.clone()),
                    source,
                })?;

            ids.record(cluster.name, id);
            report.committed += 1;
        }

        tracing::info!(committed = report.committed, "Migrate clusters completed");
        Ok((ids, report))
    }

    pub async fn migrate_servers(&self) -> Result<(IdMap, PhaseReport), MigrateError> {
        let olds = self
            .store
            .servers()
            .await
            .map_err(|source| MigrateError::Load {
                kind: "servers",
                source,
            })?;

        tracing::info!("Migrate servers started");
        tracing::info!(count = olds.len(), "Loaded legacy servers");

        let mut ids = IdMap::new();
        let mut report = PhaseReport {
            loaded: olds.len(),
            ..Default::default()
        };

        for server in olds {
            let id = server_builder(&server)
                .commit(self.client)
                .await
                .map_err(|source| MigrateError::Server {
                    server: Box::new(server.clone()),
                    source,
                })?;

            ids.record(server.addr, id);
            report.committed += 1;
        }

        tracing::info!(committed = report.committed, "Migrate servers completed");
        Ok((ids, report))
    }

    pub async fn migrate_binds(&self, ids: &IdTables) -> Result<PhaseReport, MigrateError> {
        let olds = self
            .store
            .binds()
            .await
            .map_err(|source| MigrateError::Load {
                kind: "binds",
                source,
            })?;

        tracing::info!("Migrate binds started");
        tracing::info!(count = olds.len(), "Loaded legacy binds");

        let mut report = PhaseReport {
            loaded: olds.len(),
            ..Default::default()
        };

        for bind in olds {
            let cluster_id = ids.clusters.resolve(&bind.cluster_name);
            let server_id = ids.servers.resolve(&bind.server_addr);

            let (Some(cluster_id), Some(server_id)) = (cluster_id, server_id) else {
                tracing::warn!(?bind, "Skipping legacy bind, missing cluster or server");
                report.skipped += 1;
                continue;
            };

            self.client
                .add_bind(cluster_id, server_id)
                .await
                .map_err(|source| MigrateError::Bind {
                    bind: bind.clone(),
                    source,
                })?;
            report.committed += 1;
        }

        tracing::info!(
            committed = report.committed,
            skipped = report.skipped,
            "Migrate binds completed"
        );
        Ok(report)
    }

    pub async fn migrate_apis(&self, clusters: &IdMap) -> Result<PhaseReport, MigrateError> {
        let olds = self
            .store
            .apis()
            .await
            .map_err(|source| MigrateError::Load {
                kind: "apis",
                source,
            })?;

        tracing::info!("Migrate apis started");
        tracing::info!(count = olds.len(), "Loaded legacy apis");

        let mut report = PhaseReport {
            loaded: olds.len(),
            ..Default::default()
        };

        for api in olds {
            let (builder, dropped) = api_builder(&api, clusters);
            report.skipped += dropped;

            builder
                .commit(self.client)
                .await
                .map_err(|source| MigrateError::Api {
                    api: Box::new(api.clone()),
                    source,
                })?;
            report.committed += 1;
        }

        tracing::info!(
            committed = report.committed,
            skipped_nodes = report.skipped,
            "Migrate apis completed"
        );
        Ok(report)
    }
}

fn seconds(value: i64) -> Duration {
    Duration::from_secs(u64::try_from(value).unwrap_or_default())
}

/// The legacy load balancer is not carried over; every cluster is round robin.
pub fn cluster_builder(old: &Cluster) -> ClusterBuilder {
    let mut builder = ClusterBuilder::new();
    builder.name(&old.name).load_balance(LoadBalance::RoundRobin);
    builder
}

pub fn server_builder(old: &Server) -> ServerBuilder {
    let mut builder = ServerBuilder::new();
    builder.addr(&old.addr);

    if old.max_qps == 0 {
        builder.max_qps(i64::MAX);
    } else {
        builder.max_qps(old.max_qps);
    }

    if !old.check_path.is_empty() {
        let interval = seconds(old.check_duration);
        let timeout = seconds(old.check_timeout);
        if old.check_responsed_body.is_empty() {
            builder.check_http_code(&old.check_path, interval, timeout);
        } else {
            builder.check_http_body(&old.check_path, &old.check_responsed_body, interval, timeout);
        }
    }

    // must come after the checks above so that it wins
    if old.external {
        builder.no_health_check();
    }

    if old.has_circuit_breaker() {
        builder
            .circuit_breaker_half_traffic_rate(old.half_traffic_rate)
            .circuit_breaker_check_period(seconds(old.half_to_open_collect_seconds))
            .circuit_breaker_close_to_half_timeout(seconds(old.half_to_open_seconds))
            .circuit_breaker_half_to_close_condition(old.open_to_close_failure_rate)
            .circuit_breaker_half_to_open_condition(old.half_to_open_succeed_rate);
    }

    builder
}

/// Returns the builder and the number of dispatch nodes dropped because their
/// cluster was never migrated.
pub fn api_builder(old: &Api, clusters: &IdMap) -> (ApiBuilder, usize) {
    let mut builder = ApiBuilder::new();
    builder
        .name(&old.name)
        .match_url_pattern(&old.url)
        .match_method(&old.method)
        .match_domain(&old.domain);

    // any other status is left unset
    if old.status == STATUS_UP {
        builder.up();
    } else if old.status == STATUS_DOWN {
        builder.down();
    }

    if let Some(access_control) = &old.access_control {
        builder
            .add_whitelist(&access_control.whitelist)
            .add_blacklist(&access_control.blacklist);
    }

    if let Some(mock) = &old.mock {
        builder.default_value(&mock.value);
        for header in &mock.headers {
            builder.add_default_value_header(&header.name, &header.value);
        }
        builder.add_default_value_header("Content-Type", &mock.content_type);
    }

    let mut dropped = 0;
    for node in &old.nodes {
        let Some(cluster_id) = clusters.resolve(&node.cluster_name) else {
            tracing::warn!(
                api = %old.name,
                ?node,
                "Skipping dispatch node of legacy api, missing cluster"
            );
            dropped += 1;
            continue;
        };

        builder.add_dispatch_node(cluster_id);

        if !node.attr_name.is_empty() {
            builder.dispatch_node_value_attr_name(cluster_id, &node.attr_name);
        }

        if !node.rewrite.is_empty() {
            builder.dispatch_node_url_rewrite(cluster_id, &node.rewrite);
        }

        for validation in &node.validations {
            let source = if validation.get_from == GET_FROM_FORM {
                Source::FormData
            } else {
                Source::QueryString
            };
            let parameter = Parameter {
                name: validation.attr.clone(),
                source,
            };

            // one registered validation per rule expression
            for rule in &validation.rules {
                builder.add_dispatch_node_validation(
                    cluster_id,
                    parameter.clone(),
                    &rule.expression,
                    validation.required,
                );
            }
        }
    }

    (builder, dropped)
}
