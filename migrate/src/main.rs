use admin::{AdminClient, DryRunClient, HttpAdminClient};
use clap::Parser;
use migrate::config::LegacyConfig;
use migrate::{MigrateError, Migration};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

/// Migrates a legacy gateway configuration into the new control-plane.
#[derive(Parser, Debug)]
#[command(name = "gateway-migrate")]
struct Cli {
    /// Address of the new gateway's admin API
    #[arg(long = "addr-api", default_value = "127.0.0.1:9092")]
    addr_api: String,

    /// Config file of the legacy gateway proxy
    #[arg(long)]
    old: PathBuf,

    /// Admin API request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Log what would be committed without contacting the admin API
    #[arg(long)]
    dry_run: bool,

    /// Leave cluster/server binds out
    #[arg(long)]
    skip_binds: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();
    shared::logging::init(&cli.log_level);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!(error = %e, "Could not start runtime");
            process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run(cli)) {
        tracing::error!(error = %e, "Migration failed");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), MigrateError> {
    let config = LegacyConfig::from_file(&cli.old)?;
    let store = legacy::open(&config.registry_addr, &config.prefix)?;

    let client: Box<dyn AdminClient> = if cli.dry_run {
        Box::new(DryRunClient::new())
    } else {
        Box::new(HttpAdminClient::new(
            &cli.addr_api,
            Duration::from_secs(cli.timeout),
        )?)
    };

    let summary = Migration::new(&*store, &*client)
        .skip_binds(cli.skip_binds)
        .run()
        .await?;

    tracing::info!(
        clusters = summary.clusters.committed,
        servers = summary.servers.committed,
        binds = summary.binds.committed,
        skipped_binds = summary.binds.skipped,
        apis = summary.apis.committed,
        skipped_nodes = summary.apis.skipped,
        "Migrate complete"
    );
    Ok(())
}
