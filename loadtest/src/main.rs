use anyhow::{Context, Result};
use clap::Parser;
use planx_loadtest::{cli::LoadTestCli, prelude::*, workloads};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_LOG_FILTER: &str = "planx_loadtest=info,balter=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LoadTestCli::parse();

    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env().context("Invalid load test configuration")?;
    info!("Targeting {} environment", config.hosts.environment);

    install(&cli, &config)?;

    let stats = workloads::run(cli.workload, cli.pacing()).await;
    info!(
        concurrency = stats.concurrency,
        goal_tps = stats.goal_tps,
        actual_tps = stats.actual_tps,
        error_rate = stats.error_rate,
        latency_p50 = ?stats.latency_p50,
        latency_p90 = ?stats.latency_p90,
        latency_p99 = ?stats.latency_p99,
        "{} workload complete",
        cli.workload.name()
    );

    Ok(())
}

fn install(cli: &LoadTestCli, config: &Config) -> Result<()> {
    let secret = config.skip_rate_limit_secret.as_deref();

    match cli.workload {
        WorkloadKind::Splash => {
            let base = WorkloadBase::new(config.hosts.get(Target::Editor), secret)?;
            SplashWorkload::new(base).install()?;
        }
        WorkloadKind::Upload => {
            let token = config.auth_token()?;
            let dir = cli.fixtures.as_ref().unwrap_or(&config.fixture_dir);
            let sampler = FileSampler::scan(dir)
                .with_context(|| format!("Unusable fixture directory {}", dir.display()))?;
            let base = WorkloadBase::new(config.hosts.get(Target::Api), secret)?;
            UploadWorkload::new(base, token, sampler).install()?;
        }
        WorkloadKind::Graphql => {
            let base = WorkloadBase::new(config.hosts.get(Target::Hasura), secret)?;
            GraphqlWorkload::new(base, &config.graphql_path, cli.think_time()).install()?;
        }
    }

    Ok(())
}
