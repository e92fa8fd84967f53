use mock_service::MockConfig;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Serves the API, Hasura and editor surfaces on one port so the load test can
/// run locally with every `LOCAL_*_URL` pointed here.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    let addr: SocketAddr = std::env::var("MOCK_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:7002".to_string())
        .parse()?;

    let mut config = MockConfig::default();
    if let Ok(token) = std::env::var("AUTH_TOKEN") {
        config.auth_token = token;
    }
    config.skip_rate_limit_secret = std::env::var("SKIP_RATE_LIMIT_SECRET").ok();
    config.rate_limit = std::env::var("MOCK_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<NonZeroU32>().ok());

    mock_service::run(addr, config).await
}
