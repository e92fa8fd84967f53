use utils::*;

use mock_service::MockConfig;
use planx_loadtest::prelude::*;
use planx_loadtest::workloads::splash::fetch_splash;
use planx_loadtest::WorkloadError;
use reqwest::Client;
use std::num::NonZeroU32;

#[tokio::test]
#[ntest::timeout(10_000)]
async fn fetches_splash_page() {
    let mock = init(mock_config()).await;
    let workload = SplashWorkload::new(base_for(&mock, None).unwrap());

    fetch_splash(&workload).await.unwrap();
    assert_eq!(mock.state.requests(), 1);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn non_success_status_is_a_failure() {
    let mock = init(mock_config()).await;
    let base = WorkloadBase::with_client(Client::new(), &format!("{}/missing", mock.url()));
    let workload = SplashWorkload::new(base);

    let err = fetch_splash(&workload).await.unwrap_err();
    assert!(matches!(err, WorkloadError::UnexpectedStatus { actual: 404, .. }));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn rate_limit_secret_bypasses_limiter() {
    let mock = init(MockConfig {
        skip_rate_limit_secret: Some(SECRET.to_string()),
        rate_limit: NonZeroU32::new(1),
        ..mock_config()
    })
    .await;

    let bypassing = SplashWorkload::new(base_for(&mock, Some(SECRET)).unwrap());
    for _ in 0..5 {
        fetch_splash(&bypassing).await.unwrap();
    }

    let limited = SplashWorkload::new(base_for(&mock, None).unwrap());
    let mut results = vec![];
    for _ in 0..5 {
        results.push(fetch_splash(&limited).await);
    }

    assert!(results.iter().any(|r| matches!(
        r,
        Err(WorkloadError::UnexpectedStatus { actual: 429, .. })
    )));
}
