//! Anonymous fetch of the editor splash page.
use crate::error::{LoadTestError, WorkloadError};
use crate::workload::{expect_success, WorkloadBase};
use balter::prelude::*;
use reqwest::header::ACCEPT;
use std::sync::OnceLock;
use tracing::{error, instrument, warn};

static SPLASH: OnceLock<SplashWorkload> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct SplashWorkload {
    base: WorkloadBase,
}

impl SplashWorkload {
    pub fn new(base: WorkloadBase) -> Self {
        Self { base }
    }

    /// Make this workload available to [`splash_page`].
    pub fn install(self) -> Result<(), LoadTestError> {
        SPLASH
            .set(self)
            .map_err(|_| LoadTestError::AlreadyInstalled("splash"))
    }
}

#[scenario]
pub async fn splash_page() {
    let Some(workload) = SPLASH.get() else {
        error!("Splash workload was not installed");
        return;
    };

    if let Err(err) = fetch_splash(workload).await {
        warn!("Splash page request failed: {err}");
    }
}

#[transaction]
#[instrument(skip_all, fields(host = workload.base.host()))]
pub async fn fetch_splash(workload: &SplashWorkload) -> Result<(), WorkloadError> {
    let res = workload
        .base
        .client()
        .get(workload.base.url("/"))
        .header(ACCEPT, "text/html")
        .send()
        .await?;
    expect_success(&res)?;
    // drain the body so the connection goes back to the pool
    res.bytes().await?;
    Ok(())
}
