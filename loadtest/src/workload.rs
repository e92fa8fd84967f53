//! Defaults shared by every workload.
use crate::error::{LoadTestError, WorkloadError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, USER_AGENT},
    Client, Response, StatusCode,
};
use std::{num::NonZeroU32, time::Duration};

pub const SKIP_RATE_LIMIT_HEADER: &str = "x-skip-rate-limit-secret";

const DEFAULT_USER_AGENT: &str = concat!("planx-loadtest/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate and length of a run. Balter enforces the rate across all concurrent
/// scenario invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub tps: NonZeroU32,
    pub duration: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            tps: NonZeroU32::MIN,
            duration: Duration::from_secs(60),
        }
    }
}

/// A pooled client bound to one target host.
#[derive(Debug, Clone)]
pub struct WorkloadBase {
    client: Client,
    host: String,
}

impl WorkloadBase {
    pub fn new(host: &str, skip_rate_limit_secret: Option<&str>) -> Result<Self, LoadTestError> {
        let client = Client::builder()
            .default_headers(default_headers(skip_rate_limit_secret)?)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_client(client, host))
    }

    pub fn with_client(client: Client, host: &str) -> Self {
        Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Absolute URL for `path` on this host.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.host)
        } else {
            format!("{}/{path}", self.host)
        }
    }
}

pub fn default_headers(skip_rate_limit_secret: Option<&str>) -> Result<HeaderMap, LoadTestError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if let Some(secret) = skip_rate_limit_secret {
        let mut value = HeaderValue::from_str(secret)
            .map_err(|_| LoadTestError::InvalidHeader(SKIP_RATE_LIMIT_HEADER))?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(SKIP_RATE_LIMIT_HEADER), value);
    }

    Ok(headers)
}

/// Fail unless the response has exactly `expected` status.
pub fn expect_status(res: &Response, expected: StatusCode) -> Result<(), WorkloadError> {
    if res.status() == expected {
        Ok(())
    } else {
        Err(WorkloadError::UnexpectedStatus {
            expected: expected.to_string(),
            actual: res.status().as_u16(),
        })
    }
}

/// Fail unless the response status is 2xx.
pub fn expect_success(res: &Response) -> Result<(), WorkloadError> {
    if res.status().is_success() {
        Ok(())
    } else {
        Err(WorkloadError::UnexpectedStatus {
            expected: "2xx".to_string(),
            actual: res.status().as_u16(),
        })
    }
}
