//! Helpers shared by the end-to-end tests in `tests/`.
use anyhow::Result;
use mock_service::{MockConfig, MockHandle};
use planx_loadtest::prelude::*;
use std::path::Path;
use tempfile::TempDir;

pub const TOKEN: &str = "test-token";
pub const SECRET: &str = "skip-please";

pub fn mock_config() -> MockConfig {
    MockConfig {
        auth_token: TOKEN.to_string(),
        ..MockConfig::default()
    }
}

pub async fn spawn_mock(config: MockConfig) -> Result<MockHandle> {
    mock_service::spawn(config).await
}

/// A client for the mock with the shared default headers.
pub fn base_for(mock: &MockHandle, secret: Option<&str>) -> Result<WorkloadBase> {
    Ok(WorkloadBase::new(&mock.url(), secret)?)
}

/// Write `files` into a fresh temporary directory and scan it.
pub fn fixture_dir(files: &[(&str, &[u8])]) -> Result<(TempDir, FileSampler)> {
    let dir = tempfile::tempdir()?;
    for (name, bytes) in files {
        std::fs::write(dir.path().join(name), bytes)?;
    }
    let sampler = FileSampler::scan(dir.path())?;
    Ok((dir, sampler))
}

pub fn read_fixture(dir: &Path, name: &str) -> Result<Vec<u8>> {
    Ok(std::fs::read(dir.join(name))?)
}
