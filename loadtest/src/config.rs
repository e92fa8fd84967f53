//! Settings read once from the environment at startup.
use crate::error::LoadTestError;
use crate::hosts::{Hosts, DEFAULT_ENVIRONMENT};
use crate::workloads::graphql::DEFAULT_GRAPHQL_PATH;
use std::path::PathBuf;

pub const DEFAULT_FIXTURE_DIR: &str = "loadtest/samples";

#[derive(Debug, Clone)]
pub struct Config {
    pub hosts: Hosts,
    pub auth_token: Option<String>,
    pub skip_rate_limit_secret: Option<String>,
    pub graphql_path: String,
    pub fixture_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, LoadTestError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, LoadTestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let env = var("TARGET_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let hosts = Hosts::resolve(&env, &var)?;

        let mut graphql_path = var("HASURA_GRAPHQL_PATH").unwrap_or_else(|| DEFAULT_GRAPHQL_PATH.to_string());
        if !graphql_path.starts_with('/') {
            graphql_path.insert(0, '/');
        }

        Ok(Self {
            hosts,
            auth_token: var("AUTH_TOKEN"),
            skip_rate_limit_secret: var("SKIP_RATE_LIMIT_SECRET"),
            graphql_path,
            fixture_dir: var("FIXTURE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FIXTURE_DIR)),
        })
    }

    pub fn auth_token(&self) -> Result<&str, LoadTestError> {
        self.auth_token
            .as_deref()
            .ok_or(LoadTestError::MissingVar("AUTH_TOKEN"))
    }
}
