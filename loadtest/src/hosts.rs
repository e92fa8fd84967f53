//! Base URLs for each deployment environment.
//!
//! `TARGET_ENV` picks the row; only the names in [`ENVIRONMENTS`] are accepted.
//! When running against `local`, each target may be pointed elsewhere with its
//! `LOCAL_*_URL` variable.
use crate::error::LoadTestError;

pub const ENVIRONMENTS: &[&str] = &["local", "staging"];
pub const DEFAULT_ENVIRONMENT: &str = "local";

pub type HostTable = &'static [(&'static str, &'static str)];

pub const API_HOSTS: HostTable = &[
    ("local", "http://localhost:7002"),
    ("staging", "https://api.editor.planx.dev"),
];

pub const HASURA_HOSTS: HostTable = &[
    ("local", "http://localhost:7100"),
    ("staging", "https://hasura.editor.planx.dev"),
];

pub const EDITOR_HOSTS: HostTable = &[
    ("local", "http://localhost:3000"),
    ("staging", "https://editor.planx.dev"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Api,
    Hasura,
    Editor,
}

impl Target {
    pub fn name(self) -> &'static str {
        match self {
            Target::Api => "api",
            Target::Hasura => "hasura",
            Target::Editor => "editor",
        }
    }

    pub fn table(self) -> HostTable {
        match self {
            Target::Api => API_HOSTS,
            Target::Hasura => HASURA_HOSTS,
            Target::Editor => EDITOR_HOSTS,
        }
    }

    pub fn local_override_var(self) -> &'static str {
        match self {
            Target::Api => "LOCAL_API_URL",
            Target::Hasura => "LOCAL_HASURA_URL",
            Target::Editor => "LOCAL_EDITOR_URL",
        }
    }
}

/// Look up `env` in `table`. Names outside the allow-list are rejected even
/// if the table happens to contain them.
pub fn host_for(table: HostTable, env: &str) -> Result<&'static str, LoadTestError> {
    if !ENVIRONMENTS.contains(&env) {
        return Err(LoadTestError::InvalidEnvironment(
            env.to_string(),
            ENVIRONMENTS,
        ));
    }

    table
        .iter()
        .find(|(name, _)| *name == env)
        .map(|(_, url)| *url)
        .ok_or_else(|| LoadTestError::MissingHost {
            target: "requested",
            env: env.to_string(),
        })
}

/// Resolved base URLs for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hosts {
    pub environment: String,
    pub api: String,
    pub hasura: String,
    pub editor: String,
}

impl Hosts {
    /// Resolve every target for `env`. `lookup` reads an environment variable
    /// and is only consulted for `local` overrides.
    pub fn resolve<F>(env: &str, lookup: F) -> Result<Self, LoadTestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let resolve_one = |target: Target| -> Result<String, LoadTestError> {
            let default = host_for(target.table(), env).map_err(|err| match err {
                LoadTestError::MissingHost { env, .. } => LoadTestError::MissingHost {
                    target: target.name(),
                    env,
                },
                err => err,
            })?;

            if env == DEFAULT_ENVIRONMENT {
                if let Some(url) = lookup(target.local_override_var()).filter(|u| !u.is_empty()) {
                    return Ok(url.trim_end_matches('/').to_string());
                }
            }
            Ok(default.to_string())
        };

        Ok(Self {
            environment: env.to_string(),
            api: resolve_one(Target::Api)?,
            hasura: resolve_one(Target::Hasura)?,
            editor: resolve_one(Target::Editor)?,
        })
    }

    pub fn get(&self, target: Target) -> &str {
        match target {
            Target::Api => &self.api,
            Target::Hasura => &self.hasura,
            Target::Editor => &self.editor,
        }
    }
}
