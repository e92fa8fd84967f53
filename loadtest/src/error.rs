use std::path::PathBuf;
use thiserror::Error;

/// Startup errors. Any of these aborts the run before a scenario starts.
#[derive(Debug, Error)]
pub enum LoadTestError {
    #[error("Invalid TARGET_ENV {0:?}, expected one of {1:?}")]
    InvalidEnvironment(String, &'static [&'static str]),

    #[error("No {target} host configured for environment {env}")]
    MissingHost { target: &'static str, env: String },

    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for header {0}")]
    InvalidHeader(&'static str),

    #[error("Fixture directory {0} contains no files")]
    EmptyFixtureDir(PathBuf),

    #[error("Workload {0} was already installed")]
    AlreadyInstalled(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// A failed simulated request. Returned from transactions so balter counts it
/// as an error; the scenario keeps running.
#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {actual} (expected {expected})")]
    UnexpectedStatus { expected: String, actual: u16 },

    #[error("Response is missing field {0}")]
    MissingField(&'static str),

    #[error("GraphQL errors in response: {0}")]
    Graphql(String),

    #[error("Unusable file URL: {0}")]
    Key(#[from] KeyError),

    #[error("Could not read fixture: {0}")]
    Fixture(#[from] std::io::Error),
}

/// Storage URL did not have the expected `/<id>/<name>` shape.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Invalid URL {0:?}: {1}")]
    Parse(String, url::ParseError),

    #[error("URL {0:?} has no path segments")]
    NoPath(String),

    #[error("URL {0:?} needs at least two path segments")]
    TooShort(String),

    #[error("Path segment {0:?} is not valid UTF-8 once decoded")]
    Encoding(String),
}
