#![doc = include_str!("../README.md")]

pub mod cli;
pub mod config;
pub mod error;
pub mod hosts;
pub mod nested;
pub mod sample;
pub mod storage;
pub mod workload;
pub mod workloads;

pub use error::{KeyError, LoadTestError, WorkloadError};

pub mod prelude {
    pub use crate::config::Config;
    pub use crate::hosts::{Hosts, Target};
    pub use crate::nested::{nested, nested_array};
    pub use crate::sample::{mime_type, FileSampler, SampleFile};
    pub use crate::storage::{delete_path, file_key};
    pub use crate::workload::{Pacing, WorkloadBase};
    pub use crate::workloads::{
        graphql::{BrowseOutcome, GraphqlWorkload, ThinkTime},
        splash::SplashWorkload,
        upload::UploadWorkload,
        WorkloadKind,
    };
}
