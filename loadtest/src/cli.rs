use crate::workload::Pacing;
use crate::workloads::{graphql::ThinkTime, WorkloadKind};
use clap::Parser;
use std::num::NonZeroU32;
use std::path::PathBuf;

/// Drive load against PlanX.
///
/// Targets and credentials come from the environment (`TARGET_ENV`,
/// `AUTH_TOKEN`, `SKIP_RATE_LIMIT_SECRET`, `LOCAL_*_URL`).
///
/// ```text
/// $ TARGET_ENV=staging planx-loadtest graphql --tps 20 --duration 5m
/// $ AUTH_TOKEN=... planx-loadtest upload --fixtures ./samples
/// ```
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct LoadTestCli {
    /// Workload to run
    #[arg(value_enum)]
    pub workload: WorkloadKind,

    /// Target transactions per second
    #[arg(short, long, default_value = "1")]
    pub tps: NonZeroU32,

    /// How long to run, e.g. `90s` or `10m`
    #[arg(short, long, default_value = "60s")]
    pub duration: humantime::Duration,

    /// Directory of upload fixtures (overrides `FIXTURE_DIR`)
    #[arg(short, long)]
    pub fixtures: Option<PathBuf>,

    /// Shortest pause between GraphQL steps
    #[arg(long, default_value = "1s")]
    pub think_time_min: humantime::Duration,

    /// Longest pause between GraphQL steps
    #[arg(long, default_value = "3s")]
    pub think_time_max: humantime::Duration,
}

impl LoadTestCli {
    pub fn pacing(&self) -> Pacing {
        Pacing {
            tps: self.tps,
            duration: self.duration.into(),
        }
    }

    pub fn think_time(&self) -> ThinkTime {
        ThinkTime::new(self.think_time_min.into(), self.think_time_max.into())
    }
}
