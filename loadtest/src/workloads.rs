//! The three independent workloads. Each is a balter scenario built from one
//! or more transactions.
pub mod graphql;
pub mod splash;
pub mod upload;

use crate::workload::Pacing;
use balter::prelude::*;
use clap::ValueEnum;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkloadKind {
    /// Anonymous `GET /` against the editor
    Splash,
    /// Authenticated upload then delete against the API
    Upload,
    /// Multi-step read-only session against Hasura
    Graphql,
}

impl WorkloadKind {
    pub fn name(self) -> &'static str {
        match self {
            WorkloadKind::Splash => "splash",
            WorkloadKind::Upload => "upload",
            WorkloadKind::Graphql => "graphql",
        }
    }
}

/// Drive the installed workload of `kind` at `pacing` until the duration
/// elapses.
pub async fn run(kind: WorkloadKind, pacing: Pacing) -> RunStatistics {
    info!(
        "Running {} workload at {} TPS for {}",
        kind.name(),
        pacing.tps,
        humantime::format_duration(pacing.duration)
    );

    match kind {
        WorkloadKind::Splash => {
            splash::splash_page()
                .tps(pacing.tps.get())
                .duration(pacing.duration)
                .await
        }
        WorkloadKind::Upload => {
            upload::upload_and_delete()
                .tps(pacing.tps.get())
                .duration(pacing.duration)
                .await
        }
        WorkloadKind::Graphql => {
            graphql::browse_flows()
                .tps(pacing.tps.get())
                .duration(pacing.duration)
                .await
        }
    }
}
