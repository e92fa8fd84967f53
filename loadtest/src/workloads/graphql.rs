//! Read-only browsing session against the Hasura GraphQL endpoint.
//!
//! Each step feeds the next: a random team, then one of its flows, then that
//! flow's publication metadata. A team without flows or a flow that has never
//! been published ends the session early. That is an ordinary outcome and is
//! not recorded as an error.
use crate::error::{LoadTestError, WorkloadError};
use crate::nested::{nested, nested_array};
use crate::workload::{expect_success, WorkloadBase};
use balter::prelude::*;
use rand::{seq::SliceRandom, Rng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

pub const DEFAULT_GRAPHQL_PATH: &str = "/v1/graphql";

pub const GET_TEAMS: &str = r#"
query GetTeams {
  teams(order_by: { name: asc }) {
    id
    name
    slug
  }
}"#;

pub const GET_FLOWS: &str = r#"
query GetFlows($team_id: Int!) {
  flows(where: { team_id: { _eq: $team_id } }, order_by: { updated_at: desc }) {
    id
    name
    slug
  }
}"#;

pub const GET_FLOW_METADATA: &str = r#"
query GetFlowMetadata($flow_id: uuid!) {
  flows_by_pk(id: $flow_id) {
    id
    slug
    team {
      slug
    }
    published_flows_aggregate {
      aggregate {
        count
      }
    }
  }
}"#;

pub const GET_LAST_PUBLISHED_FLOW: &str = r#"
query GetLastPublishedFlow($flow_id: uuid!) {
  published_flows(
    where: { flow_id: { _eq: $flow_id } }
    order_by: { created_at: desc }
    limit: 1
  ) {
    created_at
  }
}"#;

static GRAPHQL: OnceLock<GraphqlWorkload> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Team {
    pub id: i64,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Flow {
    pub id: String,
    pub slug: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphqlRequest<'a> {
    operation_name: &'a str,
    query: &'a str,
    variables: Value,
}

/// Pause between steps, drawn uniformly from `min..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkTime {
    pub min: Duration,
    pub max: Duration,
}

impl ThinkTime {
    pub const NONE: ThinkTime = ThinkTime {
        min: Duration::ZERO,
        max: Duration::ZERO,
    };

    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }

    pub async fn pause(&self) {
        let wait = self.sample();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}

impl Default for ThinkTime {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }
}

/// How a browsing session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    NoTeams,
    NoFlows { team: String },
    Unpublished { team: String, flow: String },
    Published {
        team: String,
        flow: String,
        published_at: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct GraphqlWorkload {
    base: WorkloadBase,
    path: String,
    think_time: ThinkTime,
}

impl GraphqlWorkload {
    pub fn new(base: WorkloadBase, path: &str, think_time: ThinkTime) -> Self {
        Self {
            base,
            path: path.to_string(),
            think_time,
        }
    }

    /// Make this workload available to [`browse_flows`].
    pub fn install(self) -> Result<(), LoadTestError> {
        GRAPHQL
            .set(self)
            .map_err(|_| LoadTestError::AlreadyInstalled("graphql"))
    }

    async fn query(
        &self,
        operation_name: &str,
        query: &str,
        variables: Value,
    ) -> Result<Value, WorkloadError> {
        let res = self
            .base
            .client()
            .post(self.base.url(&self.path))
            .json(&GraphqlRequest {
                operation_name,
                query,
                variables,
            })
            .send()
            .await?;
        expect_success(&res)?;

        let body: Value = res.json().await?;
        if let Some(errors) = nested_array(&body, &["errors"]).filter(|e| !e.is_empty()) {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| nested(e, &["message"]).and_then(Value::as_str))
                .collect();
            return Err(WorkloadError::Graphql(messages.join("; ")));
        }
        Ok(body)
    }
}

fn list_at<T: DeserializeOwned>(
    body: &Value,
    keys: &[&str],
    field: &'static str,
) -> Result<Vec<T>, WorkloadError> {
    let list = nested_array(body, keys).ok_or(WorkloadError::MissingField(field))?;
    list.iter()
        .map(|item| T::deserialize(item).map_err(|_| WorkloadError::MissingField(field)))
        .collect()
}

fn choose<T: Clone>(items: &[T]) -> Option<T> {
    items.choose(&mut rand::thread_rng()).cloned()
}

#[scenario]
pub async fn browse_flows() {
    let Some(workload) = GRAPHQL.get() else {
        error!("GraphQL workload was not installed");
        return;
    };

    match browse(workload).await {
        Ok(outcome) => debug!("Browsing session ended: {outcome:?}"),
        Err(err) => warn!("Browsing session failed: {err}"),
    }
}

/// Run one full session, pausing for think-time between steps.
pub async fn browse(workload: &GraphqlWorkload) -> Result<BrowseOutcome, WorkloadError> {
    let teams = get_teams(workload).await?;
    let Some(team) = choose(&teams) else {
        return Ok(BrowseOutcome::NoTeams);
    };
    workload.think_time.pause().await;

    let flows = get_flows(workload, team.id).await?;
    let Some(flow) = choose(&flows) else {
        return Ok(BrowseOutcome::NoFlows { team: team.slug });
    };
    workload.think_time.pause().await;

    let count = get_published_count(workload, &flow.id).await?;
    if count == 0 {
        return Ok(BrowseOutcome::Unpublished {
            team: team.slug,
            flow: flow.slug,
        });
    }
    workload.think_time.pause().await;

    let published_at = get_last_published(workload, &flow.id).await?;
    Ok(BrowseOutcome::Published {
        team: team.slug,
        flow: flow.slug,
        published_at,
    })
}

#[transaction]
#[instrument(skip_all)]
pub async fn get_teams(workload: &GraphqlWorkload) -> Result<Vec<Team>, WorkloadError> {
    let body = workload.query("GetTeams", GET_TEAMS, json!({})).await?;
    list_at(&body, &["data", "teams"], "data.teams")
}

#[transaction]
#[instrument(skip(workload))]
pub async fn get_flows(workload: &GraphqlWorkload, team_id: i64) -> Result<Vec<Flow>, WorkloadError> {
    let body = workload
        .query("GetFlows", GET_FLOWS, json!({ "team_id": team_id }))
        .await?;
    list_at(&body, &["data", "flows"], "data.flows")
}

#[transaction]
#[instrument(skip(workload))]
pub async fn get_published_count(workload: &GraphqlWorkload, flow_id: &str) -> Result<u64, WorkloadError> {
    let body = workload
        .query("GetFlowMetadata", GET_FLOW_METADATA, json!({ "flow_id": flow_id }))
        .await?;
    nested(
        &body,
        &[
            "data",
            "flows_by_pk",
            "published_flows_aggregate",
            "aggregate",
            "count",
        ],
    )
    .and_then(Value::as_u64)
    .ok_or(WorkloadError::MissingField(
        "data.flows_by_pk.published_flows_aggregate.aggregate.count",
    ))
}

/// `None` when the flow has no publication on record.
#[transaction]
#[instrument(skip(workload))]
pub async fn get_last_published(
    workload: &GraphqlWorkload,
    flow_id: &str,
) -> Result<Option<String>, WorkloadError> {
    let body = workload
        .query(
            "GetLastPublishedFlow",
            GET_LAST_PUBLISHED_FLOW,
            json!({ "flow_id": flow_id }),
        )
        .await?;
    let published = nested_array(&body, &["data", "published_flows"])
        .ok_or(WorkloadError::MissingField("data.published_flows"))?;

    match published.first() {
        None => Ok(None),
        Some(latest) => nested(latest, &["created_at"])
            .and_then(Value::as_str)
            .map(|at| Some(at.to_string()))
            .ok_or(WorkloadError::MissingField("published_flows.created_at")),
    }
}
