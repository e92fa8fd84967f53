use utils::*;

use mock_service::{FlowFixture, GraphqlFixtures, MockConfig, MockHandle, TeamFixture, GRAPHQL_PATH};
use planx_loadtest::prelude::*;
use planx_loadtest::workloads::graphql::{browse, get_last_published, get_published_count};
use planx_loadtest::WorkloadError;
use std::time::Duration;

const FLOW_ID: &str = "5d3ed6e6-4f0a-4d6b-8a36-9f6a2b1c0d10";

fn flow(published_at: &[&str]) -> FlowFixture {
    FlowFixture {
        id: FLOW_ID.to_string(),
        slug: "report-a-planning-breach".to_string(),
        name: "Report a planning breach".to_string(),
        published_at: published_at.iter().map(|s| s.to_string()).collect(),
    }
}

fn single_team(flows: Vec<FlowFixture>) -> GraphqlFixtures {
    GraphqlFixtures {
        teams: vec![TeamFixture {
            id: 7,
            slug: "southwark".to_string(),
            name: "Southwark".to_string(),
            flows,
        }],
    }
}

async fn workload_for(fixtures: GraphqlFixtures, think_time: ThinkTime) -> (MockHandle, GraphqlWorkload) {
    let mock = init(MockConfig {
        graphql: fixtures,
        ..mock_config()
    })
    .await;
    let workload = GraphqlWorkload::new(base_for(&mock, None).unwrap(), GRAPHQL_PATH, think_time);
    (mock, workload)
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn published_flow_walks_every_step() {
    let (mock, workload) = workload_for(
        single_team(vec![flow(&["2024-01-01T00:00:00+00:00", "2024-02-01T00:00:00+00:00"])]),
        ThinkTime::NONE,
    )
    .await;

    let outcome = browse(&workload).await.unwrap();
    assert_eq!(
        outcome,
        BrowseOutcome::Published {
            team: "southwark".to_string(),
            flow: "report-a-planning-breach".to_string(),
            published_at: Some("2024-02-01T00:00:00+00:00".to_string()),
        }
    );

    for operation in ["GetTeams", "GetFlows", "GetFlowMetadata", "GetLastPublishedFlow"] {
        assert_eq!(mock.state.operation_count(operation), 1, "{operation}");
    }
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn no_teams_ends_after_first_query() {
    let (mock, workload) = workload_for(GraphqlFixtures::empty(), ThinkTime::NONE).await;

    assert_eq!(browse(&workload).await.unwrap(), BrowseOutcome::NoTeams);
    assert_eq!(mock.state.operation_count("GetTeams"), 1);
    assert_eq!(mock.state.operation_count("GetFlows"), 0);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn team_without_flows_ends_early() {
    let (mock, workload) = workload_for(single_team(vec![]), ThinkTime::NONE).await;

    assert_eq!(
        browse(&workload).await.unwrap(),
        BrowseOutcome::NoFlows {
            team: "southwark".to_string()
        }
    );
    assert_eq!(mock.state.operation_count("GetFlowMetadata"), 0);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn unpublished_flow_ends_early() {
    let (mock, workload) = workload_for(single_team(vec![flow(&[])]), ThinkTime::NONE).await;

    assert_eq!(
        browse(&workload).await.unwrap(),
        BrowseOutcome::Unpublished {
            team: "southwark".to_string(),
            flow: "report-a-planning-breach".to_string(),
        }
    );
    assert_eq!(mock.state.operation_count("GetFlowMetadata"), 1);
    assert_eq!(mock.state.operation_count("GetLastPublishedFlow"), 0);
}

#[tokio::test]
#[ntest::timeout(20_000)]
async fn default_fixtures_never_fail() {
    let (_mock, workload) = workload_for(GraphqlFixtures::default(), ThinkTime::NONE).await;

    let mut outcomes = vec![];
    for _ in 0..30 {
        outcomes.push(browse(&workload).await.unwrap());
    }

    assert!(outcomes
        .iter()
        .any(|o| matches!(o, BrowseOutcome::Published { team, .. } if team == "barnet")));
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, BrowseOutcome::Unpublished { team, .. } if team == "lambeth")));
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, BrowseOutcome::NoFlows { team } if team == "templates")));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn missing_metadata_is_a_failure() {
    let (_mock, workload) = workload_for(single_team(vec![flow(&[])]), ThinkTime::NONE).await;

    let err = get_published_count(&workload, "00000000-0000-0000-0000-000000000000")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkloadError::MissingField(_)));

    // an empty publication list is absence, not failure
    let latest = get_last_published(&workload, FLOW_ID).await.unwrap();
    assert_eq!(latest, None);
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn wrong_endpoint_is_a_failure() {
    let mock = init(mock_config()).await;
    let workload = GraphqlWorkload::new(base_for(&mock, None).unwrap(), "/v2/graphql", ThinkTime::NONE);

    let err = browse(&workload).await.unwrap_err();
    assert!(matches!(err, WorkloadError::UnexpectedStatus { actual: 404, .. }));
}

#[tokio::test]
#[ntest::timeout(10_000)]
async fn pauses_between_steps() {
    let think = Duration::from_millis(100);
    let (_mock, workload) = workload_for(
        single_team(vec![flow(&["2024-01-01T00:00:00+00:00"])]),
        ThinkTime::new(think, think),
    )
    .await;

    let start = tokio::time::Instant::now();
    browse(&workload).await.unwrap();
    assert!(start.elapsed() >= think * 3);
}
