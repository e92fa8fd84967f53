//! Just enough of Hasura to answer the browsing queries.
use crate::MockState;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FlowFixture {
    pub id: String,
    pub slug: String,
    pub name: String,
    /// Publication timestamps, newest last.
    pub published_at: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TeamFixture {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub flows: Vec<FlowFixture>,
}

#[derive(Debug, Clone)]
pub struct GraphqlFixtures {
    pub teams: Vec<TeamFixture>,
}

impl GraphqlFixtures {
    pub fn empty() -> Self {
        Self { teams: vec![] }
    }

    fn flow(&self, id: &str) -> Option<(&TeamFixture, &FlowFixture)> {
        self.teams
            .iter()
            .find_map(|team| team.flows.iter().find(|f| f.id == id).map(|f| (team, f)))
    }
}

impl Default for GraphqlFixtures {
    fn default() -> Self {
        Self {
            teams: vec![
                TeamFixture {
                    id: 1,
                    slug: "barnet".to_string(),
                    name: "Barnet".to_string(),
                    flows: vec![FlowFixture {
                        id: "8ae6ae2e-5f8a-4c6b-9f4c-0d2a6f6d5e01".to_string(),
                        slug: "apply-for-a-lawful-development-certificate".to_string(),
                        name: "Apply for a lawful development certificate".to_string(),
                        published_at: vec![
                            "2024-01-10T09:00:00.000000+00:00".to_string(),
                            "2024-03-02T14:30:00.000000+00:00".to_string(),
                        ],
                    }],
                },
                TeamFixture {
                    id: 2,
                    slug: "lambeth".to_string(),
                    name: "Lambeth".to_string(),
                    flows: vec![FlowFixture {
                        id: "1c3d0b9a-77b2-4d43-a0a8-6c0f9a1e2b02".to_string(),
                        slug: "find-out-if-you-need-planning-permission".to_string(),
                        name: "Find out if you need planning permission".to_string(),
                        published_at: vec![],
                    }],
                },
                TeamFixture {
                    id: 3,
                    slug: "templates".to_string(),
                    name: "Templates".to_string(),
                    flows: vec![],
                },
            ],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub operation_name: Option<String>,
    #[allow(unused)]
    pub query: String,
    #[serde(default)]
    pub variables: Value,
}

pub(crate) async fn handler(
    State(state): State<Arc<MockState>>,
    Json(req): Json<GraphqlRequest>,
) -> Json<Value> {
    let operation = req.operation_name.as_deref().unwrap_or_default();
    state.record_operation(operation);

    let fixtures = &state.config().graphql;
    let body = match operation {
        "GetTeams" => {
            let mut teams: Vec<&TeamFixture> = fixtures.teams.iter().collect();
            teams.sort_by(|a, b| a.name.cmp(&b.name));
            let teams: Vec<Value> = teams
                .into_iter()
                .map(|t| json!({ "id": t.id, "name": t.name, "slug": t.slug }))
                .collect();
            json!({ "data": { "teams": teams } })
        }
        "GetFlows" => {
            let team_id = req.variables.get("team_id").and_then(Value::as_i64);
            let flows: Vec<Value> = fixtures
                .teams
                .iter()
                .filter(|t| Some(t.id) == team_id)
                .flat_map(|t| t.flows.iter())
                .map(|f| json!({ "id": f.id, "name": f.name, "slug": f.slug }))
                .collect();
            json!({ "data": { "flows": flows } })
        }
        "GetFlowMetadata" => {
            let flow = flow_variable(&req.variables).and_then(|id| fixtures.flow(id));
            let flow = flow.map(|(team, flow)| {
                json!({
                    "id": flow.id,
                    "slug": flow.slug,
                    "team": { "slug": team.slug },
                    "published_flows_aggregate": {
                        "aggregate": { "count": flow.published_at.len() }
                    }
                })
            });
            json!({ "data": { "flows_by_pk": flow } })
        }
        "GetLastPublishedFlow" => {
            let published: Vec<Value> = flow_variable(&req.variables)
                .and_then(|id| fixtures.flow(id))
                .and_then(|(_, flow)| flow.published_at.last())
                .map(|at| json!({ "created_at": at }))
                .into_iter()
                .collect();
            json!({ "data": { "published_flows": published } })
        }
        other => json!({
            "errors": [{
                "message": format!("operation {other:?} not found"),
                "extensions": { "code": "validation-failed" }
            }]
        }),
    };

    Json(body)
}

fn flow_variable(variables: &Value) -> Option<&str> {
    variables.get("flow_id").and_then(Value::as_str)
}
