use axum::{
    debug_handler,
    extract::{Multipart, Path, Request, State},
    http::{header, HeaderMap},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::{
    num::NonZeroU32,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, PoisonError, RwLock,
    },
    time::Duration,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub mod graphql;

pub use axum::http::StatusCode;
pub use graphql::{FlowFixture, GraphqlFixtures, TeamFixture};

pub const GRAPHQL_PATH: &str = "/v1/graphql";
pub const SKIP_RATE_LIMIT_HEADER: &str = "x-skip-rate-limit-secret";

const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub auth_token: String,
    pub skip_rate_limit_secret: Option<String>,
    /// Requests per second before answering `429`. `None` disables limiting.
    pub rate_limit: Option<NonZeroU32>,
    /// Status returned for a delete of a stored file.
    pub delete_status: StatusCode,
    pub graphql: GraphqlFixtures,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            auth_token: "mock-token".to_string(),
            skip_rate_limit_secret: None,
            rate_limit: None,
            delete_status: StatusCode::NO_CONTENT,
            graphql: GraphqlFixtures::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub bytes: Vec<u8>,
    pub mime: String,
}

/// Everything the mock remembers. Shared with tests through [`MockHandle`].
pub struct MockState {
    config: MockConfig,
    limiter: Option<DefaultDirectRateLimiter>,
    files: RwLock<HashMap<String, StoredFile>>,
    operations: RwLock<HashMap<String, u64>>,
    uploads: AtomicU64,
    deletes: AtomicU64,
    requests: AtomicU64,
}

impl MockState {
    pub fn new(config: MockConfig) -> Self {
        Self {
            limiter: config.rate_limit.map(rate_limiter),
            config,
            files: RwLock::new(HashMap::new()),
            operations: RwLock::new(HashMap::new()),
            uploads: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            requests: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Keys (`<id>/<name>`) of files currently stored.
    pub fn stored_keys(&self) -> Vec<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut keys: Vec<String> = files.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn stored_file(&self, key: &str) -> Option<StoredFile> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn uploads(&self) -> u64 {
        self.uploads.load(Ordering::Relaxed)
    }

    pub fn deletes(&self) -> u64 {
        self.deletes.load(Ordering::Relaxed)
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Number of GraphQL requests seen for `operation`.
    pub fn operation_count(&self, operation: &str) -> u64 {
        self.operations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(operation)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn record_operation(&self, operation: &str) {
        *self
            .operations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(operation.to_string())
            .or_default() += 1;
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == self.config.auth_token)
    }
}

#[derive(Debug, Error)]
pub enum MockError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Missing filename")]
    MissingFilename,

    #[error("Missing file")]
    MissingFile,

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("File not found")]
    NotFound,
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        use MockError::*;
        let status = match self {
            Unauthorized => StatusCode::UNAUTHORIZED,
            MissingFilename | Multipart(_) => StatusCode::BAD_REQUEST,
            MissingFile => StatusCode::INTERNAL_SERVER_ERROR,
            NotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/", get(splash))
        .route("/file/public/upload", post(upload))
        .route("/file/public/:id/:name", get(download).delete(delete))
        .route(GRAPHQL_PATH, post(graphql::handler))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: SocketAddr, config: MockConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    let state = Arc::new(MockState::new(config));
    tokio::spawn(tps_measure_task(state.clone()));
    serve(listener, state).await
}

pub async fn serve(listener: TcpListener, state: Arc<MockState>) -> anyhow::Result<()> {
    info!("Mock service listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// A mock bound to an ephemeral local port, served in the background.
pub struct MockHandle {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
}

impl MockHandle {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

pub async fn spawn(config: MockConfig) -> anyhow::Result<MockHandle> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = Arc::new(MockState::new(config));

    let server_state = state.clone();
    tokio::spawn(async move {
        if let Err(err) = serve(listener, server_state).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });

    Ok(MockHandle { addr, state })
}

async fn rate_limit(State(state): State<Arc<MockState>>, req: Request, next: Next) -> Response {
    state.requests.fetch_add(1, Ordering::Relaxed);

    if let Some(limiter) = &state.limiter {
        let bypass = match &state.config.skip_rate_limit_secret {
            Some(secret) => req
                .headers()
                .get(SKIP_RATE_LIMIT_HEADER)
                .is_some_and(|v| v.as_bytes() == secret.as_bytes()),
            None => false,
        };

        if !bypass && limiter.check().is_err() {
            debug!("Rate limited {}", req.uri());
            return StatusCode::TOO_MANY_REQUESTS.into_response();
        }
    }

    next.run(req).await
}

#[debug_handler]
async fn splash() -> Html<&'static str> {
    Html("<!doctype html><html><head><title>PlanX</title></head><body><div id=\"root\"></div></body></html>")
}

#[debug_handler]
async fn upload(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, MockError> {
    if !state.authorized(&headers) {
        return Err(MockError::Unauthorized);
    }

    let mut filename = None;
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("filename") => filename = Some(field.text().await?),
            Some("file") => {
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                file = Some(StoredFile {
                    bytes: field.bytes().await?.to_vec(),
                    mime,
                });
            }
            _ => {}
        }
    }

    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or(MockError::MissingFilename)?;
    let file = file.ok_or(MockError::MissingFile)?;

    let id: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();

    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    let file_url = format!(
        "http://{host}/file/public/{id}/{}",
        utf8_percent_encode(&filename, SEGMENT)
    );
    let file_type = file.mime.clone();

    state
        .files
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(format!("{id}/{filename}"), file);
    state.uploads.fetch_add(1, Ordering::Relaxed);
    debug!("Stored {id}/{filename}");

    Ok(Json(json!({ "fileType": file_type, "fileUrl": file_url })))
}

#[debug_handler]
async fn download(
    State(state): State<Arc<MockState>>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Response, MockError> {
    let file = state
        .stored_file(&format!("{id}/{name}"))
        .ok_or(MockError::NotFound)?;
    Ok(([(header::CONTENT_TYPE, file.mime)], file.bytes).into_response())
}

#[debug_handler]
async fn delete(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Path((id, name)): Path<(String, String)>,
) -> Result<StatusCode, MockError> {
    if !state.authorized(&headers) {
        return Err(MockError::Unauthorized);
    }

    let removed = state
        .files
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&format!("{id}/{name}"));

    match removed {
        Some(_) => {
            state.deletes.fetch_add(1, Ordering::Relaxed);
            Ok(state.config.delete_status)
        }
        None => Err(MockError::NotFound),
    }
}

/** Utils **/

pub fn rate_limiter(tps: NonZeroU32) -> DefaultDirectRateLimiter {
    RateLimiter::direct(Quota::per_second(tps))
}

/** TPS Printer **/

pub async fn tps_measure_task(state: Arc<MockState>) {
    let mut last = 0;
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let total = state.requests();
        info!("{} TPS", total - last);
        last = total;
    }
}
