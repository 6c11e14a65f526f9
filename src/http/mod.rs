use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::SplitError;
use crate::pipeline::{self, group_by_agent, AgentCount, Assignment};
use crate::registry::{AgentRef, AgentRegistry, AgentUpdate};
use crate::store::AssignmentStore;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RwLock<AgentRegistry>>,
    pub store: Arc<RwLock<AssignmentStore>>,
    pub fanout: usize,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            registry: Arc::new(RwLock::new(AgentRegistry::new())),
            store: Arc::new(RwLock::new(AssignmentStore::with_capacity(
                config.store_capacity,
            ))),
            fanout: config.fanout,
        }
    }
}

#[derive(Serialize)]
struct AgentDto {
    id: Uuid,
    name: String,
    email: String,
}

impl From<&AgentRef> for AgentDto {
    fn from(agent: &AgentRef) -> Self {
        Self {
            id: agent.id,
            name: agent.name.clone(),
            email: agent.email.clone(),
        }
    }
}

#[derive(Serialize)]
struct AgentCountDto {
    agent: AgentDto,
    count: usize,
}

impl From<&AgentCount> for AgentCountDto {
    fn from(entry: &AgentCount) -> Self {
        Self {
            agent: AgentDto::from(&entry.agent),
            count: entry.count,
        }
    }
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    distribution: Vec<AgentCountDto>,
    items: Vec<Assignment>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AgentGroupDto {
    agent_id: Uuid,
    /// `None` when the agent was removed from the directory after the upload.
    agent: Option<AgentDto>,
    items: Vec<Assignment>,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Deserialize)]
struct CreateAgentRequest {
    name: String,
    email: String,
    mobile: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    agent_id: Option<Uuid>,
}

impl SplitError {
    fn status(&self) -> StatusCode {
        match self {
            SplitError::UnsupportedFormat(_)
            | SplitError::Decode(_)
            | SplitError::MissingFile
            | SplitError::Validation { .. }
            | SplitError::InsufficientAgents { .. }
            | SplitError::DuplicateAgent(_) => StatusCode::BAD_REQUEST,
            SplitError::AgentNotFound(_) => StatusCode::NOT_FOUND,
            SplitError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SplitError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 5xx bodies stay generic; the full error goes to the log only.
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Server error".to_string()
        } else {
            tracing::warn!(error = %self, "Request rejected");
            self.to_string()
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_handler))
        .route(
            "/api/agents",
            post(create_agent_handler).get(list_agents_handler),
        )
        .route(
            "/api/agents/:id",
            get(get_agent_handler)
                .put(update_agent_handler)
                .delete(delete_agent_handler),
        )
        .route("/api/lists/upload", post(upload_handler))
        .route("/api/lists", get(list_assignments_handler))
        .route("/api/lists/grouped", get(grouped_assignments_handler))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve the API until the server task ends.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    tracing::info!(addr = %addr, "Starting listsplit server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await
}

async fn health_handler() -> &'static str {
    "API is running"
}

async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, SplitError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| SplitError::Decode(e.to_string()))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| SplitError::Decode(e.to_string()))?;
            file = Some((filename, data.to_vec()));
        }
    }
    let (filename, buffer) = file.ok_or(SplitError::MissingFile)?;

    let pool = state.registry.read().await.agents().to_vec();
    let mut store = state.store.write().await;
    let (items, distribution) =
        pipeline::ingest(&buffer, &filename, &pool, state.fanout, &mut store)?;

    Ok(Json(UploadResponse {
        message: "Lists distributed".to_string(),
        distribution: distribution.iter().map(AgentCountDto::from).collect(),
        items,
    }))
}

/// Flat assignment listing. `?agentId=` restricts the result to one agent;
/// whether to pass it is the caller's (authorization layer's) decision.
async fn list_assignments_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Assignment>> {
    let store = state.store.read().await;
    let items = match query.agent_id {
        Some(agent_id) => store.for_agent(&agent_id),
        None => store.all().to_vec(),
    };
    Json(items)
}

async fn grouped_assignments_handler(State(state): State<AppState>) -> Json<Vec<AgentGroupDto>> {
    let store = state.store.read().await;
    let groups = group_by_agent(store.all());
    drop(store);

    let registry = state.registry.read().await;
    let groups = groups
        .into_iter()
        .map(|group| AgentGroupDto {
            agent_id: group.agent_id,
            agent: registry.get(&group.agent_id).map(AgentDto::from),
            items: group.items,
        })
        .collect();

    Json(groups)
}

async fn create_agent_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<impl IntoResponse, SplitError> {
    let agent = AgentRef::new(&payload.name, &payload.email, &payload.mobile);
    let agent = state.registry.write().await.add(agent)?;
    Ok((StatusCode::CREATED, Json(agent)))
}

async fn list_agents_handler(State(state): State<AppState>) -> Json<Vec<AgentRef>> {
    Json(state.registry.read().await.agents().to_vec())
}

async fn get_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AgentRef>, SplitError> {
    let registry = state.registry.read().await;
    let agent = registry.get(&id).ok_or(SplitError::AgentNotFound(id))?;
    Ok(Json(agent.clone()))
}

async fn update_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AgentUpdate>,
) -> Result<Json<AgentRef>, SplitError> {
    let agent = state.registry.write().await.update(&id, payload)?;
    Ok(Json(agent))
}

async fn delete_agent_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, SplitError> {
    state.registry.write().await.remove(&id)?;
    Ok(Json(MessageResponse {
        message: "Agent deleted successfully".to_string(),
    }))
}
