use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Method},
    routing::{get, post},
    Json, Router,
};
use queuedesk_shared::TicketProjection;
use queuedesk_store::{Counter, Ticket};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::counters::CounterRegistry;
use crate::error::ServerError;
use crate::queue::{QueueService, SharedDb};
use crate::registrants::{ImportRow, Invitation, Registrants};
use crate::ws::counters_ws;

#[derive(Clone)]
pub struct AppState {
    pub queue: QueueService,
    pub counters: CounterRegistry,
    pub registrants: Registrants,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: SharedDb, config: ServerConfig) -> Self {
        Self {
            queue: QueueService::new(db.clone()),
            counters: CounterRegistry::new(db.clone()),
            registrants: Registrants::new(db),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/confirm", post(confirm))
        .route("/api/users", get(list_users))
        .route("/api/users/detail", post(user_detail))
        .route("/api/users/:unique_id", get(user_by_unique_id))
        .route("/api/user/:unique_id/qr", get(user_qr))
        .route("/api/counters", get(list_counters))
        .route("/api/admin/scan", post(scan))
        .route("/api/admin/queue-control", post(queue_control))
        .route("/api/admin/serve", post(serve))
        .route("/api/invite", post(invite))
        .route("/api/import", post(import))
        .route("/ws/counters", get(counters_ws))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    name: String,
    version: &'static str,
}

#[derive(Deserialize)]
struct ScanRequest {
    #[serde(default)]
    code: Option<String>,
}

#[derive(Deserialize)]
struct QueueControlRequest {
    #[serde(default)]
    prefix: Option<String>,
    #[serde(default)]
    action: Option<String>,
}

#[derive(Serialize)]
struct QueueControlResponse {
    message: String,
    queue_number: String,
}

#[derive(Deserialize)]
struct ConfirmRequest {
    #[serde(default)]
    qr_code: Option<String>,
}

#[derive(Deserialize)]
struct UniqueIdRequest {
    #[serde(rename = "uniqueId", alias = "unique_id")]
    unique_id: String,
}

#[derive(Deserialize, Default)]
struct InviteRequest {
    #[serde(default, rename = "userIds")]
    user_ids: Option<Vec<i64>>,
}

#[derive(Serialize)]
struct InviteResponse {
    message: &'static str,
    invitations: Vec<Invitation>,
}

#[derive(Serialize)]
struct ImportResponse {
    message: &'static str,
    imported: usize,
}

#[derive(Serialize)]
struct QrResponse {
    #[serde(rename = "uniqueId")]
    unique_id: String,
    qr_code: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        name: state.config.instance_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Check the admin bearer token. With no `ADMIN_TOKEN` configured the admin
/// surface is open.
pub fn verify_admin_token(token: Option<&str>, config: &ServerConfig) -> Result<(), ServerError> {
    let Some(ref expected) = config.admin_token else {
        return Ok(());
    };

    let token = token.unwrap_or("");

    // Constant-time comparison to prevent timing attacks on admin token.
    use subtle::ConstantTimeEq;
    let token_bytes = token.as_bytes();
    let expected_bytes = expected.as_bytes();
    if token_bytes.len() != expected_bytes.len()
        || token_bytes.ct_eq(expected_bytes).unwrap_u8() != 1
    {
        return Err(ServerError::Forbidden("Invalid admin token".into()));
    }

    Ok(())
}

fn require_admin(headers: &HeaderMap, config: &ServerConfig) -> Result<(), ServerError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|auth| auth.strip_prefix("Bearer ").unwrap_or(auth));
    verify_admin_token(token, config)
}

async fn scan(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<TicketProjection>, ServerError> {
    require_admin(&headers, &state.config)?;
    let projection = state
        .queue
        .assign_on_scan(req.code.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(projection))
}

async fn queue_control(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<QueueControlRequest>,
) -> Result<Json<QueueControlResponse>, ServerError> {
    require_admin(&headers, &state.config)?;
    let queue_number = state
        .queue
        .admin_control(req.prefix.as_deref(), req.action.as_deref())
        .await?;
    Ok(Json(QueueControlResponse {
        message: format!("Queue number updated to: {queue_number}"),
        queue_number,
    }))
}

async fn serve(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<UniqueIdRequest>,
) -> Result<Json<Ticket>, ServerError> {
    require_admin(&headers, &state.config)?;
    Ok(Json(state.queue.serve(&req.unique_id).await?))
}

async fn confirm(
    State(state): State<AppState>,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    state
        .queue
        .confirm(req.qr_code.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(MessageResponse {
        message: "User queued successfully",
    }))
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, ServerError> {
    Ok(Json(state.registrants.list().await?))
}

async fn user_detail(
    State(state): State<AppState>,
    Json(req): Json<UniqueIdRequest>,
) -> Result<Json<Ticket>, ServerError> {
    Ok(Json(state.registrants.by_unique_id(&req.unique_id).await?))
}

async fn user_by_unique_id(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<Ticket>, ServerError> {
    Ok(Json(state.registrants.by_unique_id(&unique_id).await?))
}

async fn user_qr(
    State(state): State<AppState>,
    Path(unique_id): Path<String>,
) -> Result<Json<QrResponse>, ServerError> {
    let qr_code = state.registrants.qr_code(&unique_id).await?;
    Ok(Json(QrResponse { unique_id, qr_code }))
}

async fn list_counters(State(state): State<AppState>) -> Result<Json<Vec<Counter>>, ServerError> {
    Ok(Json(state.counters.list().await?))
}

async fn invite(
    headers: HeaderMap,
    State(state): State<AppState>,
    req: Option<Json<InviteRequest>>,
) -> Result<Json<InviteResponse>, ServerError> {
    require_admin(&headers, &state.config)?;
    let Json(req) = req.unwrap_or_default();
    let ids = req.user_ids.unwrap_or_default();

    let invitations = state.registrants.invite(&ids).await?;
    Ok(Json(InviteResponse {
        message: "Invitations issued successfully",
        invitations,
    }))
}

async fn import(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(rows): Json<Vec<ImportRow>>,
) -> Result<Json<ImportResponse>, ServerError> {
    require_admin(&headers, &state.config)?;
    let tickets = state.registrants.import(rows).await?;

    info!(count = tickets.len(), "Registrants imported via API");
    Ok(Json(ImportResponse {
        message: "Data imported successfully",
        imported: tickets.len(),
    }))
}

pub async fn serve_http(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
