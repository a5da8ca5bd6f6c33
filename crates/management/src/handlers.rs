//! Axum REST handlers for the management API.

use crate::models::*;
use crate::service::StrategyService;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use campaign_core::error::CampaignError;
use campaign_core::types::StrategyMetrics;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Shared management state.
#[derive(Clone)]
pub struct ManagementState {
    pub service: Arc<StrategyService>,
    /// Recorded as the author of every write in the audit log.
    pub acting_user: Arc<str>,
}

impl ManagementState {
    pub fn new(service: Arc<StrategyService>, acting_user: &str) -> Self {
        Self {
            service,
            acting_user: Arc::from(acting_user),
        }
    }
}

/// Maps service errors onto HTTP responses.
pub struct ApiError(CampaignError);

impl From<CampaignError> for ApiError {
    fn from(err: CampaignError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CampaignError::ProjectNotFound(_) | CampaignError::StrategyNotFound(_) => StatusCode::NOT_FOUND,
            CampaignError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            other => {
                error!(error = %other, "Management request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.code().to_string(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ─── Health ────────────────────────────────────────────────────────────────

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

// ─── Projects ──────────────────────────────────────────────────────────────

pub async fn list_projects(State(state): State<ManagementState>) -> Json<Vec<Project>> {
    Json(state.service.store().list_projects())
}

pub async fn get_project(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    state
        .service
        .store()
        .get_project(id)
        .map(Json)
        .ok_or_else(|| CampaignError::ProjectNotFound(id).into())
}

pub async fn create_project(
    State(state): State<ManagementState>,
    Json(req): Json<CreateProjectRequest>,
) -> (StatusCode, Json<Project>) {
    let project = state.service.create_project(req, &state.acting_user);
    (StatusCode::CREATED, Json(project))
}

pub async fn update_project(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    Ok(Json(state.service.update_project(id, req, &state.acting_user)?))
}

pub async fn delete_project(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.service.delete_project(id, &state.acting_user)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_project_strategies(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Strategy>>> {
    let store = state.service.store();
    if store.get_project(id).is_none() {
        return Err(CampaignError::ProjectNotFound(id).into());
    }
    Ok(Json(store.list_project_strategies(id)))
}

// ─── Strategies ────────────────────────────────────────────────────────────

pub async fn list_strategies(State(state): State<ManagementState>) -> Json<Vec<Strategy>> {
    Json(state.service.store().list_strategies())
}

pub async fn get_strategy(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Strategy>> {
    state
        .service
        .store()
        .get_strategy(id)
        .map(Json)
        .ok_or_else(|| CampaignError::StrategyNotFound(id).into())
}

pub async fn create_strategy(
    State(state): State<ManagementState>,
    Json(req): Json<CreateStrategyRequest>,
) -> ApiResult<(StatusCode, Json<Strategy>)> {
    let strategy = state.service.create_strategy(req, &state.acting_user)?;
    Ok((StatusCode::CREATED, Json(strategy)))
}

pub async fn update_strategy(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStrategyRequest>,
) -> ApiResult<Json<Strategy>> {
    Ok(Json(state.service.update_strategy(id, req, &state.acting_user)?))
}

pub async fn change_strategy_status(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> ApiResult<Json<Strategy>> {
    Ok(Json(state.service.set_status(id, req.status, &state.acting_user)?))
}

pub async fn delete_strategy(
    State(state): State<ManagementState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.service.delete_strategy(id, &state.acting_user)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn preview_strategy(
    State(state): State<ManagementState>,
    Json(req): Json<PreviewRequest>,
) -> ApiResult<Json<StrategyMetrics>> {
    Ok(Json(state.service.preview(req.project_id, &req.input)?))
}

// ─── Audit Log ─────────────────────────────────────────────────────────────

pub async fn audit_log(State(state): State<ManagementState>) -> Json<Vec<AuditLogEntry>> {
    Json(state.service.store().get_audit_log())
}
