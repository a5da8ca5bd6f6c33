//! Management API router — mounts all management endpoints under /api/v1/management.

use crate::handlers::{self, ManagementState};
use axum::routing::{get, post};
use axum::Router;

/// Build the management router with all endpoints.
/// Returns a Router that should be merged into the main app.
pub fn management_router(state: ManagementState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Projects
        .route("/api/v1/management/projects", get(handlers::list_projects).post(handlers::create_project))
        .route(
            "/api/v1/management/projects/:id",
            get(handlers::get_project).put(handlers::update_project).delete(handlers::delete_project),
        )
        .route("/api/v1/management/projects/:id/strategies", get(handlers::list_project_strategies))
        // Strategies
        .route("/api/v1/management/strategies", get(handlers::list_strategies).post(handlers::create_strategy))
        .route("/api/v1/management/strategies/preview", post(handlers::preview_strategy))
        .route(
            "/api/v1/management/strategies/:id",
            get(handlers::get_strategy).put(handlers::update_strategy).delete(handlers::delete_strategy),
        )
        .route("/api/v1/management/strategies/:id/status", post(handlers::change_strategy_status))
        // Audit log
        .route("/api/v1/management/audit-log", get(handlers::audit_log))
        .with_state(state)
}
