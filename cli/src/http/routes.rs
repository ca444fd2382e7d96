//! Route table and handlers.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use conductor_core::api::{TaskRequest, TaskResult};

use crate::http::{models::*, state::AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/tasks", post(create_task_handler))
        .route("/api/scripts/run", post(run_script_handler))
        .route("/api/users/:user_id/workspace", post(create_workspace_handler))
        .with_state(state)
}

fn require_non_blank(field: &str, value: &str) -> Result<(), HttpServerError> {
    if value.trim().is_empty() {
        return Err(HttpServerError::InvalidRequest(format!(
            "{field} cannot be empty"
        )));
    }
    Ok(())
}

/// GET /
async fn root_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    state.stats_mut().increment_request("/health");

    let windmill_ok = state.orchestrator.runner().health_check().await;
    let agents = state
        .orchestrator
        .agents()
        .iter()
        .map(|agent| (agent.kind().to_string(), "active".to_string()))
        .collect();
    let snapshot = state.snapshot();

    Json(HealthResponse {
        status: "healthy".into(),
        service: SERVICE_NAME.into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: snapshot.uptime_seconds,
        requests_handled: snapshot.requests_total,
        components: HealthComponents {
            windmill: if windmill_ok { "connected" } else { "disconnected" }.into(),
            agents,
        },
    })
}

/// POST /api/tasks - coordinator → planner → executor.
///
/// A task that fails inside the pipeline is still a 200 with `status: failed`.
async fn create_task_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<TaskResult>, HttpServerError> {
    state.stats_mut().increment_request("/api/tasks");
    require_non_blank("user_id", &req.user_id)?;

    let result = state.orchestrator.run_task(req).await;
    if !result.is_success() {
        state.stats_mut().increment_task_failure();
    }
    Ok(Json(result))
}

/// POST /api/scripts/run
async fn run_script_handler(
    State(state): State<AppState>,
    Json(req): Json<RunScriptRequest>,
) -> Result<Json<TaskResult>, HttpServerError> {
    state.stats_mut().increment_request("/api/scripts/run");
    require_non_blank("script_path", &req.script_path)?;

    tracing::info!(
        target: "conductor.http",
        script = %req.script_path,
        user_id = req.user_id.as_deref().unwrap_or("-"),
        "direct script execution"
    );

    let result = state
        .orchestrator
        .run_script(&req.script_path, req.args)
        .await;
    if !result.is_success() {
        state.stats_mut().increment_task_failure();
    }
    Ok(Json(result))
}

/// POST /api/users/:user_id/workspace
async fn create_workspace_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<WorkspaceResponse>, HttpServerError> {
    state
        .stats_mut()
        .increment_request("/api/users/:user_id/workspace");
    require_non_blank("user_id", &user_id)?;

    tracing::info!(target: "conductor.http", user_id = %user_id, "creating user workspace");
    if state.orchestrator.runner().create_user_folder(&user_id).await {
        Ok(Json(WorkspaceResponse {
            status: "success".into(),
            message: format!("Workspace created for user {user_id}"),
        }))
    } else {
        Err(HttpServerError::Backend("Failed to create workspace".into()))
    }
}
