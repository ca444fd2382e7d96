//! Request and response bodies of the HTTP API.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SERVICE_NAME: &str = "conductor";

// ============= Health =============

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: f64,
    pub requests_handled: u64,
    pub components: HealthComponents,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthComponents {
    /// "connected" | "disconnected"
    pub windmill: String,
    pub agents: BTreeMap<String, String>,
}

// ============= Scripts =============

#[derive(Debug, Deserialize)]
pub struct RunScriptRequest {
    pub script_path: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub user_id: Option<String>,
}

// ============= Workspace =============

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkspaceResponse {
    pub status: String,
    pub message: String,
}

// ============= Root =============

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}

impl ServiceInfo {
    pub fn current() -> Self {
        let endpoints = BTreeMap::from([
            ("health", "GET /health"),
            ("create_task", "POST /api/tasks"),
            ("run_script", "POST /api/scripts/run"),
            ("create_workspace", "POST /api/users/{user_id}/workspace"),
        ]);
        Self {
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
            endpoints,
        }
    }
}

// ============= Error Handling =============

#[derive(Debug)]
pub enum HttpServerError {
    InvalidRequest(String),
    Backend(String),
    Internal(String),
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg),
            Self::Backend(msg) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR", msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        };

        let body = serde_json::json!({
            "success": false,
            "error": message,
            "error_code": error_code,
        });

        (status, Json(body)).into_response()
    }
}
