// handlers/public/health.rs - GET /, GET /health, GET /api/health

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::database::store::Store;
use crate::state::AppState;

pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Report Desk API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Role-gated report review service with live notifications",
            "endpoints": {
                "auth": "/api/auth/register, /api/auth/login (public)",
                "reports": "/api/reports[/:id] (protected)",
                "notifications": "/api/notifications (protected)",
                "admin": "/api/admin/* (admin, superadmin)",
                "stats": "/api/stats (admin, superadmin)",
                "socket": "/ws?token=... (protected)",
            }
        }
    }))
}

/// Liveness plus a store round trip. 503 when the store is unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let now = chrono::Utc::now();
    let backend = state.store.backend_name();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": backend,
                    "onlineUsers": state.hub.online_users(),
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": backend,
                    }
                })),
            )
                .into_response()
        }
    }
}
