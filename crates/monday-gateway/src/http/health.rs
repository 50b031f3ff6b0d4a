use axum::Json;
use serde_json::{json, Value};

/// `GET /health` (§6) — liveness probe only, no collaborator checks.
pub async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
