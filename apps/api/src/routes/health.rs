use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

/// GET /api/health
/// Liveness probe with the current server time and crate version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
