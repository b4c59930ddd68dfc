use axum::Json;
use chrono::Utc;
use serde_json::{Value, json};

/// Liveness probe; touches neither the store nor a tenant.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
