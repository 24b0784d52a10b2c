use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::routes::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let status = match state.health.check().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!("数据库健康检查失败: {}", e);
            "db_unavailable"
        }
    };

    Json(json!({
        "status": status,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}
