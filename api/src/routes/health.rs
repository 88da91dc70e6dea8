use crate::AppState;
use axum::{Json, extract::State};
use chrono::Utc;

/// GET /health
/// Response: 200 OK with JSON
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    };

    Json(serde_json::json!({
      "status": "healthy",
      "database": database,
      "timestamp": Utc::now().timestamp()
    }))
}
