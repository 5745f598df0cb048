use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{errors::ServiceError, AppState};

/// GET /health: liveness plus a store ping.
pub async fn health(State(state): State<AppState>) -> Result<Json<Value>, ServiceError> {
    state.db.ping().await?;
    Ok(Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}
