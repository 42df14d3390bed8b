use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::server::state::AppState;

/// Applies the idempotent schema migration and reports the outcome.
pub async fn run_migration(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.db_connection.migrate().await {
        Ok(()) => {
            info!("migration completed");
            (
                StatusCode::OK,
                Json(json!({ "success": true, "message": "Migration completed" })),
            )
        }
        Err(e) => {
            error!("migration failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}
