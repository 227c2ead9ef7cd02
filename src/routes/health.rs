use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{AppState, database, error::Result};

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Ready once the store answers and its schema matches the embedded
/// migrations; a lagging schema answers 503 with both versions.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let migrations = database::migration_status(&state.db).await?;

    let status = if migrations.is_current() {
        StatusCode::OK
    } else {
        tracing::warn!(
            "Schema at {:?}, binary expects {:?}",
            migrations.applied,
            migrations.embedded
        );
        StatusCode::SERVICE_UNAVAILABLE
    };

    Ok((status, Json(readiness_body(&migrations))))
}

fn readiness_body(migrations: &database::MigrationStatus) -> serde_json::Value {
    json!({
        "status": if migrations.is_current() { "ready" } else { "migrating" },
        "database": "connected",
        "migrations": migrations,
    })
}
