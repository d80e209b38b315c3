use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use kombucha_core::TimelinePoint;

use crate::error::StoreError;
use crate::models::*;
use crate::store::JarStore;

// ============================================================
// Error Handling
// ============================================================

/// Map a store error to a response. Missing jars become 404; everything
/// else is logged server-side and reported as a generic 500.
fn store_error(e: StoreError) -> (StatusCode, String) {
    match e {
        StoreError::NotFound(_) => {
            tracing::debug!("{}", e);
            (StatusCode::NOT_FOUND, "Jar not found".to_string())
        }
        e => {
            tracing::error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Jars
// ============================================================

pub async fn list_jars(
    State(store): State<JarStore>,
) -> Result<Json<Vec<JarRecord>>, (StatusCode, String)> {
    store.list().map(Json).map_err(store_error)
}

pub async fn get_jar(
    State(store): State<JarStore>,
    Path(id): Path<JarId>,
) -> Result<Json<JarRecord>, (StatusCode, String)> {
    store.get(id).map(Json).map_err(store_error)
}

pub async fn get_jar_timeline(
    State(store): State<JarStore>,
    Path(id): Path<JarId>,
) -> Result<Json<Vec<TimelinePoint>>, (StatusCode, String)> {
    store.timeline(id).map(Json).map_err(store_error)
}

pub async fn create_jar(
    State(store): State<JarStore>,
    Json(input): Json<CreateJarInput>,
) -> Result<(StatusCode, Json<CreatedJar>), (StatusCode, String)> {
    store
        .create(input)
        .map(|id| (StatusCode::CREATED, Json(CreatedJar { id })))
        .map_err(store_error)
}

pub async fn annotate_jar(
    State(store): State<JarStore>,
    Path(id): Path<JarId>,
    Json(input): Json<AnnotateJarInput>,
) -> Result<Json<AnnotateOutcome>, (StatusCode, String)> {
    store.annotate(id, input.notes).map(Json).map_err(store_error)
}

pub async fn refresh_jar(
    State(store): State<JarStore>,
    Path(id): Path<JarId>,
) -> Result<Json<Measurements>, (StatusCode, String)> {
    store.refresh(id).map(Json).map_err(store_error)
}

pub async fn delete_jar(
    State(store): State<JarStore>,
    Path(id): Path<JarId>,
) -> Result<StatusCode, (StatusCode, String)> {
    store
        .delete(id)
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(store_error)
}
