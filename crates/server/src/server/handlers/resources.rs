use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::auth::token::AdminClaims;
use crate::discovery::discover_courses;
use crate::error::{RequestError, ValidationError};
use crate::models::resource::{
    merge_listing, CatalogEntry, CreateResourceRequest, ListResourcesQuery, Resource,
    ResourceFilter, UpdateResourceRequest,
};
use crate::server::state::AppState;

/// Stored resources matching the filter, followed by discovered courses when searching.
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListResourcesQuery>,
) -> Result<Json<Vec<CatalogEntry>>, RequestError> {
    let filter = ResourceFilter::from_query(query)?;
    let (stored, discovered) = futures::join!(state.db_connection.list_resources(&filter), async {
        filter
            .search
            .as_deref()
            .map(discover_courses)
            .unwrap_or_default()
    });
    Ok(Json(merge_listing(stored?, discovered)))
}

pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(id_or_slug): Path<String>,
) -> Result<Json<Resource>, RequestError> {
    let resource = state
        .db_connection
        .find_resource(&id_or_slug)
        .await?
        .ok_or(ValidationError::NotFound)?;
    Ok(Json(resource))
}

pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    admin: AdminClaims,
    Json(request): Json<CreateResourceRequest>,
) -> Result<(StatusCode, Json<Resource>), RequestError> {
    let new_resource = request.validate(admin.user_id, Utc::now())?;
    let resource = state.db_connection.create_resource(&new_resource).await?;
    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn update_resource(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    Path(id_or_slug): Path<String>,
    Json(update): Json<UpdateResourceRequest>,
) -> Result<Json<Resource>, RequestError> {
    let updated = state
        .db_connection
        .update_resource(&id_or_slug, update)
        .await?;
    if let Some(public_id) = &updated.orphaned_public_id {
        destroy_media(&state, public_id).await;
    }
    Ok(Json(updated.resource))
}

pub async fn delete_resource(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    Path(id_or_slug): Path<String>,
) -> Result<Json<Value>, RequestError> {
    let resource = state
        .db_connection
        .find_resource(&id_or_slug)
        .await?
        .ok_or(ValidationError::NotFound)?;
    if let Some(public_id) = &resource.file_public_id {
        destroy_media(&state, public_id).await;
    }
    state.db_connection.delete_resource(&resource.id).await?;
    Ok(Json(json!({ "success": true })))
}

/// Media cleanup never fails the request that triggered it.
async fn destroy_media(state: &AppState, public_id: &str) {
    if let Err(e) = state.media.destroy(public_id).await {
        warn!("failed to remove media {public_id}: {e}");
    }
}
