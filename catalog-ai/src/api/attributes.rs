//! Attribute definition API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_common::db::AttributeDefinition;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{CreateAttributeRequest, UpdateAttributeRequest};
use crate::services::AttributeRegistry;
use crate::AppState;

/// GET /attributes
pub async fn list_attributes(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<AttributeDefinition>>> {
    Ok(Json(AttributeRegistry::new(&state.db).list().await?))
}

/// POST /attributes
pub async fn create_attribute(
    State(state): State<AppState>,
    Json(request): Json<CreateAttributeRequest>,
) -> ApiResult<(StatusCode, Json<AttributeDefinition>)> {
    let definition = AttributeRegistry::new(&state.db).create(request).await?;
    Ok((StatusCode::CREATED, Json(definition)))
}

/// GET /attributes/:id
pub async fn get_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AttributeDefinition>> {
    Ok(Json(AttributeRegistry::new(&state.db).get(id).await?))
}

/// PATCH /attributes/:id
pub async fn update_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAttributeRequest>,
) -> ApiResult<Json<AttributeDefinition>> {
    Ok(Json(AttributeRegistry::new(&state.db).update(id, request).await?))
}

/// DELETE /attributes/:id
pub async fn delete_attribute(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    AttributeRegistry::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Build attribute routes
pub fn attribute_routes() -> Router<AppState> {
    Router::new()
        .route("/attributes", get(list_attributes).post(create_attribute))
        .route(
            "/attributes/:id",
            get(get_attribute)
                .patch(update_attribute)
                .delete(delete_attribute),
        )
}
