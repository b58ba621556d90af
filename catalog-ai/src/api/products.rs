//! Product API handlers
//!
//! Listing, attribute initialization and enrichment are scoped to an
//! upload; edits address a product directly.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use catalog_common::db::Product;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::products;
use crate::error::ApiResult;
use crate::models::{
    EnrichRequest, InitializeAttributesRequest, ProductPage, ProductPatch, ProductQuery,
};
use crate::services::{AttributeInitializer, EnrichmentEngine, ProductEditor};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub initialized: usize,
}

#[derive(Debug, Serialize)]
pub struct EnrichResponse {
    pub enriched: usize,
}

/// GET /uploads/:id/products
///
/// Every query parameter other than `page`, `limit`, `sortBy`, `sortOrder`
/// and `search` is a substring filter on a column or attribute.
pub async fn list_products(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<ProductPage>> {
    let query = ProductQuery::from_params(&params);
    let page = products::query_products(&state.db, upload_id, &query).await?;
    Ok(Json(page))
}

/// POST /uploads/:id/products
pub async fn initialize_attributes(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
    Json(request): Json<InitializeAttributesRequest>,
) -> ApiResult<Json<InitializeResponse>> {
    let initialized = AttributeInitializer::new(&state.db)
        .initialize(upload_id, &request.attribute_ids)
        .await?;

    Ok(Json(InitializeResponse { initialized }))
}

/// POST /uploads/:id/products/enrich
///
/// The body is optional; without `productIds` every product of the upload
/// is a candidate.
pub async fn enrich_products(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
    request: Option<Json<EnrichRequest>>,
) -> ApiResult<Json<EnrichResponse>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    let enriched = EnrichmentEngine::new(&state.db, state.completion.as_ref())
        .enrich(upload_id, request.product_ids.as_deref())
        .await?;

    Ok(Json(EnrichResponse { enriched }))
}

/// PATCH /products/:id
pub async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let product = ProductEditor::new(&state.db).update(product_id, patch).await?;
    Ok(Json(product))
}

/// Build product routes
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/uploads/:id/products",
            get(list_products).post(initialize_attributes),
        )
        .route("/uploads/:id/products/enrich", post(enrich_products))
        .route("/products/:id", patch(update_product))
}
