//! Upload API handlers
//!
//! POST /uploads, GET /uploads, GET /uploads/:id, DELETE /uploads/:id

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use catalog_common::db::{ColumnMapping, Upload};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::uploads;
use crate::error::{ApiError, ApiResult};
use crate::models::IngestionResult;
use crate::pagination::Pagination;
use crate::services::IngestionService;
use crate::AppState;

/// Largest accepted upload body
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Multipart field carrying the spreadsheet
const FILE_FIELD: &str = "file";

/// GET /uploads query parameters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub file_name: Option<String>,
}

/// GET /uploads response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadListResponse {
    pub data: Vec<Upload>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

/// GET /uploads/:id response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDetailResponse {
    #[serde(flatten)]
    pub upload: Upload,
    pub mappings: Vec<ColumnMapping>,
    pub product_count: i64,
}

/// DELETE response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// POST /uploads
///
/// Ingest the spreadsheet in the `file` multipart field. Returns 201 with
/// the ingestion result, including per-row errors.
pub async fn create_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<IngestionResult>)> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    tracing::info!(file_name = %file_name, bytes = bytes.len(), "Upload received");

    let result = IngestionService::new(&state.db, state.completion.as_ref())
        .ingest(&file_name, &bytes)
        .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /uploads
///
/// Newest first; `fileName` is a case-insensitive substring filter.
pub async fn list_uploads(
    State(state): State<AppState>,
    Query(params): Query<UploadListParams>,
) -> ApiResult<Json<UploadListResponse>> {
    let pagination = Pagination::from_raw(params.page.as_deref(), params.limit.as_deref());

    let (data, total) = uploads::list_uploads(
        &state.db,
        params.file_name.as_deref(),
        pagination.limit,
        pagination.offset(),
    )
    .await?;

    Ok(Json(UploadListResponse {
        data,
        total,
        page: pagination.page,
        limit: pagination.limit,
        total_pages: pagination.total_pages(total),
    }))
}

/// GET /uploads/:id
pub async fn get_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<Json<UploadDetailResponse>> {
    let upload = uploads::load_upload(&state.db, upload_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Upload {} not found", upload_id)))?;

    let mappings = uploads::load_mappings(&state.db, upload_id).await?;
    let product_count = uploads::count_products(&state.db, upload_id).await?;

    Ok(Json(UploadDetailResponse {
        upload,
        mappings,
        product_count,
    }))
}

/// DELETE /uploads/:id
pub async fn delete_upload(
    State(state): State<AppState>,
    Path(upload_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if !uploads::delete_upload(&state.db, upload_id).await? {
        return Err(ApiError::NotFound(format!("Upload {} not found", upload_id)));
    }

    tracing::info!(upload_id = %upload_id, "Upload deleted");

    Ok(Json(MessageResponse {
        message: "Upload deleted successfully".to_string(),
    }))
}

/// Build upload routes
pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/uploads",
            get(list_uploads)
                .post(create_upload)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/uploads/:id", get(get_upload).delete(delete_upload))
}
