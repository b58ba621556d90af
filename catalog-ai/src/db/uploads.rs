//! Upload and column mapping persistence

use catalog_common::db::{fold_case, ColumnMapping, MappedField, Product, Upload};
use catalog_common::uuid_utils::parse_column;
use catalog_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::{like_pattern, parse_timestamp, products};

/// Persist one ingestion batch: the upload, its mappings and its products
///
/// Runs in a single transaction; on failure nothing is written.
pub async fn save_ingestion(
    pool: &SqlitePool,
    upload: &Upload,
    mappings: &[ColumnMapping],
    products: &[Product],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    insert_upload(&mut tx, upload).await?;
    for mapping in mappings {
        insert_mapping(&mut tx, mapping).await?;
    }
    for product in products {
        products::upsert_product(&mut tx, product).await?;
    }

    tx.commit().await?;

    tracing::debug!(
        upload_id = %upload.id,
        mappings = mappings.len(),
        products = products.len(),
        "Ingestion batch saved"
    );

    Ok(())
}

async fn insert_upload(conn: &mut SqliteConnection, upload: &Upload) -> Result<()> {
    sqlx::query(
        "INSERT INTO uploads (id, file_name, file_name_folded, uploaded_at) VALUES (?, ?, ?, ?)",
    )
    .bind(upload.id.to_string())
    .bind(&upload.file_name)
    .bind(fold_case(&upload.file_name))
    .bind(upload.uploaded_at.to_rfc3339())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn insert_mapping(conn: &mut SqliteConnection, mapping: &ColumnMapping) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO column_mappings (id, original_column, mapped_field, upload_id)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(mapping.id.to_string())
    .bind(&mapping.original_column)
    .bind(mapping.mapped_field.as_str())
    .bind(mapping.upload_id.to_string())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Page of uploads, newest first, with the unpaginated match count
pub async fn list_uploads(
    pool: &SqlitePool,
    file_name: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Upload>, i64)> {
    let pattern = file_name
        .filter(|s| !s.is_empty())
        .map(|s| like_pattern(&fold_case(s)));

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM uploads WHERE ?1 IS NULL OR file_name_folded LIKE ?1 ESCAPE '\\'",
    )
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await?;

    let rows = sqlx::query(
        r#"
        SELECT id, file_name, uploaded_at
        FROM uploads
        WHERE ?1 IS NULL OR file_name_folded LIKE ?1 ESCAPE '\'
        ORDER BY uploaded_at DESC, id
        LIMIT ?2 OFFSET ?3
        "#,
    )
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let uploads = rows.iter().map(upload_from_row).collect::<Result<Vec<_>>>()?;

    Ok((uploads, total))
}

pub async fn load_upload(pool: &SqlitePool, upload_id: Uuid) -> Result<Option<Upload>> {
    let row = sqlx::query("SELECT id, file_name, uploaded_at FROM uploads WHERE id = ?")
        .bind(upload_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(upload_from_row).transpose()
}

pub async fn load_mappings(pool: &SqlitePool, upload_id: Uuid) -> Result<Vec<ColumnMapping>> {
    let rows = sqlx::query(
        r#"
        SELECT id, original_column, mapped_field, upload_id
        FROM column_mappings
        WHERE upload_id = ?
        ORDER BY mapped_field
        "#,
    )
    .bind(upload_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let id: String = row.get("id");
            let mapped_field: String = row.get("mapped_field");
            let upload_id: String = row.get("upload_id");

            Ok(ColumnMapping {
                id: parse_column("column_mappings.id", &id)?,
                original_column: row.get("original_column"),
                mapped_field: mapped_field.parse::<MappedField>()?,
                upload_id: parse_column("column_mappings.upload_id", &upload_id)?,
            })
        })
        .collect()
}

pub async fn count_products(pool: &SqlitePool, upload_id: Uuid) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE upload_id = ?")
        .bind(upload_id.to_string())
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Delete an upload together with its products and mappings
///
/// Returns false when no such upload exists.
pub async fn delete_upload(pool: &SqlitePool, upload_id: Uuid) -> Result<bool> {
    let id = upload_id.to_string();
    let mut tx = pool.begin().await?;

    let products = sqlx::query("DELETE FROM products WHERE upload_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM column_mappings WHERE upload_id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM uploads WHERE id = ?")
        .bind(&id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        tracing::debug!(
            upload_id = %upload_id,
            products = products.rows_affected(),
            "Upload deleted"
        );
    }

    Ok(deleted)
}

fn upload_from_row(row: &SqliteRow) -> Result<Upload> {
    let id: String = row.get("id");
    let uploaded_at: String = row.get("uploaded_at");

    Ok(Upload {
        id: parse_column("uploads.id", &id)?,
        file_name: row.get("file_name"),
        uploaded_at: parse_timestamp("uploads.uploaded_at", &uploaded_at)?,
    })
}
