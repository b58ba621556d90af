//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up to
//! date on every start. All statements are idempotent.

use super::document::{fold_case, fold_document, AttributeDocument};
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Current schema version recorded in `schema_version`
pub const SCHEMA_VERSION: i64 = 2;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Foreign keys are a per-connection setting, so they go on the connect
    // options rather than a one-off PRAGMA
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_schema(&pool).await?;

    Ok(pool)
}

/// Open a private in-memory database with the full schema
///
/// The pool holds a single connection: every connection to `:memory:`
/// would otherwise see its own empty database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    init_schema(&pool).await?;

    Ok(pool)
}

/// Create all catalog tables (idempotent)
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    create_schema_version_table(pool).await?;
    create_uploads_table(pool).await?;
    create_column_mappings_table(pool).await?;
    create_products_table(pool).await?;
    create_attribute_definitions_table(pool).await?;
    add_folded_columns(pool).await?;

    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(SCHEMA_VERSION)
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_uploads_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploads (
            id TEXT PRIMARY KEY,
            file_name TEXT NOT NULL,
            file_name_folded TEXT NOT NULL DEFAULT '',
            uploaded_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_uploads_uploaded_at ON uploads(uploaded_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_column_mappings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS column_mappings (
            id TEXT PRIMARY KEY,
            original_column TEXT NOT NULL,
            mapped_field TEXT NOT NULL CHECK (mapped_field IN ('name', 'brand', 'barcode', 'images')),
            upload_id TEXT NOT NULL REFERENCES uploads(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_column_mappings_upload ON column_mappings(upload_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_products_table(pool: &SqlitePool) -> Result<()> {
    // images and attributes are JSON text; attribute lookups go through json_each.
    // The *_folded columns hold Unicode-lowercased copies for case-insensitive matching.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            brand TEXT NOT NULL DEFAULT '',
            barcode TEXT NOT NULL DEFAULT '',
            images TEXT NOT NULL DEFAULT '[]',
            attributes TEXT NOT NULL DEFAULT '{}',
            name_folded TEXT NOT NULL DEFAULT '',
            brand_folded TEXT NOT NULL DEFAULT '',
            barcode_folded TEXT NOT NULL DEFAULT '',
            attributes_folded TEXT NOT NULL DEFAULT '{}',
            upload_id TEXT NOT NULL REFERENCES uploads(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_upload ON products(upload_id)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_attribute_definitions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS attribute_definitions (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            unit TEXT,
            options TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Bring version 1 databases up to date
///
/// Adds the case-folded columns that version 1 lacked and fills them from
/// the existing rows.
async fn add_folded_columns(pool: &SqlitePool) -> Result<()> {
    if !has_column(pool, "uploads", "file_name_folded").await? {
        sqlx::query("ALTER TABLE uploads ADD COLUMN file_name_folded TEXT NOT NULL DEFAULT ''")
            .execute(pool)
            .await?;

        let rows = sqlx::query("SELECT id, file_name FROM uploads")
            .fetch_all(pool)
            .await?;
        for row in &rows {
            let file_name: String = row.get("file_name");
            sqlx::query("UPDATE uploads SET file_name_folded = ? WHERE id = ?")
                .bind(fold_case(&file_name))
                .bind(row.get::<String, _>("id"))
                .execute(pool)
                .await?;
        }
        info!("Added uploads.file_name_folded ({} rows)", rows.len());
    }

    if !has_column(pool, "products", "attributes_folded").await? {
        for (column, default) in [
            ("name_folded", "''"),
            ("brand_folded", "''"),
            ("barcode_folded", "''"),
            ("attributes_folded", "'{}'"),
        ] {
            sqlx::query(&format!(
                "ALTER TABLE products ADD COLUMN {} TEXT NOT NULL DEFAULT {}",
                column, default
            ))
            .execute(pool)
            .await?;
        }

        let rows = sqlx::query("SELECT id, name, brand, barcode, attributes FROM products")
            .fetch_all(pool)
            .await?;
        for row in &rows {
            let attributes: AttributeDocument =
                serde_json::from_str(&row.get::<String, _>("attributes"))?;
            sqlx::query(
                r#"
                UPDATE products
                SET name_folded = ?, brand_folded = ?, barcode_folded = ?, attributes_folded = ?
                WHERE id = ?
                "#,
            )
            .bind(fold_case(&row.get::<String, _>("name")))
            .bind(fold_case(&row.get::<String, _>("brand")))
            .bind(fold_case(&row.get::<String, _>("barcode")))
            .bind(serde_json::to_string(&fold_document(&attributes))?)
            .bind(row.get::<String, _>("id"))
            .execute(pool)
            .await?;
        }
        info!("Added products case-folded columns ({} rows)", rows.len());
    }

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .any(|row| row.get::<String, _>("name") == column))
}
