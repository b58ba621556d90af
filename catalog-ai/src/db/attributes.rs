//! Attribute definition persistence

use catalog_common::db::{AttributeDefinition, AttributeType};
use catalog_common::uuid_utils::parse_column;
use catalog_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use uuid::Uuid;

/// Insert or fully overwrite a definition
pub async fn save_definition(pool: &SqlitePool, definition: &AttributeDefinition) -> Result<()> {
    let options = definition
        .options
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    sqlx::query(
        r#"
        INSERT INTO attribute_definitions (id, name, type, unit, options)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            type = excluded.type,
            unit = excluded.unit,
            options = excluded.options
        "#,
    )
    .bind(definition.id.to_string())
    .bind(&definition.name)
    .bind(definition.attr_type.as_str())
    .bind(&definition.unit)
    .bind(options)
    .execute(pool)
    .await?;

    Ok(())
}

/// All definitions ordered by name
pub async fn list_definitions(pool: &SqlitePool) -> Result<Vec<AttributeDefinition>> {
    let rows = sqlx::query(
        "SELECT id, name, type, unit, options FROM attribute_definitions ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(definition_from_row).collect()
}

pub async fn load_definition(
    pool: &SqlitePool,
    definition_id: Uuid,
) -> Result<Option<AttributeDefinition>> {
    let row = sqlx::query("SELECT id, name, type, unit, options FROM attribute_definitions WHERE id = ?")
        .bind(definition_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(definition_from_row).transpose()
}

/// Definitions matching the given ids; unknown ids are skipped
pub async fn load_definitions(
    pool: &SqlitePool,
    definition_ids: &[Uuid],
) -> Result<Vec<AttributeDefinition>> {
    if definition_ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, name, type, unit, options FROM attribute_definitions WHERE id IN (",
    );
    let mut separated = qb.separated(", ");
    for id in definition_ids {
        separated.push_bind(id.to_string());
    }
    separated.push_unseparated(") ORDER BY name, id");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(definition_from_row).collect()
}

/// Returns false when no such definition exists
pub async fn delete_definition(pool: &SqlitePool, definition_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM attribute_definitions WHERE id = ?")
        .bind(definition_id.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn definition_from_row(row: &SqliteRow) -> Result<AttributeDefinition> {
    let id: String = row.get("id");
    let attr_type: String = row.get("type");
    let options: Option<String> = row.get("options");

    Ok(AttributeDefinition {
        id: parse_column("attribute_definitions.id", &id)?,
        name: row.get("name"),
        attr_type: attr_type.parse::<AttributeType>()?,
        unit: row.get("unit"),
        options: options.as_deref().map(serde_json::from_str::<Vec<String>>).transpose()?,
    })
}
