//! Product persistence and the filtered listing query
//!
//! `images` and `attributes` are stored as JSON text. Attribute filters,
//! free-text search and attribute sorting read the document through
//! SQLite's `json_each`.

use catalog_common::db::{fold_case, fold_document, AttributeDocument, Product};
use catalog_common::uuid_utils::parse_column;
use catalog_common::Result;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use super::like_pattern;
use crate::models::{FieldFilter, ProductPage, ProductQuery, SortKey};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.brand, p.barcode, p.images, p.attributes, p.upload_id";

/// Insert a product, or overwrite every field of an existing one
pub(crate) async fn upsert_product(conn: &mut SqliteConnection, product: &Product) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO products (
            id, name, brand, barcode, images, attributes, upload_id,
            name_folded, brand_folded, barcode_folded, attributes_folded
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            brand = excluded.brand,
            barcode = excluded.barcode,
            images = excluded.images,
            attributes = excluded.attributes,
            name_folded = excluded.name_folded,
            brand_folded = excluded.brand_folded,
            barcode_folded = excluded.barcode_folded,
            attributes_folded = excluded.attributes_folded
        "#,
    )
    .bind(product.id.to_string())
    .bind(&product.name)
    .bind(&product.brand)
    .bind(&product.barcode)
    .bind(serde_json::to_string(&product.images)?)
    .bind(serde_json::to_string(&product.attributes)?)
    .bind(product.upload_id.to_string())
    .bind(fold_case(&product.name))
    .bind(fold_case(&product.brand))
    .bind(fold_case(&product.barcode))
    .bind(serde_json::to_string(&fold_document(&product.attributes))?)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Save a set of products in one transaction
pub async fn save_products(pool: &SqlitePool, products: &[Product]) -> Result<()> {
    let mut tx = pool.begin().await?;
    for product in products {
        upsert_product(&mut tx, product).await?;
    }
    tx.commit().await?;

    Ok(())
}

/// Products of one upload, optionally restricted to the given ids
///
/// Ids that belong to another upload are silently ignored.
pub async fn load_products_for_upload(
    pool: &SqlitePool,
    upload_id: Uuid,
    ids: Option<&[Uuid]>,
) -> Result<Vec<Product>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM products p", PRODUCT_COLUMNS));
    qb.push(" WHERE p.upload_id = ").push_bind(upload_id.to_string());

    if let Some(ids) = ids {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        qb.push(" AND p.id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");
    }

    qb.push(" ORDER BY p.name, p.id");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(product_from_row).collect()
}

pub async fn load_product(pool: &SqlitePool, product_id: Uuid) -> Result<Option<Product>> {
    let row = sqlx::query(&format!("SELECT {} FROM products p WHERE p.id = ?", PRODUCT_COLUMNS))
        .bind(product_id.to_string())
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(product_from_row).transpose()
}

/// Run a listing query scoped to one upload
///
/// Returns the requested page plus the count of all matching products.
pub async fn query_products(
    pool: &SqlitePool,
    upload_id: Uuid,
    query: &ProductQuery,
) -> Result<ProductPage> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products p");
    push_conditions(&mut count_qb, upload_id, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM products p", PRODUCT_COLUMNS));
    push_conditions(&mut qb, upload_id, query);

    let direction = query.sort_order.as_sql();
    match &query.sort_by {
        SortKey::Column(column) => {
            qb.push(format!(" ORDER BY {} {}", column.as_sql(), direction));
        }
        SortKey::Attribute(key) => {
            qb.push(" ORDER BY (SELECT j.value FROM json_each(p.attributes) j WHERE j.key = ")
                .push_bind(key.clone())
                .push(format!(") {}", direction));
        }
    }
    qb.push(", p.id");
    qb.push(" LIMIT ").push_bind(query.limit);
    qb.push(" OFFSET ").push_bind(query.offset());

    let rows = qb.build().fetch_all(pool).await?;
    let items = rows.iter().map(product_from_row).collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        upload_id = %upload_id,
        total,
        returned = items.len(),
        "Product query executed"
    );

    Ok(ProductPage {
        total,
        items,
        page: query.page,
        limit: query.limit,
    })
}

/// WHERE clause shared by the count and page queries
///
/// Matching runs against the `*_folded` columns with a folded term.
fn push_conditions(qb: &mut QueryBuilder<'_, Sqlite>, upload_id: Uuid, query: &ProductQuery) {
    qb.push(" WHERE p.upload_id = ").push_bind(upload_id.to_string());

    if let Some(search) = &query.search {
        let pattern = like_pattern(&fold_case(search));
        qb.push(" AND (p.name_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR p.brand_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR p.barcode_folded LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR EXISTS (SELECT 1 FROM json_each(p.attributes_folded) j WHERE j.value LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\'))");
    }

    for filter in &query.filters {
        match filter {
            FieldFilter::Column { column, term } => {
                qb.push(format!(" AND {}_folded LIKE ", column.as_sql()))
                    .push_bind(like_pattern(&fold_case(term)))
                    .push(" ESCAPE '\\'");
            }
            FieldFilter::Attribute { key, term } => {
                qb.push(" AND EXISTS (SELECT 1 FROM json_each(p.attributes_folded) j WHERE j.key = ")
                    .push_bind(key.clone())
                    .push(" AND j.value LIKE ")
                    .push_bind(like_pattern(&fold_case(term)))
                    .push(" ESCAPE '\\')");
            }
        }
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    let id: String = row.get("id");
    let upload_id: String = row.get("upload_id");
    let images: String = row.get("images");
    let attributes: String = row.get("attributes");

    Ok(Product {
        id: parse_column("products.id", &id)?,
        name: row.get("name"),
        brand: row.get("brand"),
        barcode: row.get("barcode"),
        images: serde_json::from_str(&images)?,
        attributes: serde_json::from_str::<AttributeDocument>(&attributes)?,
        upload_id: parse_column("products.upload_id", &upload_id)?,
    })
}
