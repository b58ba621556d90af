//! Attribute initializer
//!
//! Attaches attribute definitions to an upload by adding a `null`
//! placeholder for each definition name to every product's document.

use catalog_common::db::{normalize_document, normalize_key};
use catalog_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::{attributes, products};

pub struct AttributeInitializer<'a> {
    db: &'a SqlitePool,
}

impl<'a> AttributeInitializer<'a> {
    pub fn new(db: &'a SqlitePool) -> Self {
        Self { db }
    }

    /// Add placeholders for the given definitions to every product of an upload
    ///
    /// Existing values are never overwritten, so repeating the call changes
    /// nothing. Unknown definition ids are ignored. Returns the number of
    /// products processed.
    pub async fn initialize(&self, upload_id: Uuid, attribute_ids: &[Uuid]) -> Result<usize> {
        let definitions = attributes::load_definitions(self.db, attribute_ids).await?;
        let keys: Vec<String> = definitions.iter().map(|d| normalize_key(&d.name)).collect();

        let mut products = products::load_products_for_upload(self.db, upload_id, None).await?;
        if products.is_empty() {
            return Err(Error::NotFound(format!(
                "No products found for upload {}",
                upload_id
            )));
        }

        for product in &mut products {
            let mut document = normalize_document(std::mem::take(&mut product.attributes));
            for key in &keys {
                document.entry(key.clone()).or_insert(None);
            }
            product.attributes = document;
        }

        products::save_products(self.db, &products).await?;

        tracing::info!(
            upload_id = %upload_id,
            products = products.len(),
            attributes = ?keys,
            "Attributes initialized"
        );

        Ok(products.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::uploads::save_ingestion;
    use catalog_common::db::{AttributeDefinition, AttributeType, Product, Upload};

    async fn definition(pool: &SqlitePool, name: &str) -> Uuid {
        let def = AttributeDefinition {
            id: Uuid::new_v4(),
            name: name.to_string(),
            attr_type: AttributeType::ShortText,
            unit: None,
            options: None,
        };
        attributes::save_definition(pool, &def).await.unwrap();
        def.id
    }

    #[tokio::test]
    async fn test_initialize_adds_null_placeholders_without_overwriting() {
        let pool = catalog_common::db::init_memory_database().await.unwrap();
        let upload = Upload::new("products.csv");
        let mut shirt = Product::new(upload.id, "Shirt".into(), String::new(), String::new(), vec![]);
        shirt.attributes.insert("color".into(), Some("blue".into()));
        let hat = Product::new(upload.id, "Hat".into(), String::new(), String::new(), vec![]);
        save_ingestion(&pool, &upload, &[], &[shirt.clone(), hat]).await.unwrap();

        let color = definition(&pool, " Color ").await;
        let size = definition(&pool, "Size").await;
        let initializer = AttributeInitializer::new(&pool);

        let count = initializer
            .initialize(upload.id, &[color, size, Uuid::new_v4()])
            .await
            .unwrap();
        assert_eq!(count, 2);

        let first = products::load_products_for_upload(&pool, upload.id, None).await.unwrap();
        let loaded_shirt = first.iter().find(|p| p.id == shirt.id).unwrap();
        assert_eq!(loaded_shirt.attributes["color"], Some("blue".to_string()));
        assert_eq!(loaded_shirt.attributes["size"], None);
        assert!(first.iter().all(|p| p.attributes.len() == 2));

        // Second run leaves everything as it was
        initializer.initialize(upload.id, &[color, size]).await.unwrap();
        let second = products::load_products_for_upload(&pool, upload.id, None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upload_without_products_is_not_found() {
        let pool = catalog_common::db::init_memory_database().await.unwrap();
        let upload = Upload::new("empty.csv");
        save_ingestion(&pool, &upload, &[], &[]).await.unwrap();

        let err = AttributeInitializer::new(&pool)
            .initialize(upload.id, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
