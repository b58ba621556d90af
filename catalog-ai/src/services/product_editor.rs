//! Direct product edits

use catalog_common::db::{normalize_document, normalize_key, Product};
use catalog_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::products;
use crate::models::ProductPatch;

/// Apply a patch to a product in memory
///
/// Attribute keys are merged over the existing document; a `null` value
/// clears that key's value without removing the key.
pub fn apply_patch(product: &mut Product, patch: ProductPatch) -> Result<()> {
    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Product name must not be empty".to_string()));
        }
        product.name = name.to_string();
    }
    if let Some(brand) = patch.brand {
        product.brand = brand.trim().to_string();
    }
    if let Some(barcode) = patch.barcode {
        product.barcode = barcode.trim().to_string();
    }
    if let Some(images) = patch.images {
        product.images = images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
    }
    if let Some(attributes) = patch.attributes {
        let mut document = normalize_document(std::mem::take(&mut product.attributes));
        for (key, value) in attributes {
            let key = normalize_key(&key);
            if !key.is_empty() {
                document.insert(key, value);
            }
        }
        product.attributes = document;
    }

    Ok(())
}

pub struct ProductEditor<'a> {
    db: &'a SqlitePool,
}

impl<'a> ProductEditor<'a> {
    pub fn new(db: &'a SqlitePool) -> Self {
        Self { db }
    }

    /// Patch a product and return its new state
    pub async fn update(&self, product_id: Uuid, patch: ProductPatch) -> Result<Product> {
        let mut product = products::load_product(self.db, product_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Product with id {} not found", product_id)))?;

        apply_patch(&mut product, patch)?;
        products::save_products(self.db, std::slice::from_ref(&product)).await?;

        tracing::debug!(product_id = %product_id, "Product updated");

        Ok(product)
    }
}
