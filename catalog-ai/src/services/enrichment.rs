//! Enrichment engine
//!
//! Fills empty attribute values by asking the completion service about each
//! product. Calls for different products run concurrently and fail
//! independently; a failed product is left exactly as it was.

use catalog_common::db::{
    is_empty_value, missing_keys, normalize_document, normalize_key, value_to_attribute,
    AttributeDocument, Product,
};
use catalog_common::{Error, Result};
use futures::future::join_all;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::completion_client::TextCompletion;
use crate::db::products;

/// Prompt asking for the given missing attributes of one product
pub fn build_enrichment_prompt(product: &Product, missing: &[String]) -> String {
    let first_image = product.images.first().map(String::as_str).unwrap_or("");

    format!(
        "Given the product below, fill in only the following missing attributes: {}.\n\
         \n\
         Name: {}\n\
         Brand: {}\n\
         Barcode: {}\n\
         Image: {}\n\
         \n\
         Return a valid JSON with only the missing attributes.",
        missing.join(", "),
        product.name,
        product.brand,
        product.barcode,
        first_image
    )
}

/// Parse a completion reply into a JSON object, ignoring markdown fences
pub fn parse_enrichment_reply(reply: &str) -> Result<Map<String, Value>> {
    let cleaned = reply.replace("```json", "").replace("```", "");
    let value: Value = serde_json::from_str(cleaned.trim())?;

    match value {
        Value::Object(object) => Ok(object),
        other => Err(Error::Parse(format!(
            "Expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Merge returned values into an attribute document
///
/// Keys on both sides are normalized. A returned value only replaces an
/// existing value that is empty; keys the document lacked are added.
pub fn merge_attributes(existing: AttributeDocument, returned: &Map<String, Value>) -> AttributeDocument {
    let mut merged = normalize_document(existing);

    for (key, value) in returned {
        let key = normalize_key(key);
        if key.is_empty() {
            continue;
        }
        let value = value_to_attribute(value);

        match merged.get(&key) {
            Some(current) if !is_empty_value(current) => {}
            _ => {
                merged.insert(key, value);
            }
        }
    }

    merged
}

pub struct EnrichmentEngine<'a> {
    db: &'a SqlitePool,
    completion: &'a dyn TextCompletion,
}

impl<'a> EnrichmentEngine<'a> {
    pub fn new(db: &'a SqlitePool, completion: &'a dyn TextCompletion) -> Self {
        Self { db, completion }
    }

    /// Enrich the products of an upload, or the given subset of them
    ///
    /// An empty id list means the whole upload. Returns the number of
    /// products processed, enriched or not.
    pub async fn enrich(&self, upload_id: Uuid, product_ids: Option<&[Uuid]>) -> Result<usize> {
        let product_ids = product_ids.filter(|ids| !ids.is_empty());
        let candidates = products::load_products_for_upload(self.db, upload_id, product_ids).await?;

        if candidates.is_empty() {
            return Err(Error::NotFound("No products found for enrichment".to_string()));
        }

        let results = join_all(candidates.into_iter().map(|p| self.enrich_product(p))).await;
        let filled = results.iter().filter(|(_, changed)| *changed).count();
        let enriched: Vec<Product> = results.into_iter().map(|(product, _)| product).collect();

        products::save_products(self.db, &enriched).await?;

        tracing::info!(
            upload_id = %upload_id,
            processed = enriched.len(),
            filled,
            "Enrichment complete"
        );

        Ok(enriched.len())
    }

    /// Returns the product and whether its attributes were changed
    async fn enrich_product(&self, mut product: Product) -> (Product, bool) {
        let missing = missing_keys(&product.attributes);
        if missing.is_empty() {
            return (product, false);
        }

        let prompt = build_enrichment_prompt(&product, &missing);

        let returned = match self.completion.complete(&prompt).await {
            Ok(reply) => match parse_enrichment_reply(&reply) {
                Ok(object) => object,
                Err(e) => {
                    tracing::warn!(product_id = %product.id, error = %e, "Unusable enrichment reply");
                    return (product, false);
                }
            },
            Err(e) => {
                tracing::warn!(product_id = %product.id, error = %e, "Enrichment request failed");
                return (product, false);
            }
        };

        tracing::debug!(product_id = %product.id, returned = returned.len(), "Enrichment reply parsed");

        let merged = merge_attributes(std::mem::take(&mut product.attributes), &returned);
        product.attributes = merged;

        (product, true)
    }
}
