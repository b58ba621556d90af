//! Request bodies accepted by the HTTP API

use catalog_common::db::{AttributeDocument, AttributeType};
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Distinguish an absent field from an explicit `null`
///
/// Used with `#[serde(default)]`: absent → `None`, `null` → `Some(None)`.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttributeRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

/// Partial attribute definition update
///
/// `unit` and `options` can be cleared with an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAttributeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub attr_type: Option<AttributeType>,
    #[serde(default, deserialize_with = "nullable")]
    pub unit: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub options: Option<Option<Vec<String>>>,
}

/// Definitions to initialize on every product of an upload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeAttributesRequest {
    pub attribute_ids: Vec<Uuid>,
}

/// Optional product subset to enrich; absent means the whole upload
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichRequest {
    #[serde(default)]
    pub product_ids: Option<Vec<Uuid>>,
}

/// Partial product update
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Merged into the existing document
    #[serde(default)]
    pub attributes: Option<AttributeDocument>,
}
