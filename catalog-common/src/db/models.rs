//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::db::document::AttributeDocument;
use crate::Error;

/// One ingested spreadsheet batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Upload {
    pub id: Uuid,
    pub file_name: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            uploaded_at: Utc::now(),
        }
    }
}

/// Canonical product field a spreadsheet column can map onto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappedField {
    Name,
    Brand,
    Barcode,
    Images,
}

impl MappedField {
    pub const ALL: [MappedField; 4] = [
        MappedField::Name,
        MappedField::Brand,
        MappedField::Barcode,
        MappedField::Images,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MappedField::Name => "name",
            MappedField::Brand => "brand",
            MappedField::Barcode => "barcode",
            MappedField::Images => "images",
        }
    }

    /// Interpret a key returned by the completion service
    ///
    /// Accepts the canonical names plus the spellings the prompt uses for
    /// them. Anything else is not a canonical field.
    pub fn from_alias(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "name" | "product name" | "product-name" | "product_name" | "title" => {
                Some(MappedField::Name)
            }
            "brand" => Some(MappedField::Brand),
            "barcode" => Some(MappedField::Barcode),
            "images" | "image" => Some(MappedField::Images),
            _ => None,
        }
    }
}

impl fmt::Display for MappedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappedField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MappedField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| Error::Internal(format!("Unknown mapped field: {}", s)))
    }
}

/// Inferred correspondence between a spreadsheet header and a product field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    pub id: Uuid,
    pub original_column: String,
    pub mapped_field: MappedField,
    pub upload_id: Uuid,
}

impl ColumnMapping {
    pub fn new(upload_id: Uuid, mapped_field: MappedField, original_column: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            original_column,
            mapped_field,
            upload_id,
        }
    }
}

/// Product row created from one spreadsheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub barcode: String,
    pub images: Vec<String>,
    pub attributes: AttributeDocument,
    pub upload_id: Uuid,
}

impl Product {
    /// New product with an empty attribute document
    pub fn new(
        upload_id: Uuid,
        name: String,
        brand: String,
        barcode: String,
        images: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            brand,
            barcode,
            images,
            attributes: AttributeDocument::new(),
            upload_id,
        }
    }
}

/// Data type of a user-defined attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    ShortText,
    LongText,
    RichText,
    Number,
    SingleSelect,
    MultiSelect,
    Measure,
}

impl AttributeType {
    pub const ALL: [AttributeType; 7] = [
        AttributeType::ShortText,
        AttributeType::LongText,
        AttributeType::RichText,
        AttributeType::Number,
        AttributeType::SingleSelect,
        AttributeType::MultiSelect,
        AttributeType::Measure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::ShortText => "short_text",
            AttributeType::LongText => "long_text",
            AttributeType::RichText => "rich_text",
            AttributeType::Number => "number",
            AttributeType::SingleSelect => "single_select",
            AttributeType::MultiSelect => "multi_select",
            AttributeType::Measure => "measure",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttributeType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown attribute type: {}", s)))
    }
}

/// User-defined attribute schema entry, independent of any upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeDefinition {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Meaningful for `measure`
    pub unit: Option<String>,
    /// Meaningful for `single_select` / `multi_select`
    pub options: Option<Vec<String>>,
}
