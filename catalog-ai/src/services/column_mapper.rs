//! Column mapper
//!
//! Asks the completion service which spreadsheet header holds each
//! canonical product field. The answer is advisory: it is stored for
//! auditing, while row resolution matches headers directly.

use catalog_common::db::MappedField;
use catalog_common::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;

use super::completion_client::TextCompletion;

/// Canonical field → source header
pub type InferredMapping = BTreeMap<MappedField, String>;

/// Build the mapping prompt for the given headers
pub fn build_mapping_prompt(headers: &[String]) -> String {
    let headers_json = serde_json::to_string(headers).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are a smart assistant helping map CSV column names to standard fields in a product upload system.\n\
         \n\
         Look at the given CSV headers and decide which column holds each of these product fields:\n\
         - name (product title or product name)\n\
         - brand\n\
         - barcode\n\
         - images (URL or image-related column)\n\
         \n\
         Given these headers: {headers_json}\n\
         Return only a raw JSON object whose keys are \"name\", \"brand\", \"barcode\" and \"images\" \
         and whose values are the matching header, or null when no header matches.\n\
         \n\
         Example:\n\
         {{\"name\": \"Product Name\", \"brand\": \"Brand\", \"barcode\": \"Barcode\", \"images\": \"Images\"}}"
    )
}

/// Extract the first `{` through the last `}` of a reply
///
/// The service may wrap the object in prose or code fences.
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

/// Interpret a completion reply as a field mapping
///
/// Keys that are not canonical fields, non-string values, and values that
/// name no observed header are dropped. The stored header keeps the exact
/// spelling seen in the file.
pub fn parse_mapping_reply(reply: &str, headers: &[String]) -> Result<InferredMapping> {
    let json = extract_json_object(reply)
        .ok_or_else(|| Error::Mapping("No JSON object found in mapping response".to_string()))?;

    let object: serde_json::Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| Error::Mapping(format!("Mapping response is not a JSON object: {}", e)))?;

    let mut mapping = InferredMapping::new();
    for (key, value) in object {
        let Some(field) = MappedField::from_alias(&key) else {
            tracing::debug!(key = %key, "Discarding non-canonical mapping key");
            continue;
        };
        let Some(column) = value.as_str() else {
            continue;
        };

        let column = column.trim().to_lowercase();
        if let Some(header) = headers.iter().find(|h| h.to_lowercase() == column) {
            mapping.entry(field).or_insert_with(|| header.clone());
        }
    }

    Ok(mapping)
}

/// Column mapper backed by a text completion service
pub struct ColumnMapper<'a> {
    completion: &'a dyn TextCompletion,
}

impl<'a> ColumnMapper<'a> {
    pub fn new(completion: &'a dyn TextCompletion) -> Self {
        Self { completion }
    }

    /// Infer which header holds each canonical field
    ///
    /// Completion failures and unusable replies both surface as
    /// [`Error::Mapping`]; callers treat that as "no mapping available".
    pub async fn infer_mapping(&self, headers: &[String]) -> Result<InferredMapping> {
        let prompt = build_mapping_prompt(headers);

        let reply = self
            .completion
            .complete(&prompt)
            .await
            .map_err(|e| Error::Mapping(format!("Completion request failed: {}", e)))?;

        let mapping = parse_mapping_reply(&reply, headers)?;
        tracing::debug!(fields = mapping.len(), "Column mapping inferred");

        Ok(mapping)
    }
}
