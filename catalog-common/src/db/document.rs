//! Attribute document helpers
//!
//! A product's attribute document is an open key → value map whose values
//! are strings or null. Keys are stored trimmed and lowercased so that
//! "Color" and " color" never coexist.

use serde_json::Value;
use std::collections::BTreeMap;

/// Open key → value structure holding enrichable product fields
pub type AttributeDocument = BTreeMap<String, Option<String>>;

/// Normalize an attribute key (trim + lowercase)
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Unicode case folding used for every case-insensitive comparison
///
/// SQLite's `LIKE` only folds ASCII, so both stored text and search terms
/// go through this before they meet in a query.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Copy of a document with every value case-folded
pub fn fold_document(document: &AttributeDocument) -> AttributeDocument {
    document
        .iter()
        .map(|(key, value)| (key.clone(), value.as_deref().map(fold_case)))
        .collect()
}

/// True when an attribute value still needs filling (null or "")
pub fn is_empty_value(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

/// Keys whose values are null or empty, in key order
pub fn missing_keys(document: &AttributeDocument) -> Vec<String> {
    document
        .iter()
        .filter(|(_, value)| is_empty_value(value))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Re-key a document with normalized keys
///
/// When two keys collapse onto the same normalized key, a populated value
/// is kept over an empty one.
pub fn normalize_document(document: AttributeDocument) -> AttributeDocument {
    let mut normalized = AttributeDocument::new();
    for (key, value) in document {
        insert_preferring_populated(&mut normalized, normalize_key(&key), value);
    }
    normalized
}

fn insert_preferring_populated(
    document: &mut AttributeDocument,
    key: String,
    value: Option<String>,
) {
    match document.get(&key) {
        Some(existing) if !is_empty_value(existing) && is_empty_value(&value) => {}
        _ => {
            document.insert(key, value);
        }
    }
}

/// Convert a JSON value into an attribute value
///
/// Strings are kept, null stays null, arrays are joined with ", ", other
/// scalars and objects are rendered as JSON text.
pub fn value_to_attribute(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(value_to_attribute)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Color "), "color");
        assert_eq!(normalize_key("SIZE"), "size");
    }

    #[test]
    fn test_missing_keys_treats_empty_string_as_missing() {
        let mut doc = AttributeDocument::new();
        doc.insert("color".into(), None);
        doc.insert("size".into(), Some(String::new()));
        doc.insert("weight".into(), Some("2kg".into()));

        assert_eq!(missing_keys(&doc), vec!["color".to_string(), "size".to_string()]);
    }

    #[test]
    fn test_normalize_document_prefers_populated_value() {
        let mut doc = AttributeDocument::new();
        doc.insert("Color".into(), Some("red".into()));
        doc.insert("color".into(), None);
        doc.insert(" Size".into(), Some("M".into()));

        let normalized = normalize_document(doc);
        assert_eq!(normalized.len(), 2);
        assert_eq!(normalized["color"], Some("red".to_string()));
        assert_eq!(normalized["size"], Some("M".to_string()));
    }

    #[test]
    fn test_value_to_attribute() {
        assert_eq!(value_to_attribute(&json!(null)), None);
        assert_eq!(value_to_attribute(&json!("red")), Some("red".into()));
        assert_eq!(value_to_attribute(&json!(12.5)), Some("12.5".into()));
        assert_eq!(value_to_attribute(&json!(true)), Some("true".into()));
        assert_eq!(
            value_to_attribute(&json!(["cotton", "wool"])),
            Some("cotton, wool".into())
        );
    }

    #[test]
    fn test_fold_case_handles_non_ascii() {
        assert_eq!(fold_case("ÖLZ Éclair GRÜN"), "ölz éclair grün");

        let mut doc = AttributeDocument::new();
        doc.insert("color".into(), Some("GRÜN".into()));
        doc.insert("size".into(), None);
        let folded = fold_document(&doc);
        assert_eq!(folded["color"], Some("grün".to_string()));
        assert_eq!(folded["size"], None);
    }
}
