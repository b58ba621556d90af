//! Product listing query: paging, sorting and filters
//!
//! Built from the raw query string map. Nothing is rejected: unknown keys
//! become attribute filters, bad sort orders fall back to ascending and
//! out-of-range paging values are clamped.

use catalog_common::db::{normalize_key, Product};
use serde::Serialize;
use std::collections::HashMap;

use crate::pagination::{Pagination, DEFAULT_LIMIT};

/// Query keys that are never interpreted as field filters
const RESERVED_KEYS: [&str; 5] = ["page", "limit", "sortBy", "sortOrder", "search"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Case-insensitive; anything other than "desc" is ascending
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Product table column usable in filters and sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductColumn {
    Id,
    Name,
    Brand,
    Barcode,
}

impl ProductColumn {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ProductColumn::Id => "p.id",
            ProductColumn::Name => "p.name",
            ProductColumn::Brand => "p.brand",
            ProductColumn::Barcode => "p.barcode",
        }
    }

    /// Columns that accept substring filters
    fn filterable(key: &str) -> Option<Self> {
        match key {
            "name" => Some(ProductColumn::Name),
            "brand" => Some(ProductColumn::Brand),
            "barcode" => Some(ProductColumn::Barcode),
            _ => None,
        }
    }

    fn sortable(key: &str) -> Option<Self> {
        match key {
            "id" => Some(ProductColumn::Id),
            other => Self::filterable(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Column(ProductColumn),
    /// Sort by the value stored under this (normalized) attribute key
    Attribute(String),
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Column(ProductColumn::Name)
    }
}

/// One AND-combined substring condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    Column { column: ProductColumn, term: String },
    Attribute { key: String, term: String },
}

/// Fully interpreted listing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: i64,
    pub limit: i64,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub search: Option<String>,
    pub filters: Vec<FieldFilter>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            sort_by: SortKey::default(),
            sort_order: SortOrder::Asc,
            search: None,
            filters: Vec::new(),
        }
    }
}

impl ProductQuery {
    /// Interpret a raw query-string map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let Pagination { page, limit } = Pagination::from_raw(
            params.get("page").map(String::as_str),
            params.get("limit").map(String::as_str),
        );

        let sort_by = match params.get("sortBy").map(|s| s.trim()).filter(|s| !s.is_empty()) {
            Some(key) => match ProductColumn::sortable(key) {
                Some(column) => SortKey::Column(column),
                None => SortKey::Attribute(normalize_key(key)),
            },
            None => SortKey::default(),
        };

        let sort_order = SortOrder::parse(params.get("sortOrder").map(String::as_str));

        let search = params
            .get("search")
            .filter(|s| !s.is_empty())
            .cloned();

        let mut filters: Vec<FieldFilter> = params
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| match ProductColumn::filterable(key) {
                Some(column) => FieldFilter::Column {
                    column,
                    term: value.clone(),
                },
                None => FieldFilter::Attribute {
                    key: normalize_key(key),
                    term: value.clone(),
                },
            })
            .collect();

        // HashMap order is random; keep the generated SQL stable
        filters.sort_by(|a, b| filter_sort_key(a).cmp(&filter_sort_key(b)));

        Self {
            page,
            limit,
            sort_by,
            sort_order,
            search,
            filters,
        }
    }

    pub fn offset(&self) -> i64 {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
        .offset()
    }
}

fn filter_sort_key(filter: &FieldFilter) -> (u8, &str, &str) {
    match filter {
        FieldFilter::Column { column, term } => (0, column.as_sql(), term),
        FieldFilter::Attribute { key, term } => (1, key, term),
    }
}

/// One page of products
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    /// Matching products ignoring pagination
    pub total: i64,
    pub items: Vec<Product>,
    pub page: i64,
    pub limit: i64,
}
