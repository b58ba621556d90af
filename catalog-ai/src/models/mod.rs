//! Request and response models for catalog-ai

pub mod ingest_result;
pub mod product_query;
pub mod requests;

pub use ingest_result::{IngestionResult, RowError};
pub use product_query::{
    FieldFilter, ProductColumn, ProductPage, ProductQuery, SortKey, SortOrder,
};
pub use requests::{
    CreateAttributeRequest, EnrichRequest, InitializeAttributesRequest, ProductPatch,
    UpdateAttributeRequest,
};
