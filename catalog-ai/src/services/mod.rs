//! Services for catalog-ai

pub mod attribute_initializer;
pub mod attribute_registry;
pub mod column_mapper;
pub mod completion_client;
pub mod enrichment;
pub mod ingestion;
pub mod product_editor;
pub mod spreadsheet_parser;

pub use attribute_initializer::AttributeInitializer;
pub use attribute_registry::AttributeRegistry;
pub use column_mapper::{ColumnMapper, InferredMapping};
pub use completion_client::{CompletionError, CompletionSettings, OpenAiClient, TextCompletion};
pub use enrichment::EnrichmentEngine;
pub use ingestion::IngestionService;
pub use product_editor::ProductEditor;
pub use spreadsheet_parser::{parse_spreadsheet, CellValue, ParsedSheet, SheetRow};
