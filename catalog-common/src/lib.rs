//! # Catalog Common Library
//!
//! Shared code for the catalog services including:
//! - Persisted models (uploads, products, column mappings, attribute definitions)
//! - Attribute document key normalization
//! - Database initialization
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;
pub mod uuid_utils;

pub use error::{Error, Result};
