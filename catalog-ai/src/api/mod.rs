//! HTTP API handlers for catalog-ai

pub mod attributes;
pub mod health;
pub mod products;
pub mod uploads;

pub use attributes::attribute_routes;
pub use health::health_routes;
pub use products::product_routes;
pub use uploads::upload_routes;
