//! Attribute registry
//!
//! CRUD over user-defined attribute definitions. Definitions are global;
//! deleting one leaves product attribute documents untouched.

use catalog_common::db::AttributeDefinition;
use catalog_common::{uuid_utils, Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::attributes;
use crate::models::{CreateAttributeRequest, UpdateAttributeRequest};

pub struct AttributeRegistry<'a> {
    db: &'a SqlitePool,
}

impl<'a> AttributeRegistry<'a> {
    pub fn new(db: &'a SqlitePool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<AttributeDefinition>> {
        attributes::list_definitions(self.db).await
    }

    pub async fn get(&self, id: Uuid) -> Result<AttributeDefinition> {
        attributes::load_definition(self.db, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn create(&self, request: CreateAttributeRequest) -> Result<AttributeDefinition> {
        let definition = AttributeDefinition {
            id: uuid_utils::generate(),
            name: validate_name(&request.name)?,
            attr_type: request.attr_type,
            unit: clean_unit(request.unit),
            options: request.options.map(clean_options),
        };

        attributes::save_definition(self.db, &definition).await?;
        tracing::info!(id = %definition.id, name = %definition.name, "Attribute definition created");

        Ok(definition)
    }

    /// Apply a partial update; absent fields keep their value
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateAttributeRequest,
    ) -> Result<AttributeDefinition> {
        let mut definition = self.get(id).await?;

        if let Some(name) = request.name {
            definition.name = validate_name(&name)?;
        }
        if let Some(attr_type) = request.attr_type {
            definition.attr_type = attr_type;
        }
        if let Some(unit) = request.unit {
            definition.unit = clean_unit(unit);
        }
        if let Some(options) = request.options {
            definition.options = options.map(clean_options);
        }

        attributes::save_definition(self.db, &definition).await?;
        tracing::info!(id = %id, "Attribute definition updated");

        Ok(definition)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !attributes::delete_definition(self.db, id).await? {
            return Err(not_found(id));
        }
        tracing::info!(id = %id, "Attribute definition deleted");
        Ok(())
    }
}

fn not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Attribute {} not found", id))
}

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Attribute name must not be empty".to_string()));
    }
    Ok(name.to_string())
}

fn clean_unit(unit: Option<String>) -> Option<String> {
    unit.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

/// Trim options and drop blank ones
fn clean_options(options: Vec<String>) -> Vec<String> {
    options
        .into_iter()
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}
