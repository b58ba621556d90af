//! Service-level tests for the ingestion → initialization → enrichment flow

mod helpers;

use catalog_ai::db::{attributes, products, uploads};
use catalog_ai::services::{AttributeInitializer, EnrichmentEngine, IngestionService};
use catalog_common::db::{AttributeDefinition, AttributeType};
use helpers::*;
use uuid::Uuid;

async fn ingest(pool: &sqlx::SqlitePool, completion: &MockCompletion) -> Uuid {
    IngestionService::new(pool, completion)
        .ingest("catalog.csv", CATALOG_CSV.as_bytes())
        .await
        .unwrap()
        .upload_id
}

async fn define(pool: &sqlx::SqlitePool, name: &str) -> Uuid {
    let definition = AttributeDefinition {
        id: Uuid::new_v4(),
        name: name.to_string(),
        attr_type: AttributeType::ShortText,
        unit: None,
        options: None,
    };
    attributes::save_definition(pool, &definition).await.unwrap();
    definition.id
}

#[tokio::test]
async fn test_three_row_upload_end_to_end() {
    let pool = test_pool().await;
    let completion = MockCompletion::catalog(|_| Ok("{}".into()));

    let result = IngestionService::new(&pool, &completion)
        .ingest("three.csv", THREE_ROW_CSV.as_bytes())
        .await
        .unwrap();

    assert_eq!(result.count, 1);
    assert_eq!(result.total_rows, 3);
    assert_eq!(result.errors.len(), 2);
    assert_eq!(uploads::count_products(&pool, result.upload_id).await.unwrap(), 1);
    assert_eq!(uploads::load_mappings(&pool, result.upload_id).await.unwrap().len(), 4);
    assert_eq!(completion.calls(), 1);
}

#[tokio::test]
async fn test_enrichment_never_overwrites_populated_values() {
    let pool = test_pool().await;
    let completion = MockCompletion::catalog(|_| {
        Ok(r#"{"color": "green", "material": "leather", "origin": "Vietnam"}"#.into())
    });
    let upload_id = ingest(&pool, &completion).await;

    let color = define(&pool, "Color").await;
    let material = define(&pool, "Material").await;
    AttributeInitializer::new(&pool)
        .initialize(upload_id, &[color, material])
        .await
        .unwrap();

    let mut all = products::load_products_for_upload(&pool, upload_id, None).await.unwrap();
    let air_max = all.iter_mut().find(|p| p.name == "Air Max").unwrap();
    air_max.attributes.insert("color".into(), Some("red".into()));
    products::save_products(&pool, &all).await.unwrap();

    let enriched = EnrichmentEngine::new(&pool, &completion)
        .enrich(upload_id, None)
        .await
        .unwrap();
    assert_eq!(enriched, 4);

    let all = products::load_products_for_upload(&pool, upload_id, None).await.unwrap();
    let air_max = all.iter().find(|p| p.name == "Air Max").unwrap();
    assert_eq!(air_max.attributes["color"], Some("red".to_string()));
    assert_eq!(air_max.attributes["material"], Some("leather".to_string()));
    assert_eq!(air_max.attributes["origin"], Some("Vietnam".to_string()));

    let superstar = all.iter().find(|p| p.name == "Superstar").unwrap();
    assert_eq!(superstar.attributes["color"], Some("green".to_string()));
}

#[tokio::test]
async fn test_complete_products_skip_the_completion_call() {
    let pool = test_pool().await;
    let completion = MockCompletion::catalog(|_| Ok(r#"{"color": "blue"}"#.into()));
    let upload_id = ingest(&pool, &completion).await;
    let calls_after_ingest = completion.calls();

    // No attributes initialized: nothing is missing anywhere
    let enriched = EnrichmentEngine::new(&pool, &completion)
        .enrich(upload_id, None)
        .await
        .unwrap();

    assert_eq!(enriched, 4);
    assert_eq!(completion.calls(), calls_after_ingest);
}

#[tokio::test]
async fn test_enrichment_subset_and_failures() {
    let pool = test_pool().await;
    let completion = MockCompletion::catalog(|prompt| {
        if prompt.contains("Name: Court Classic") {
            Ok("this is not json".into())
        } else {
            Ok(r#"{"color": "blue"}"#.into())
        }
    });
    let upload_id = ingest(&pool, &completion).await;
    let color = define(&pool, "color").await;
    AttributeInitializer::new(&pool)
        .initialize(upload_id, &[color])
        .await
        .unwrap();

    let all = products::load_products_for_upload(&pool, upload_id, None).await.unwrap();
    let court = all.iter().find(|p| p.name == "Court Classic").unwrap().id;
    let superstar = all.iter().find(|p| p.name == "Superstar").unwrap().id;

    let enriched = EnrichmentEngine::new(&pool, &completion)
        .enrich(upload_id, Some(&[court, superstar][..]))
        .await
        .unwrap();
    assert_eq!(enriched, 2);

    let all = products::load_products_for_upload(&pool, upload_id, None).await.unwrap();
    for product in &all {
        let expected = if product.id == superstar {
            Some("blue".to_string())
        } else {
            None
        };
        assert_eq!(product.attributes["color"], expected, "{}", product.name);
    }
}

#[tokio::test]
async fn test_enrichment_with_ids_from_other_upload_is_not_found() {
    let pool = test_pool().await;
    let completion = MockCompletion::unavailable();
    let upload_id = ingest(&pool, &completion).await;

    let err = EnrichmentEngine::new(&pool, &completion)
        .enrich(upload_id, Some(&[Uuid::new_v4()][..]))
        .await
        .unwrap_err();
    assert!(matches!(err, catalog_common::Error::NotFound(_)));

    // An empty id list means the whole upload
    let enriched = EnrichmentEngine::new(&pool, &completion)
        .enrich(upload_id, Some(&[][..]))
        .await
        .unwrap();
    assert_eq!(enriched, 4);
}
