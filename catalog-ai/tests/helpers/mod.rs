//! Shared test helpers: scripted completion service, test app, multipart bodies

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use catalog_ai::services::{CompletionError, TextCompletion};
use catalog_ai::AppState;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

type Responder = dyn Fn(&str) -> Result<String, CompletionError> + Send + Sync;

/// Completion service answering from a closure over the prompt
pub struct MockCompletion {
    responder: Box<Responder>,
    calls: AtomicUsize,
}

impl MockCompletion {
    pub fn new(
        responder: impl Fn(&str) -> Result<String, CompletionError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always replies with the same text
    pub fn replying(reply: &str) -> Self {
        let reply = reply.to_string();
        Self::new(move |_| Ok(reply.clone()))
    }

    /// Always fails as an unconfigured client would
    pub fn unavailable() -> Self {
        Self::new(|_| Err(CompletionError::NotConfigured))
    }

    /// Column mapping prompts get a standard mapping; enrichment prompts
    /// go to `enrich`
    pub fn catalog(
        enrich: impl Fn(&str) -> Result<String, CompletionError> + Send + Sync + 'static,
    ) -> Self {
        Self::new(move |prompt| {
            if prompt.contains("map CSV column names") {
                Ok(r#"```json
{"name": "Product Name", "brand": "Brand", "barcode": "Barcode", "images": "Images"}
```"#
                    .to_string())
            } else {
                enrich(prompt)
            }
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextCompletion for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.responder)(prompt)
    }
}

/// In-memory database with the full schema
pub async fn test_pool() -> SqlitePool {
    catalog_common::db::init_memory_database()
        .await
        .expect("Failed to create in-memory database")
}

/// Router over an in-memory database
pub async fn create_test_app(completion: MockCompletion) -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone(), Arc::new(completion), true);
    (catalog_ai::build_router(state), pool)
}

pub const BOUNDARY: &str = "catalog-test-boundary";

/// multipart/form-data body with a single file field
pub fn multipart_body(field: &str, file_name: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(file_name: &str, content: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body("file", file_name, content)))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Three data rows: one valid, one duplicate barcode, one missing name
pub const THREE_ROW_CSV: &str = "Product Name,Brand,Barcode,Images\n\
Air Max,Nike,ABC123,http://a.png; http://b.png ; \n\
Air Max Copy,Nike,ABC123,\n\
,Adidas,XYZ789,\n";

/// Four valid products with distinct barcodes
pub const CATALOG_CSV: &str = "Product Name,Brand,Barcode,Images\n\
Air Max,Nike,1001,http://img/airmax.png\n\
Court Classic,NIKE,1002,\n\
Nike Air Force,Nike Air,1003,\n\
Superstar,Adidas,1004,http://img/superstar.png\n";
