//! Test utilities for database and HTTP testing.
//!
//! This module provides utilities for setting up in-memory SQLite databases
//! with migrations applied, building the application router over them, and
//! seeding catalog fixtures.

#![allow(dead_code)]

use anyhow::Result;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use migration::{Migrator, MigratorTrait};
use review_collector::{
    catalog::CatalogService,
    config::{AggregateStrategy, AppConfig},
    models::{Platform, product, review},
    ratings::Rating,
    repositories::{NewProduct, NewReview},
    server::{AppState, create_app},
};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::Value;

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is capped at one connection; every new connection would open a
/// fresh, empty in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Configuration used by HTTP tests.
pub fn test_config(strategy: AggregateStrategy) -> AppConfig {
    AppConfig {
        profile: "test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        aggregate_strategy: strategy,
        ..Default::default()
    }
}

/// Catalog service over a fresh test database.
pub async fn setup_catalog(strategy: AggregateStrategy) -> Result<CatalogService> {
    let db = setup_test_db().await?;
    Ok(CatalogService::new(db, strategy))
}

/// Router plus the state behind it, over a fresh test database.
pub async fn setup_test_app(strategy: AggregateStrategy) -> Result<(Router, AppState)> {
    let db = setup_test_db().await?;
    let state = AppState::new(test_config(strategy), db);
    Ok((create_app(state.clone()), state))
}

pub fn new_product(name: &str, platform: Platform) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        url: format!(
            "https://{}.co.id/{}",
            platform,
            name.to_lowercase().replace(' ', "-")
        ),
        platform,
        image_url: None,
        price: None,
    }
}

pub fn new_review(reviewer_name: &str, rating: i32) -> NewReview {
    NewReview {
        reviewer_name: reviewer_name.to_string(),
        rating: Rating::try_from(rating).expect("rating in range"),
        comment: format!("{} gives it {} stars", reviewer_name, rating),
    }
}

/// Creates a product and attaches one review per rating.
pub async fn seed_product(
    catalog: &CatalogService,
    name: &str,
    platform: Platform,
    ratings: &[i32],
) -> Result<(product::Model, Vec<review::Model>)> {
    let product = catalog.create_product(new_product(name, platform)).await?;
    let mut reviews = Vec::with_capacity(ratings.len());
    for (i, rating) in ratings.iter().enumerate() {
        let reviewer = format!("Reviewer {}", i + 1);
        reviews.push(catalog.add_review(product.id, new_review(&reviewer, *rating)).await?);
    }
    Ok((product, reviews))
}

/// Builds a JSON request.
pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Builds a body-less GET request.
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

/// Reads a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("json body")
}
