//! # Product Repository
//!
//! This module contains the repository implementation for Product entities:
//! inserts, lookups, dashboard listings and aggregate updates.

use crate::error::RepositoryError;
use crate::models::Platform;
use crate::models::product::{
    ActiveModel as ProductActiveModel, Column, Entity as Product, Model as ProductModel,
};
use crate::ratings::RatingAggregate;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

/// Validated data for a new product row
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Display name, already trimmed
    pub name: String,
    /// Absolute listing URL
    pub url: String,
    /// Source marketplace
    pub platform: Platform,
    /// Optional image URL
    pub image_url: Option<String>,
    /// Optional display price
    pub price: Option<String>,
}

/// Repository for Product database operations
pub struct ProductRepository<'a, C = DatabaseConnection> {
    db: &'a C,
}

impl<'a, C: ConnectionTrait> ProductRepository<'a, C> {
    /// Create a new ProductRepository over a pool or transaction
    pub fn new(db: &'a C) -> Self {
        Self { db }
    }

    /// Insert a product with an empty aggregate
    pub async fn create(&self, new_product: NewProduct) -> Result<ProductModel, RepositoryError> {
        let now = Utc::now();

        let product = ProductActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new_product.name),
            url: Set(new_product.url),
            platform: Set(new_product.platform.as_str().to_string()),
            image_url: Set(new_product.image_url),
            price: Set(new_product.price),
            average_rating: Set(0.0),
            total_reviews: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        product
            .insert(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get product by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, RepositoryError> {
        Product::find_by_id(id)
            .one(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Get product by ID, failing with `NotFound` when absent
    pub async fn get(&self, id: Uuid) -> Result<ProductModel, RepositoryError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Product".to_string()))
    }

    /// All products, newest first
    pub async fn list_all(&self) -> Result<Vec<ProductModel>, RepositoryError> {
        Product::find()
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// IDs of every product, oldest first
    pub async fn list_ids(&self) -> Result<Vec<Uuid>, RepositoryError> {
        Product::find()
            .select_only()
            .column(Column::Id)
            .order_by_asc(Column::CreatedAt)
            .into_tuple::<Uuid>()
            .all(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }

    /// Persist a recomputed aggregate and bump `updated_at`
    pub async fn update_aggregate(
        &self,
        product: ProductModel,
        aggregate: RatingAggregate,
    ) -> Result<ProductModel, RepositoryError> {
        let mut active_product = product.into_active_model();
        active_product.average_rating = Set(aggregate.average_rating);
        active_product.total_reviews = Set(aggregate.total_reviews);
        active_product.updated_at = Set(Utc::now().into());

        active_product
            .update(self.db)
            .await
            .map_err(RepositoryError::database_error)
    }
}
