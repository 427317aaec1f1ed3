//! Product entity model
//!
//! This module contains the SeaORM entity model for the products table, which
//! holds marketplace listings and their derived rating aggregate.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Product entity representing a marketplace listing
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display name of the listing
    pub name: String,

    /// Canonical listing URL on the marketplace
    pub url: String,

    /// Source marketplace slug (see [`super::Platform`])
    pub platform: String,

    /// Optional product image URL
    pub image_url: Option<String>,

    /// Optional display price, kept as free text (e.g. "Rp 15.000.000")
    pub price: Option<String>,

    /// Mean of all review ratings, 0 when there are none (derived)
    #[sea_orm(column_type = "Double")]
    pub average_rating: f64,

    /// Number of reviews (derived)
    pub total_reviews: i32,

    /// Timestamp when the product was created
    pub created_at: DateTimeWithTimeZone,

    /// Timestamp when the product was last updated
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
