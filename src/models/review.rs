//! Review entity model
//!
//! This module contains the SeaORM entity model for the reviews table.

use super::product::Entity as Product;
use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Review entity representing one customer review of a product
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    /// Unique identifier for the review (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product this review belongs to
    pub product_id: Uuid,

    /// Name the reviewer entered
    pub reviewer_name: String,

    /// Star rating, 1 through 5
    pub rating: i32,

    /// Review body
    pub comment: String,

    /// Date shown alongside the review
    pub review_date: DateTimeWithTimeZone,

    /// Number of readers who marked the review helpful
    pub helpful_count: i32,

    /// Timestamp when the review was created
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "Product",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<Product> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
