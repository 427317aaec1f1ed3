//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for the catalog entities. Repositories borrow any [`sea_orm::ConnectionTrait`], so the
//! same code runs against the pool or inside a transaction.

pub mod product;
pub mod review;

pub use product::{NewProduct, ProductRepository};
pub use review::{NewReview, ReviewRepository};
