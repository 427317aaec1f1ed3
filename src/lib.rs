//! # Review Collector Library
//!
//! This library provides the core functionality for the Review Collector service:
//! product and review storage, rating aggregates, the HTTP handlers and server setup.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod ratings;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
