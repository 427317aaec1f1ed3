//! # Data Models
//!
//! This module contains the SeaORM entities and the small value types shared
//! across the Review Collector service.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod product;
pub mod review;

pub use product::Entity as Product;
pub use review::Entity as Review;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "review-collector".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Marketplace a product listing was collected from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Shopee,
    Tokopedia,
    Bukalapak,
    Lazada,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Shopee,
        Platform::Tokopedia,
        Platform::Bukalapak,
        Platform::Lazada,
    ];

    /// Lowercase slug stored in the `products.platform` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Shopee => "shopee",
            Platform::Tokopedia => "tokopedia",
            Platform::Bukalapak => "bukalapak",
            Platform::Lazada => "lazada",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Shopee => "Shopee",
            Platform::Tokopedia => "Tokopedia",
            Platform::Bukalapak => "Bukalapak",
            Platform::Lazada => "Lazada",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform '{0}'; expected one of shopee, tokopedia, bukalapak, lazada")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Platform::ALL
            .into_iter()
            .find(|platform| platform.as_str() == normalized)
            .ok_or_else(|| UnknownPlatform(value.to_string()))
    }
}

/// Dashboard platform filter: `all` or a single marketplace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlatformFilter {
    #[default]
    All,
    Only(Platform),
}

impl PlatformFilter {
    /// Filter values in the order the dashboard presents them.
    pub fn options() -> Vec<PlatformFilter> {
        std::iter::once(PlatformFilter::All)
            .chain(Platform::ALL.into_iter().map(PlatformFilter::Only))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlatformFilter::All => "all",
            PlatformFilter::Only(platform) => platform.as_str(),
        }
    }

    /// Whether a stored platform slug passes this filter.
    pub fn matches(self, platform: &str) -> bool {
        match self {
            PlatformFilter::All => true,
            PlatformFilter::Only(expected) => expected.as_str() == platform,
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformFilter {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(PlatformFilter::All);
        }
        value.parse().map(PlatformFilter::Only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parsing_is_case_insensitive() {
        assert_eq!("Shopee".parse::<Platform>().unwrap(), Platform::Shopee);
        assert_eq!(" LAZADA ".parse::<Platform>().unwrap(), Platform::Lazada);
        assert!("amazon".parse::<Platform>().is_err());
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::Tokopedia).unwrap();
        assert_eq!(json, "\"tokopedia\"");
    }

    #[test]
    fn test_platform_filter_options_order() {
        let options: Vec<&str> = PlatformFilter::options()
            .into_iter()
            .map(PlatformFilter::as_str)
            .collect();
        assert_eq!(
            options,
            vec!["all", "shopee", "tokopedia", "bukalapak", "lazada"]
        );
    }

    #[test]
    fn test_platform_filter_matching() {
        assert!(PlatformFilter::All.matches("bukalapak"));
        assert!(PlatformFilter::Only(Platform::Shopee).matches("shopee"));
        assert!(!PlatformFilter::Only(Platform::Shopee).matches("lazada"));
        assert_eq!("all".parse::<PlatformFilter>().unwrap(), PlatformFilter::All);
        assert!("everything".parse::<PlatformFilter>().is_err());
    }

    #[test]
    fn test_service_info_default() {
        let info = ServiceInfo::default();
        assert_eq!(info.service, "review-collector");
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }
}
