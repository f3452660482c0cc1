//! Store abstraction for the product catalog.
//!
//! Provides a trait-based interface over the catalog so the real engine
//! and the in-memory store can be used interchangeably.

mod mock;
mod mongo;
mod types;

pub use mock::{sample_catalog, MemoryStore};
pub use mongo::MongoStore;
pub use types::{
    CategoryRollup, Product, ProductReviews, ProductSummary, RatedProduct, Review, UpdateOutcome,
};

use crate::config::ConnectionConfig;
use crate::error::Result;
use crate::ops::{PriceRollup, ProductFilter, RatingReport, ReviewLookup, ReviewPush};
use async_trait::async_trait;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    MongoDb,
    // Future: other document stores speaking the same query language.
}

#[allow(dead_code)]
impl DatabaseBackend {
    /// Returns the backend as a string for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MongoDb => "mongodb",
        }
    }

    /// Parses a backend from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mongodb" | "mongo" => Some(Self::MongoDb),
            _ => None,
        }
    }

    /// Returns the default port for this backend.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MongoDb => 27017,
        }
    }

    /// Returns the URL scheme for this backend.
    pub fn url_scheme(&self) -> &'static str {
        match self {
            Self::MongoDb => "mongodb",
        }
    }
}

/// Creates a catalog store for the given backend and configuration.
///
/// This is the central factory function for database connections.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn CatalogStore>> {
    match config.backend {
        DatabaseBackend::MongoDb => {
            let store = MongoStore::connect(config).await?;
            Ok(Box::new(store))
        }
    }
}

/// Trait defining the interface to the product catalog.
///
/// One method per catalog operation, in the order the runner issues
/// them; `push_review` is the only mutation. All operations are async
/// and return Results with FleximartError.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Total number of product documents, no filter.
    async fn count_products(&self) -> Result<u64>;

    /// Products matching the filter, projected to name/price/stock.
    async fn find_products(&self, spec: &ProductFilter) -> Result<Vec<ProductSummary>>;

    /// Products whose mean review rating reaches the floor, best-first.
    async fn rate_products(&self, spec: &RatingReport) -> Result<Vec<RatedProduct>>;

    /// Appends one review to the end of the matched product's sequence.
    async fn push_review(&self, spec: &ReviewPush) -> Result<UpdateOutcome>;

    /// Point lookup of a product's name and full review sequence.
    async fn product_reviews(&self, spec: &ReviewLookup) -> Result<Option<ProductReviews>>;

    /// Per-category price averages and counts, priciest category first.
    async fn rollup_prices(&self, spec: &PriceRollup) -> Result<Vec<CategoryRollup>>;

    /// Closes the store's connection.
    async fn close(&self) -> Result<()>;
}
