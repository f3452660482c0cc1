//! Document and result types for the catalog store.
//!
//! Defines the structures stored in the `products` collection and the
//! typed rows each of the five operations produces.

use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

/// A customer review embedded in a product document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer id (e.g., "U999").
    pub user: String,

    /// Rating, expected range 1-5. Stored catalogs may hold either
    /// Int32 or Double; f64 deserializes both.
    pub rating: f64,

    /// Free-text comment.
    pub comment: String,

    /// Review date.
    pub date: DateTime,
}

impl Review {
    /// Creates a new review.
    pub fn new(user: impl Into<String>, rating: f64, comment: impl Into<String>, date: DateTime) -> Self {
        Self {
            user: user.into(),
            rating,
            comment: comment.into(),
            date,
        }
    }
}

/// A product document with its embedded, ordered review sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product code, unique across the catalog (e.g., "ELEC001").
    pub product_id: String,

    /// Display name.
    pub name: String,

    /// Category the product is grouped under.
    pub category: String,

    /// Unit price.
    pub price: f64,

    /// Units in stock.
    pub stock: i64,

    /// Reviews in insertion order; appends land at the end.
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Arithmetic mean of the review ratings, or `None` when the product
    /// has no reviews (matching `$avg` over empty input).
    pub fn average_rating(&self) -> Option<f64> {
        if self.reviews.is_empty() {
            return None;
        }
        let sum: f64 = self.reviews.iter().map(|r| r.rating).sum();
        Some(sum / self.reviews.len() as f64)
    }
}

/// Row produced by the filtered projection: name, price and stock only,
/// identifier suppressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub price: f64,
    pub stock: i64,
}

/// Row produced by the rating aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatedProduct {
    pub product_id: String,
    pub name: String,
    pub category: String,
    pub price: f64,

    /// Mean of `reviews.rating`; absent-averaging products never reach
    /// the result because the pipeline matches on it.
    #[serde(rename = "avgRating")]
    pub avg_rating: f64,
}

/// Row produced by the per-category price rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRollup {
    pub category: String,
    pub avg_price: f64,
    pub product_count: i64,
}

/// Acknowledgment of the review append: how many documents the filter
/// matched and how many were modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Point-lookup row confirming an append: name plus the full review
/// sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReviews {
    pub name: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}
