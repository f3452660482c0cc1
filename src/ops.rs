//! Typed operation specs for the five catalog operations.
//!
//! Each spec carries one operation's parameters as typed fields,
//! validates them, and owns the translation into the engine's BSON
//! representation. Nothing upstream of this module builds query
//! documents by hand.

use crate::db::Review;
use crate::error::{FleximartError, Result};
use mongodb::bson::{doc, to_document, Document};

/// Parameters for the filtered projection: products in one category
/// strictly under a price ceiling, projected to name/price/stock.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub category: String,
    pub max_price: f64,
}

impl ProductFilter {
    pub fn new(category: impl Into<String>, max_price: f64) -> Self {
        Self {
            category: category.into(),
            max_price,
        }
    }

    /// Rejects parameters the engine would accept but that can only be
    /// a caller mistake.
    pub fn validate(&self) -> Result<()> {
        if self.category.trim().is_empty() {
            return Err(FleximartError::query("product filter: category is empty"));
        }
        if !self.max_price.is_finite() || self.max_price <= 0.0 {
            return Err(FleximartError::query(format!(
                "product filter: price ceiling {} is not a positive number",
                self.max_price
            )));
        }
        Ok(())
    }

    /// Filter document: `{category: <c>, price: {$lt: <ceiling>}}`.
    pub fn filter_document(&self) -> Document {
        doc! {
            "category": &self.category,
            "price": { "$lt": self.max_price },
        }
    }

    /// Projection document: name/price/stock, `_id` suppressed.
    pub fn projection_document(&self) -> Document {
        doc! {
            "name": 1,
            "price": 1,
            "stock": 1,
            "_id": 0,
        }
    }
}

/// Parameters for the rating aggregation: keep products whose mean
/// review rating reaches the floor, sorted best-first.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingReport {
    pub min_avg: f64,
}

impl RatingReport {
    pub fn new(min_avg: f64) -> Self {
        Self { min_avg }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_avg.is_finite() || !(0.0..=5.0).contains(&self.min_avg) {
            return Err(FleximartError::query(format!(
                "rating report: floor {} is outside the 0-5 rating scale",
                self.min_avg
            )));
        }
        Ok(())
    }

    /// The `$project`/`$match`/`$sort` pipeline. `$avg` over a missing
    /// or empty review array yields null, which the `$gte` match drops.
    pub fn pipeline(&self) -> Vec<Document> {
        vec![
            doc! {
                "$project": {
                    "product_id": 1,
                    "name": 1,
                    "category": 1,
                    "price": 1,
                    "avgRating": { "$avg": "$reviews.rating" },
                }
            },
            doc! {
                "$match": {
                    "avgRating": { "$gte": self.min_avg },
                }
            },
            doc! {
                "$sort": { "avgRating": -1 }
            },
        ]
    }
}

/// Parameters for the review append: the target product code and the
/// review to `$push` onto the end of its sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPush {
    pub product_code: String,
    pub review: Review,
}

impl ReviewPush {
    pub fn new(product_code: impl Into<String>, review: Review) -> Self {
        Self {
            product_code: product_code.into(),
            review,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_code.trim().is_empty() {
            return Err(FleximartError::query("review push: product code is empty"));
        }
        if !(1.0..=5.0).contains(&self.review.rating) {
            return Err(FleximartError::query(format!(
                "review push: rating {} is outside the 1-5 scale",
                self.review.rating
            )));
        }
        Ok(())
    }

    /// Point filter on the product code. Also used by the follow-up
    /// read, so both operations target the same document.
    pub fn filter_document(&self) -> Document {
        doc! { "product_id": &self.product_code }
    }

    /// Update document: `{$push: {reviews: <review>}}`.
    pub fn update_document(&self) -> Result<Document> {
        let review = to_document(&self.review)
            .map_err(|e| FleximartError::internal(format!("review failed to serialize: {e}")))?;
        Ok(doc! { "$push": { "reviews": review } })
    }
}

/// Parameters for the point lookup that confirms an append: the same
/// product code, projected to name and the full review sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewLookup {
    pub product_code: String,
}

impl ReviewLookup {
    pub fn new(product_code: impl Into<String>) -> Self {
        Self {
            product_code: product_code.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.product_code.trim().is_empty() {
            return Err(FleximartError::query("review lookup: product code is empty"));
        }
        Ok(())
    }

    pub fn filter_document(&self) -> Document {
        doc! { "product_id": &self.product_code }
    }

    pub fn projection_document(&self) -> Document {
        doc! { "name": 1, "reviews": 1 }
    }
}

/// Parameters for the per-category price rollup.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRollup {
    /// Decimal places the per-group average is rounded to.
    pub round_places: i32,
}

impl PriceRollup {
    pub fn new(round_places: i32) -> Self {
        Self { round_places }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0..=6).contains(&self.round_places) {
            return Err(FleximartError::query(format!(
                "price rollup: {} decimal places is not a sensible precision",
                self.round_places
            )));
        }
        Ok(())
    }

    /// The `$group`/`$project`/`$sort` pipeline: group key renamed to
    /// `category`, synthetic `_id` suppressed, averages rounded.
    pub fn pipeline(&self) -> Vec<Document> {
        vec![
            doc! {
                "$group": {
                    "_id": "$category",
                    "avg_price": { "$avg": "$price" },
                    "product_count": { "$sum": 1 },
                }
            },
            doc! {
                "$project": {
                    "_id": 0,
                    "category": "$_id",
                    "avg_price": { "$round": ["$avg_price", self.round_places] },
                    "product_count": 1,
                }
            },
            doc! {
                "$sort": { "avg_price": -1 }
            },
        ]
    }
}
