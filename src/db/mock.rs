//! In-memory catalog store for testing and demo runs.
//!
//! Implements the `CatalogStore` trait over a plain vector of products
//! with the same observable semantics as the engine: a null average for
//! zero reviews, comparison matches that exclude null, descending
//! sorts, append-at-end pushes, and rounded rollup averages.

use super::{
    CatalogStore, CategoryRollup, Product, ProductReviews, ProductSummary, RatedProduct, Review,
    UpdateOutcome,
};
use crate::error::Result;
use crate::ops::{PriceRollup, ProductFilter, RatingReport, ReviewLookup, ReviewPush};
use async_trait::async_trait;
use mongodb::bson::DateTime;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A catalog store backed by process memory.
pub struct MemoryStore {
    products: Mutex<Vec<Product>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self {
            products: Mutex::new(Vec::new()),
        }
    }

    /// Creates a store seeded with the given products.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Product>> {
        self.products.lock().expect("product store lock poisoned")
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn count_products(&self) -> Result<u64> {
        Ok(self.lock().len() as u64)
    }

    async fn find_products(&self, spec: &ProductFilter) -> Result<Vec<ProductSummary>> {
        spec.validate()?;
        let products = self.lock();
        Ok(products
            .iter()
            .filter(|p| p.category == spec.category && p.price < spec.max_price)
            .map(|p| ProductSummary {
                name: p.name.clone(),
                price: p.price,
                stock: p.stock,
            })
            .collect())
    }

    async fn rate_products(&self, spec: &RatingReport) -> Result<Vec<RatedProduct>> {
        spec.validate()?;
        let products = self.lock();

        let mut rated: Vec<RatedProduct> = products
            .iter()
            .filter_map(|p| {
                // Products without reviews average to null and never
                // reach the match stage.
                let avg = p.average_rating()?;
                (avg >= spec.min_avg).then(|| RatedProduct {
                    product_id: p.product_id.clone(),
                    name: p.name.clone(),
                    category: p.category.clone(),
                    price: p.price,
                    avg_rating: avg,
                })
            })
            .collect();

        rated.sort_by(|a, b| b.avg_rating.total_cmp(&a.avg_rating));
        Ok(rated)
    }

    async fn push_review(&self, spec: &ReviewPush) -> Result<UpdateOutcome> {
        spec.validate()?;
        let mut products = self.lock();

        // Like the engine's updateOne: at most the first match changes.
        match products
            .iter_mut()
            .find(|p| p.product_id == spec.product_code)
        {
            Some(product) => {
                product.reviews.push(spec.review.clone());
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: 1,
                })
            }
            None => Ok(UpdateOutcome {
                matched: 0,
                modified: 0,
            }),
        }
    }

    async fn product_reviews(&self, spec: &ReviewLookup) -> Result<Option<ProductReviews>> {
        spec.validate()?;
        let products = self.lock();
        Ok(products
            .iter()
            .find(|p| p.product_id == spec.product_code)
            .map(|p| ProductReviews {
                name: p.name.clone(),
                reviews: p.reviews.clone(),
            }))
    }

    async fn rollup_prices(&self, spec: &PriceRollup) -> Result<Vec<CategoryRollup>> {
        spec.validate()?;
        let products = self.lock();

        let mut groups: BTreeMap<&str, (f64, i64)> = BTreeMap::new();
        for p in products.iter() {
            let entry = groups.entry(p.category.as_str()).or_insert((0.0, 0));
            entry.0 += p.price;
            entry.1 += 1;
        }

        let mut rollups: Vec<CategoryRollup> = groups
            .into_iter()
            .map(|(category, (total, count))| CategoryRollup {
                category: category.to_string(),
                avg_price: round_to(total / count as f64, spec.round_places),
                product_count: count,
            })
            .collect();

        rollups.sort_by(|a, b| b.avg_price.total_cmp(&a.avg_price));
        Ok(rollups)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Rounds to the given number of decimal places.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// A small FlexiMart catalog for `--mock` runs and tests.
pub fn sample_catalog() -> Vec<Product> {
    fn date(s: &str) -> DateTime {
        DateTime::parse_rfc3339_str(s).expect("valid literal date")
    }

    vec![
        Product {
            product_id: "ELEC001".to_string(),
            name: "Wireless Headphones".to_string(),
            category: "Electronics".to_string(),
            price: 2999.0,
            stock: 150,
            reviews: vec![
                Review::new("U101", 5.0, "Excellent sound quality", date("2024-01-15T00:00:00Z")),
                Review::new("U102", 4.0, "Good battery life", date("2024-02-20T00:00:00Z")),
            ],
        },
        Product {
            product_id: "ELEC002".to_string(),
            name: "Smartphone X200".to_string(),
            category: "Electronics".to_string(),
            price: 45999.0,
            stock: 40,
            reviews: vec![
                Review::new("U103", 5.0, "Flagship performance", date("2024-03-05T00:00:00Z")),
                Review::new("U104", 4.0, "Camera could be better", date("2024-03-18T00:00:00Z")),
            ],
        },
        Product {
            product_id: "ELEC003".to_string(),
            name: "4K Television".to_string(),
            category: "Electronics".to_string(),
            price: 62000.0,
            stock: 15,
            reviews: vec![Review::new(
                "U105",
                4.0,
                "Great picture, clunky remote",
                date("2024-04-02T00:00:00Z"),
            )],
        },
        Product {
            product_id: "FASH001".to_string(),
            name: "Denim Jacket".to_string(),
            category: "Fashion".to_string(),
            price: 2499.0,
            stock: 80,
            reviews: vec![
                Review::new("U106", 3.0, "Runs small", date("2024-02-11T00:00:00Z")),
                Review::new("U107", 3.0, "Average stitching", date("2024-05-09T00:00:00Z")),
            ],
        },
        Product {
            product_id: "FASH002".to_string(),
            name: "Running Shoes".to_string(),
            category: "Fashion".to_string(),
            price: 3999.0,
            stock: 120,
            reviews: vec![
                Review::new("U108", 5.0, "Very comfortable", date("2024-01-28T00:00:00Z")),
                Review::new("U109", 4.0, "Good grip", date("2024-06-14T00:00:00Z")),
            ],
        },
        Product {
            product_id: "HOME001".to_string(),
            name: "Electric Kettle".to_string(),
            category: "Home".to_string(),
            price: 1499.0,
            stock: 60,
            reviews: vec![],
        },
    ]
}
