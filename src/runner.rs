//! Sequential execution of the five catalog operations.
//!
//! The runner borrows a store, issues the operations strictly in order
//! (each one completes before the next begins), and collects every
//! result into a single report for rendering.

use crate::db::{
    CatalogStore, CategoryRollup, ProductReviews, ProductSummary, RatedProduct, Review,
    UpdateOutcome,
};
use crate::error::{FleximartError, Result};
use crate::ops::{PriceRollup, ProductFilter, RatingReport, ReviewLookup, ReviewPush};
use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Date of the review appended by the canonical run.
const REVIEW_DATE: &str = "2024-07-01T00:00:00Z";

/// The parameters of one full run, one spec per operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub filter: ProductFilter,
    pub rating: RatingReport,
    pub push: ReviewPush,
    pub lookup: ReviewLookup,
    pub rollup: PriceRollup,
}

impl RunPlan {
    /// The canonical FlexiMart plan: Electronics under 50000, a 4.0
    /// rating floor, one review appended to ELEC001, and a 2-decimal
    /// category rollup.
    pub fn fleximart() -> Result<Self> {
        let date = DateTime::parse_rfc3339_str(REVIEW_DATE)
            .map_err(|e| FleximartError::internal(format!("bad review date literal: {e}")))?;

        Ok(Self {
            filter: ProductFilter::new("Electronics", 50_000.0),
            rating: RatingReport::new(4.0),
            push: ReviewPush::new("ELEC001", Review::new("U999", 4.0, "Good value", date)),
            lookup: ReviewLookup::new("ELEC001"),
            rollup: PriceRollup::new(2),
        })
    }
}

/// Everything a run produced, in operation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Operation 1: total product count.
    pub product_count: u64,

    /// Operation 2: filtered projection rows.
    pub discounted: Vec<ProductSummary>,

    /// Operation 3: rating aggregation rows, best-first.
    pub top_rated: Vec<RatedProduct>,

    /// Operation 4: matched/modified counts of the review append.
    pub review_push: UpdateOutcome,

    /// Operation 4: confirmation read. None when the code matched
    /// nothing.
    pub pushed_product: Option<ProductReviews>,

    /// Operation 5: per-category rollup rows, priciest first.
    pub price_rollup: Vec<CategoryRollup>,

    /// Wall time for the whole run.
    #[serde(with = "duration_serde")]
    pub elapsed: Duration,
}

/// Executes a run plan against a catalog store.
pub struct Runner<'a> {
    store: &'a dyn CatalogStore,
}

impl<'a> Runner<'a> {
    /// Creates a runner over the given store.
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self { store }
    }

    /// Runs the five operations in order and returns the report.
    ///
    /// The first failing operation aborts the run; nothing after it
    /// executes. A review push that matches nothing is reported, not
    /// raised: the counts and the (then absent) confirmation read land
    /// in the report for the caller to inspect.
    pub async fn run(&self, plan: &RunPlan) -> Result<RunReport> {
        let start = Instant::now();

        info!("Operation 1: counting products");
        let product_count = self.store.count_products().await?;

        info!(
            "Operation 2: '{}' products under {}",
            plan.filter.category, plan.filter.max_price
        );
        let discounted = self.store.find_products(&plan.filter).await?;

        info!(
            "Operation 3: products rated {} or better",
            plan.rating.min_avg
        );
        let top_rated = self.store.rate_products(&plan.rating).await?;

        info!(
            "Operation 4: appending review by '{}' to '{}'",
            plan.push.review.user, plan.push.product_code
        );
        let review_push = self.store.push_review(&plan.push).await?;
        if review_push.matched == 0 {
            warn!(
                "Review push matched no product with code '{}'",
                plan.push.product_code
            );
        }
        let pushed_product = self.store.product_reviews(&plan.lookup).await?;

        info!("Operation 5: rolling up prices by category");
        let price_rollup = self.store.rollup_prices(&plan.rollup).await?;

        let elapsed = start.elapsed();
        debug!("Run completed in {:?}", elapsed);

        Ok(RunReport {
            product_count,
            discounted,
            top_rated,
            review_push,
            pushed_product,
            price_rollup,
            elapsed,
        })
    }
}

/// Serde support for Duration (not natively supported by serde).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos as u64))
    }
}
