//! MongoDB catalog store implementation.
//!
//! Provides the `MongoStore` struct that implements the `CatalogStore`
//! trait against a live MongoDB deployment using the official driver.

use crate::config::ConnectionConfig;
use crate::db::{
    CatalogStore, CategoryRollup, ProductReviews, ProductSummary, RatedProduct, UpdateOutcome,
};
use crate::error::{FleximartError, Result};
use crate::ops::{PriceRollup, ProductFilter, RatingReport, ReviewLookup, ReviewPush};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, from_document, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::debug;

/// Application name reported to the server.
const APP_NAME: &str = "fleximart-catalog";

/// Collection holding the product catalog.
const PRODUCTS_COLLECTION: &str = "products";

/// MongoDB catalog store.
///
/// Holds the single session shared by all five operations. No retry,
/// recovery, or timeout layer is added on top of the driver; failures
/// surface with the driver's message intact.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    products: Collection<Document>,
}

impl MongoStore {
    /// Connects to the configured deployment and scopes the store to
    /// its database's `products` collection.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn_str = config.to_connection_string()?;

        let mut options = ClientOptions::parse(&conn_str)
            .await
            .map_err(|e| map_connection_error(e, config))?;
        options.app_name = Some(APP_NAME.to_string());

        let client =
            Client::with_options(options).map_err(|e| map_connection_error(e, config))?;
        let database = client.database(config.database());

        // The driver connects lazily; ping so connection and auth
        // failures surface at startup rather than at the first query.
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| map_connection_error(e, config))?;
        debug!("Connected to {}", config.display_string());

        let products = database.collection::<Document>(PRODUCTS_COLLECTION);
        Ok(Self { client, products })
    }
}

#[async_trait]
impl CatalogStore for MongoStore {
    async fn count_products(&self) -> Result<u64> {
        let count = self
            .products
            .count_documents(doc! {})
            .await
            .map_err(map_query_error)?;
        debug!("Counted {} products", count);
        Ok(count)
    }

    async fn find_products(&self, spec: &ProductFilter) -> Result<Vec<ProductSummary>> {
        spec.validate()?;

        // The engine hands back a forward-only cursor; drain it in
        // arrival order.
        let mut cursor = self
            .products
            .clone_with_type::<ProductSummary>()
            .find(spec.filter_document())
            .projection(spec.projection_document())
            .await
            .map_err(map_query_error)?;

        let mut summaries = Vec::new();
        while let Some(summary) = cursor.try_next().await.map_err(map_query_error)? {
            summaries.push(summary);
        }
        debug!(
            "Found {} products in '{}' under {}",
            summaries.len(),
            spec.category,
            spec.max_price
        );
        Ok(summaries)
    }

    async fn rate_products(&self, spec: &RatingReport) -> Result<Vec<RatedProduct>> {
        spec.validate()?;

        let mut cursor = self
            .products
            .aggregate(spec.pipeline())
            .await
            .map_err(map_query_error)?;

        let mut rated = Vec::new();
        while let Some(row) = cursor.try_next().await.map_err(map_query_error)? {
            rated.push(deserialize_row(row, "rating aggregation")?);
        }
        debug!("{} products rated at or above {}", rated.len(), spec.min_avg);
        Ok(rated)
    }

    async fn push_review(&self, spec: &ReviewPush) -> Result<UpdateOutcome> {
        spec.validate()?;
        let update = spec.update_document()?;

        let result = self
            .products
            .update_one(spec.filter_document(), update)
            .await
            .map_err(map_query_error)?;

        debug!(
            "Review push on '{}': matched {}, modified {}",
            spec.product_code, result.matched_count, result.modified_count
        );
        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn product_reviews(&self, spec: &ReviewLookup) -> Result<Option<ProductReviews>> {
        spec.validate()?;

        self.products
            .clone_with_type::<ProductReviews>()
            .find_one(spec.filter_document())
            .projection(spec.projection_document())
            .await
            .map_err(map_query_error)
    }

    async fn rollup_prices(&self, spec: &PriceRollup) -> Result<Vec<CategoryRollup>> {
        spec.validate()?;

        let mut cursor = self
            .products
            .aggregate(spec.pipeline())
            .await
            .map_err(map_query_error)?;

        let mut rollups = Vec::new();
        while let Some(row) = cursor.try_next().await.map_err(map_query_error)? {
            rollups.push(deserialize_row(row, "price rollup")?);
        }
        debug!("Rolled up {} categories", rollups.len());
        Ok(rollups)
    }

    async fn close(&self) -> Result<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

/// Deserializes one aggregation row into its typed form.
fn deserialize_row<T: serde::de::DeserializeOwned>(row: Document, what: &str) -> Result<T> {
    from_document(row)
        .map_err(|e| FleximartError::internal(format!("{what} row failed to deserialize: {e}")))
}

/// Wraps a driver error as a query error, message intact.
fn map_query_error(error: mongodb::error::Error) -> FleximartError {
    FleximartError::query(error.to_string())
}

/// Maps driver connection errors to user-friendly messages.
fn map_connection_error(error: mongodb::error::Error, config: &ConnectionConfig) -> FleximartError {
    classify_connection_error(&error.to_string(), config)
}

fn classify_connection_error(message: &str, config: &ConnectionConfig) -> FleximartError {
    let host = config.host.as_deref().unwrap_or("localhost");
    let port = config.port;
    let user = config.user.as_deref().unwrap_or("unknown");
    let lowered = message.to_lowercase();

    if lowered.contains("authentication") || lowered.contains("scram") {
        FleximartError::connection(format!(
            "Authentication failed for user '{user}'. Check your credentials."
        ))
    } else if lowered.contains("connection refused") || lowered.contains("server selection") {
        FleximartError::connection(format!(
            "Cannot connect to {host}:{port}. Check that the server is running."
        ))
    } else if lowered.contains("dns") || lowered.contains("resolve") {
        FleximartError::connection(format!("Cannot resolve host '{host}'."))
    } else {
        FleximartError::connection(message.to_string())
    }
}
