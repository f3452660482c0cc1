//! Live-database integration tests.
//!
//! These tests require a running MongoDB deployment seeded with the
//! FlexiMart catalog. Set MONGODB_URI to run them; note that the
//! append test writes one review to the ELEC001 product.

use fleximart_catalog::config::ConnectionConfig;
use fleximart_catalog::db::{CatalogStore, MongoStore};
use fleximart_catalog::error::FleximartError;
use fleximart_catalog::ops::{PriceRollup, ProductFilter, RatingReport, ReviewLookup};
use fleximart_catalog::runner::{RunPlan, Runner};

/// Helper to get the test deployment URI from the environment.
fn get_test_uri() -> Option<String> {
    std::env::var("MONGODB_URI").ok()
}

/// Helper to create a test store.
async fn get_test_store() -> Option<MongoStore> {
    let uri = get_test_uri()?;
    let config = ConnectionConfig::from_connection_string(&uri).ok()?;
    MongoStore::connect(&config).await.ok()
}

#[tokio::test]
async fn test_connect_and_close() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    // Connection succeeded if we got here
    store.close().await.unwrap();
}

#[tokio::test]
async fn test_count_is_idempotent() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let first = store.count_products().await.unwrap();
    let second = store.count_products().await.unwrap();
    assert_eq!(first, second);

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_filtered_projection_respects_ceiling() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let count = store.count_products().await.unwrap();
    let found = store
        .find_products(&ProductFilter::new("Electronics", 50000.0))
        .await
        .unwrap();

    assert!(found.len() as u64 <= count);
    for summary in &found {
        assert!(summary.price < 50000.0);
    }

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_rating_report_floor_and_order() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let rated = store.rate_products(&RatingReport::new(4.0)).await.unwrap();

    for product in &rated {
        assert!(product.avg_rating >= 4.0);
    }
    for pair in rated.windows(2) {
        assert!(pair[0].avg_rating >= pair[1].avg_rating);
    }

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_rollup_order_and_precision() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let rollups = store.rollup_prices(&PriceRollup::new(2)).await.unwrap();

    for pair in rollups.windows(2) {
        assert!(pair[0].avg_price >= pair[1].avg_price);
    }
    for rollup in &rollups {
        let scaled = rollup.avg_price * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6);
    }

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_full_run_appends_and_confirms() {
    let Some(store) = get_test_store().await else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let plan = RunPlan::fleximart().unwrap();
    let before = store
        .product_reviews(&ReviewLookup::new("ELEC001"))
        .await
        .unwrap();

    let report = Runner::new(&store).run(&plan).await.unwrap();

    match before {
        Some(before) => {
            assert_eq!(report.review_push.matched, 1);
            let after = report.pushed_product.expect("lookup finds ELEC001");
            assert_eq!(after.reviews.len(), before.reviews.len() + 1);

            let appended = after.reviews.last().unwrap();
            assert_eq!(appended.user, "U999");
            assert_eq!(appended.rating, 4.0);
            assert_eq!(appended.comment, "Good value");
        }
        None => {
            // Catalog without ELEC001: the push is a reported no-op.
            assert_eq!(report.review_push.matched, 0);
            assert!(report.pushed_product.is_none());
        }
    }

    store.close().await.unwrap();
}

#[tokio::test]
async fn test_connect_with_bad_credentials_fails() {
    let Some(uri) = get_test_uri() else {
        eprintln!("Skipping test: MONGODB_URI not set");
        return;
    };

    let mut config = ConnectionConfig::from_connection_string(&uri).unwrap();
    config.user = Some("definitely-not-a-user".to_string());
    config.password = Some("wrong".to_string());

    let result = MongoStore::connect(&config).await;
    let Err(err) = result else {
        // Deployments without auth enabled accept any credentials.
        eprintln!("Skipping assertion: deployment does not enforce auth");
        return;
    };
    assert!(matches!(err, FleximartError::Connection(_)));
}
