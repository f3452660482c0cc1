//! Full-run tests over the in-memory store.
//!
//! Exercises the five operations end to end and checks the observable
//! properties each one guarantees.

use fleximart_catalog::db::{sample_catalog, CatalogStore, MemoryStore};
use fleximart_catalog::ops::{ProductFilter, ReviewLookup};
use fleximart_catalog::runner::{RunPlan, Runner};
use pretty_assertions::assert_eq;

fn store() -> MemoryStore {
    MemoryStore::with_products(sample_catalog())
}

#[tokio::test]
async fn test_count_bounds_any_filtered_query() {
    let store = store();
    let plan = RunPlan::fleximart().unwrap();
    let report = Runner::new(&store).run(&plan).await.unwrap();

    assert!(report.product_count as usize >= report.discounted.len());
    assert!(report.product_count as usize >= report.top_rated.len());
}

#[tokio::test]
async fn test_count_is_idempotent_without_writes() {
    let store = store();

    let first = store.count_products().await.unwrap();
    let second = store.count_products().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_filtered_projection_satisfies_filter() {
    let store = store();
    let spec = ProductFilter::new("Electronics", 50000.0);
    let found = store.find_products(&spec).await.unwrap();

    assert!(!found.is_empty());
    for summary in &found {
        assert!(summary.price < 50000.0);
    }

    // The fixture's Electronics entries under the ceiling, by name.
    let names: Vec<&str> = found.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Wireless Headphones", "Smartphone X200"]);
}

#[tokio::test]
async fn test_rating_report_floor_and_order() {
    let store = store();
    let plan = RunPlan::fleximart().unwrap();
    let report = Runner::new(&store).run(&plan).await.unwrap();

    assert!(!report.top_rated.is_empty());
    for rated in &report.top_rated {
        assert!(rated.avg_rating >= 4.0);
    }
    for pair in report.top_rated.windows(2) {
        assert!(pair[0].avg_rating >= pair[1].avg_rating);
    }
}

#[tokio::test]
async fn test_append_then_read_confirms_the_append() {
    let store = store();
    let plan = RunPlan::fleximart().unwrap();

    let before = store
        .product_reviews(&ReviewLookup::new("ELEC001"))
        .await
        .unwrap()
        .expect("fixture has ELEC001");

    let report = Runner::new(&store).run(&plan).await.unwrap();

    assert_eq!(report.review_push.matched, 1);
    assert_eq!(report.review_push.modified, 1);

    let after = report.pushed_product.expect("lookup finds ELEC001");
    assert_eq!(after.reviews.len(), before.reviews.len() + 1);

    let appended = after.reviews.last().unwrap();
    assert_eq!(appended.user, "U999");
    assert_eq!(appended.rating, 4.0);
    assert_eq!(appended.comment, "Good value");
    assert_eq!(
        appended.date.try_to_rfc3339_string().unwrap(),
        "2024-07-01T00:00:00Z"
    );

    // Existing reviews keep their order.
    assert_eq!(&after.reviews[..before.reviews.len()], &before.reviews[..]);
}

#[tokio::test]
async fn test_rollup_counts_order_and_precision() {
    let store = store();
    let plan = RunPlan::fleximart().unwrap();
    let report = Runner::new(&store).run(&plan).await.unwrap();

    let catalog = sample_catalog();
    for rollup in &report.price_rollup {
        let expected = catalog
            .iter()
            .filter(|p| p.category == rollup.category)
            .count() as i64;
        assert_eq!(rollup.product_count, expected);

        // Rounded to exactly 2 decimal places.
        let scaled = rollup.avg_price * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }

    for pair in report.price_rollup.windows(2) {
        assert!(pair[0].avg_price >= pair[1].avg_price);
    }
}

#[tokio::test]
async fn test_two_runs_append_two_reviews() {
    let store = store();
    let plan = RunPlan::fleximart().unwrap();
    let runner = Runner::new(&store);

    let first = runner.run(&plan).await.unwrap();
    let second = runner.run(&plan).await.unwrap();

    let first_len = first.pushed_product.unwrap().reviews.len();
    let second_len = second.pushed_product.unwrap().reviews.len();
    assert_eq!(second_len, first_len + 1);

    // The push is the only mutation: counts stay put.
    assert_eq!(first.product_count, second.product_count);
}
