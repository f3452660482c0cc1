//! Rendering of a run report for inspection.
//!
//! The runner produces plain data; this module turns it into aligned
//! text tables for the terminal or pretty JSON for machine consumption.

use crate::db::Review;
use crate::error::{FleximartError, Result};
use crate::runner::RunReport;
use std::fmt::Write;

/// Output format for run results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned text tables.
    #[default]
    Text,
    /// Pretty-printed JSON of the whole report.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Renders the report in the requested format.
pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| FleximartError::internal(format!("report failed to serialize: {e}"))),
    }
}

fn render_text(report: &RunReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Products in catalog: {}", report.product_count);
    let _ = writeln!(out);

    let _ = writeln!(out, "Discounted products ({})", report.discounted.len());
    out.push_str(&render_table(
        &["name", "price", "stock"],
        &report
            .discounted
            .iter()
            .map(|p| vec![p.name.clone(), format!("{:.2}", p.price), p.stock.to_string()])
            .collect::<Vec<_>>(),
    ));
    let _ = writeln!(out);

    let _ = writeln!(out, "Top rated products ({})", report.top_rated.len());
    out.push_str(&render_table(
        &["product_id", "name", "category", "price", "avgRating"],
        &report
            .top_rated
            .iter()
            .map(|p| {
                vec![
                    p.product_id.clone(),
                    p.name.clone(),
                    p.category.clone(),
                    format!("{:.2}", p.price),
                    format!("{:.2}", p.avg_rating),
                ]
            })
            .collect::<Vec<_>>(),
    ));
    let _ = writeln!(out);

    let _ = writeln!(
        out,
        "Review append: matched {}, modified {}",
        report.review_push.matched, report.review_push.modified
    );
    match &report.pushed_product {
        Some(product) => {
            let _ = writeln!(
                out,
                "{} now carries {} review(s):",
                product.name,
                product.reviews.len()
            );
            for review in &product.reviews {
                let _ = writeln!(out, "  {}", format_review(review));
            }
        }
        None => {
            let _ = writeln!(out, "No product matched the appended code.");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Average price by category ({})", report.price_rollup.len());
    out.push_str(&render_table(
        &["category", "avg_price", "product_count"],
        &report
            .price_rollup
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    format!("{:.2}", r.avg_price),
                    r.product_count.to_string(),
                ]
            })
            .collect::<Vec<_>>(),
    ));
    let _ = writeln!(out);

    let _ = writeln!(out, "Completed in {:.1?}", report.elapsed);
    out
}

fn format_review(review: &Review) -> String {
    let date = review
        .date
        .try_to_rfc3339_string()
        .unwrap_or_else(|_| "invalid-date".to_string());
    format!(
        "{}  {:.1}  \"{}\"  {}",
        review.user, review.rating, review.comment, date
    )
}

/// Renders an aligned text table with a header rule.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = String::new();
    let render_row = |cells: &[String], widths: &[usize]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    out.push_str(&render_row(&header_cells, &widths));
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in rows {
        out.push_str(&render_row(row, &widths));
        out.push('\n');
    }
    out
}
