//! # Output Rendering
//!
//! Plain-text views of command results. `--json` bypasses this module and
//! prints the serde representation instead.

use std::fmt::Write;

use shopy_core::{BasketChange, BasketSummary, Product};
use shopy_sync::SyncReport;

use crate::commands::checkout::{CheckoutView, OrderReceipt};

/// The shop screen: one product per line.
pub fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "No products. Run `shopy sync` first.\n".to_string();
    }

    let mut out = String::new();
    for product in products {
        let _ = writeln!(
            out,
            "{:<16} {:<24} {:>8} {}",
            product.id,
            product.title,
            product.unit_price().to_string(),
            product.unit
        );
    }
    out
}

/// The basket screen: line labels, then the badge.
pub fn render_basket(summary: &BasketSummary) -> String {
    if summary.is_empty() {
        return "Basket is empty.\n".to_string();
    }

    let mut out = String::new();
    for line in &summary.lines {
        let _ = writeln!(out, "{:<24} {}", line.title, line.label);
    }
    if let Some(ref badge) = summary.badge {
        let _ = writeln!(out, "Basket: {}", badge);
    }
    out
}

/// The checkout screen: line labels, then the converted total.
pub fn render_checkout(view: &CheckoutView) -> String {
    let mut out = String::new();
    if let Some(ref notice) = view.notice {
        let _ = writeln!(out, "Notice: {}", notice);
    }
    for line in &view.summary.lines {
        let _ = writeln!(out, "{:<24} {}", line.title, line.label);
    }
    let _ = writeln!(out, "{}", view.summary.total_label);
    out
}

pub fn render_order(receipt: &OrderReceipt) -> String {
    let mut out = String::new();
    if let Some(ref notice) = receipt.notice {
        let _ = writeln!(out, "Notice: {}", notice);
    }
    let _ = writeln!(
        out,
        "Order placed: {} item(s), {}",
        receipt.summary.total_quantity, receipt.summary.total_label
    );
    out
}

pub fn render_change(change: &BasketChange) -> String {
    match change {
        BasketChange::Insert(line) => format!("Added {} x{}\n", line.title, line.quantity),
        BasketChange::UpdateQuantity { id, quantity } => {
            format!("Set {} to {}\n", id, quantity)
        }
        BasketChange::Remove { id } => format!("Removed {}\n", id),
        BasketChange::Unchanged => "No change\n".to_string(),
    }
}

pub fn render_sync(report: &SyncReport) -> String {
    format!(
        "Synced {} product(s) from {}: {} new, {} updated, {} removed\n",
        report.total, report.source, report.inserted, report.updated, report.deleted
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopy_core::ExchangeContext;

    #[test]
    fn test_empty_views() {
        assert_eq!(render_products(&[]), "No products. Run `shopy sync` first.\n");
        assert_eq!(
            render_basket(&BasketSummary::empty(&ExchangeContext::base())),
            "Basket is empty.\n"
        );
    }

    #[test]
    fn test_checkout_shows_notice_and_total() {
        let view = CheckoutView {
            summary: BasketSummary::empty(&ExchangeContext::base()),
            notice: Some("Could not use XYZ".into()),
        };
        let text = render_checkout(&view);
        assert!(text.starts_with("Notice: Could not use XYZ\n"));
        assert!(text.ends_with("Total Price: USD 0.00\n"));
    }
}
