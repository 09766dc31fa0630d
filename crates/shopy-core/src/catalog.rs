//! # Catalog Merge
//!
//! Plans how a remote product list replaces the local catalog.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Full-Replace Merge                                   │
//! │                                                                         │
//! │   local:  { eggs, milk, tea }        remote: [ milk', beans ]           │
//! │                                                                         │
//! │   milk  in both      ──► update (remote values win)                     │
//! │   beans remote only  ──► insert                                         │
//! │   eggs, tea local only ──► delete                                       │
//! │                                                                         │
//! │   result: { milk', beans }  (the feed is the source of truth)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records are validated before anything is planned: a single invalid record
//! makes the whole payload malformed, so a bad feed never half-replaces the
//! catalog.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::error::ValidationError;
use crate::types::{Product, RemoteProduct};

/// A feed record that failed validation.
#[derive(Debug, Error, PartialEq)]
#[error("record {index} ({id:?}) is invalid: {source}")]
pub struct RecordError {
    /// Position of the record in the payload.
    pub index: usize,
    /// The record's id as received.
    pub id: String,
    #[source]
    pub source: ValidationError,
}

/// Converts feed records into catalog products.
///
/// Ids are unique in the result; when the payload repeats an id, the last
/// occurrence wins and takes the position of the first.
pub fn products_from_feed(
    records: Vec<RemoteProduct>,
    synced_at: DateTime<Utc>,
) -> Result<Vec<Product>, RecordError> {
    let mut products: Vec<Product> = Vec::with_capacity(records.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (index, record) in records.into_iter().enumerate() {
        let id = record.id.clone();
        let product = record
            .into_product(synced_at)
            .map_err(|source| RecordError { index, id, source })?;

        match positions.get(&product.id) {
            Some(&pos) => products[pos] = product,
            None => {
                positions.insert(product.id.clone(), products.len());
                products.push(product);
            }
        }
    }

    Ok(products)
}

/// The writes needed to make the local catalog equal the remote one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CatalogMerge {
    /// Products not yet stored locally.
    pub inserts: Vec<Product>,
    /// Products already stored locally; their fields are overwritten.
    pub updates: Vec<Product>,
    /// Local ids absent from the payload.
    pub deletions: Vec<String>,
}

impl CatalogMerge {
    /// Number of products in the catalog after the merge is applied.
    pub fn resulting_len(&self) -> usize {
        self.inserts.len() + self.updates.len()
    }

    /// Returns true if applying the merge writes nothing but timestamps.
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletions.is_empty()
    }
}

/// Plans the upsert/delete set for a full catalog replace.
///
/// ## Example
/// ```rust
/// use chrono::Utc;
/// use shopy_core::catalog::plan_catalog_merge;
/// use shopy_core::Product;
///
/// let beans = Product {
///     id: "beans".into(),
///     title: "Beans".into(),
///     unit_price_cents: 73,
///     unit: "lb".into(),
///     synced_at: Utc::now(),
/// };
/// let local = vec!["eggs".to_string()];
///
/// let merge = plan_catalog_merge(&local, vec![beans]);
/// assert_eq!(merge.inserts.len(), 1);
/// assert_eq!(merge.deletions, vec!["eggs".to_string()]);
/// ```
pub fn plan_catalog_merge(local_ids: &[String], incoming: Vec<Product>) -> CatalogMerge {
    let local: HashSet<&str> = local_ids.iter().map(String::as_str).collect();
    let remote: HashSet<&str> = incoming.iter().map(|p| p.id.as_str()).collect();

    let deletions: Vec<String> = local_ids
        .iter()
        .filter(|id| !remote.contains(id.as_str()))
        .cloned()
        .collect();

    let (updates, inserts): (Vec<Product>, Vec<Product>) = incoming
        .into_iter()
        .partition(|p| local.contains(p.id.as_str()));

    CatalogMerge {
        inserts,
        updates,
        deletions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeedPrice;

    fn record(id: &str, title: &str, price: &str) -> RemoteProduct {
        RemoteProduct {
            id: id.to_string(),
            title: title.to_string(),
            price: FeedPrice::Text(price.to_string()),
            unit: "pc".to_string(),
        }
    }

    #[test]
    fn test_products_from_feed_last_duplicate_wins() {
        let products = products_from_feed(
            vec![
                record("eggs", "Eggs", "1.50"),
                record("milk", "Milk", "2.00"),
                record("eggs", "Free-range Eggs", "1.80"),
            ],
            Utc::now(),
        )
        .unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[0].id, "eggs");
        assert_eq!(products[0].title, "Free-range Eggs");
        assert_eq!(products[0].unit_price_cents, 180);
        assert_eq!(products[1].id, "milk");
    }

    #[test]
    fn test_products_from_feed_reports_bad_record() {
        let err = products_from_feed(
            vec![record("eggs", "Eggs", "1.50"), record("", "Nameless", "1.00")],
            Utc::now(),
        )
        .unwrap_err();

        assert_eq!(err.index, 1);
        assert!(matches!(err.source, ValidationError::Required { .. }));
    }

    #[test]
    fn test_plan_catalog_merge_full_replace() {
        let local = vec!["eggs".to_string(), "milk".to_string(), "tea".to_string()];
        let incoming = products_from_feed(
            vec![record("milk", "Milk", "2.10"), record("beans", "Beans", "0.73")],
            Utc::now(),
        )
        .unwrap();

        let merge = plan_catalog_merge(&local, incoming);

        assert_eq!(merge.updates.len(), 1);
        assert_eq!(merge.updates[0].id, "milk");
        assert_eq!(merge.inserts.len(), 1);
        assert_eq!(merge.inserts[0].id, "beans");
        assert_eq!(merge.deletions, vec!["eggs".to_string(), "tea".to_string()]);
        assert_eq!(merge.resulting_len(), 2);
    }

    #[test]
    fn test_plan_catalog_merge_empty_payload_deletes_everything() {
        let local = vec!["eggs".to_string()];
        let merge = plan_catalog_merge(&local, Vec::new());

        assert!(merge.inserts.is_empty());
        assert!(merge.updates.is_empty());
        assert_eq!(merge.deletions, vec!["eggs".to_string()]);
        assert_eq!(merge.resulting_len(), 0);
    }

    #[test]
    fn test_plan_catalog_merge_nothing_local() {
        let incoming =
            products_from_feed(vec![record("eggs", "Eggs", "1.50")], Utc::now()).unwrap();
        let merge = plan_catalog_merge(&[], incoming);
        assert_eq!(merge.inserts.len(), 1);
        assert!(merge.deletions.is_empty());
        assert!(!merge.is_empty());
    }
}
