use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// One line item from the point-of-sale log. Several rows may share a
/// `transaction_id` when a ticket contains more than one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub transaction_id: u64,
    pub transaction_date: NaiveDate,
    /// `None` when the source value could not be parsed as a time of day.
    pub transaction_time: Option<NaiveTime>,
    pub store_location: String,
    pub product_category: String,
    pub product_type: String,
    pub transaction_qty: u32,
    pub unit_price: f64,
    pub total_amount: f64,
}

impl TransactionRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        transaction_id: u64,
        transaction_date: NaiveDate,
        transaction_time: Option<NaiveTime>,
        store_location: impl Into<String>,
        product_category: impl Into<String>,
        product_type: impl Into<String>,
        transaction_qty: u32,
        unit_price: f64,
    ) -> Self {
        Self {
            transaction_id,
            transaction_date,
            transaction_time,
            store_location: store_location.into(),
            product_category: product_category.into(),
            product_type: product_type.into(),
            transaction_qty,
            unit_price,
            total_amount: f64::from(transaction_qty) * unit_price,
        }
    }
}

/// Immutable, cheaply clonable handle to a loaded transaction log.
///
/// Rows are never mutated after load. A reload builds a new `Dataset` and the
/// caller swaps its handle; anything still holding the old one keeps a
/// consistent snapshot.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Arc<[TransactionRecord]>,
    source: Option<PathBuf>,
    checksum: Option<String>,
}

impl Dataset {
    pub fn new(rows: Vec<TransactionRecord>) -> Self {
        Self {
            rows: rows.into(),
            source: None,
            checksum: None,
        }
    }

    pub(crate) fn with_source(mut self, path: &Path, checksum: String) -> Self {
        self.source = Some(path.to_path_buf());
        self.checksum = Some(checksum);
        self
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// SHA-256 of the source file, hex encoded.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }

    /// Distinct store labels, sorted.
    pub fn stores(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.store_location.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Distinct product categories in the order they first appear.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = Vec::<String>::new();
        for r in self.rows.iter() {
            if !seen.iter().any(|c| c == &r.product_category) {
                seen.push(r.product_category.clone());
            }
        }
        seen
    }

    /// Earliest and latest transaction dates, or `None` for an empty log.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.transaction_date).min()?;
        let max = self.rows.iter().map(|r| r.transaction_date).max()?;
        Some((min, max))
    }
}
