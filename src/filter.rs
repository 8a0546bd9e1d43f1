use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Result, SalesError};
use crate::models::{Dataset, TransactionRecord};

/// Which stores a request covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum StoreSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl StoreSelection {
    /// Build from a list of labels; an empty list or the literal `all` means no filtering.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = labels
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if set.is_empty() || set.iter().any(|s| s.eq_ignore_ascii_case("all")) {
            Self::All
        } else {
            Self::Only(set)
        }
    }

    pub fn allows(&self, store: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(set) => set.is_empty() || set.contains(store),
        }
    }
}

/// Inclusive date range; an open bound is unbounded on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DateRange {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(SalesError::invalid(
                    "date range",
                    format!("{s}..{e}"),
                    "a start date on or before the end date",
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// The predicate set applied before any aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Filter {
    pub stores: StoreSelection,
    pub dates: DateRange,
}

impl Filter {
    pub fn new(stores: StoreSelection, dates: DateRange) -> Self {
        Self { stores, dates }
    }

    /// Same date range, every store.
    pub fn dates_only(&self) -> Self {
        Self {
            stores: StoreSelection::All,
            dates: self.dates,
        }
    }

    pub fn matches(&self, row: &TransactionRecord) -> bool {
        self.stores.allows(&row.store_location) && self.dates.contains(row.transaction_date)
    }

    /// Rows passing both predicates, borrowed from the dataset. May be empty.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a TransactionRecord> {
        let rows: Vec<_> = dataset.rows().iter().filter(|r| self.matches(r)).collect();
        log::debug!(
            "filter kept {} of {} rows (stores: {:?}, dates: {:?}..{:?})",
            rows.len(),
            dataset.len(),
            self.stores,
            self.dates.start,
            self.dates.end
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{date, sample};

    #[test]
    fn test_store_selection_all_variants() {
        assert_eq!(StoreSelection::from_labels(Vec::<String>::new()), StoreSelection::All);
        assert_eq!(StoreSelection::from_labels(["All"]), StoreSelection::All);
        let only = StoreSelection::from_labels(["Astoria", " Hell's Kitchen "]);
        assert!(only.allows("Astoria"));
        assert!(only.allows("Hell's Kitchen"));
        assert!(!only.allows("Lower Manhattan"));
        assert!(StoreSelection::Only(BTreeSet::new()).allows("Anywhere"));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(Some(date("2024-01-02")), Some(date("2024-01-08"))).unwrap();
        assert!(range.contains(date("2024-01-02")));
        assert!(range.contains(date("2024-01-08")));
        assert!(!range.contains(date("2024-01-01")));
        assert!(!range.contains(date("2024-01-09")));
        assert!(DateRange::unbounded().contains(date("1999-12-31")));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = DateRange::new(Some(date("2024-02-01")), Some(date("2024-01-01"))).unwrap_err();
        assert!(matches!(err, SalesError::InvalidParameter { param: "date range", .. }));
    }

    #[test]
    fn test_filter_requires_both_predicates() {
        let ds = sample();
        let filter = Filter::new(
            StoreSelection::from_labels(["Astoria"]),
            DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-07"))).unwrap(),
        );
        let rows = filter.apply(&ds);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.store_location == "Astoria"));
    }

    #[test]
    fn test_no_matching_rows_is_empty_not_error() {
        let ds = sample();
        let filter = Filter::new(
            StoreSelection::All,
            DateRange::new(Some(date("2030-01-01")), Some(date("2030-12-31"))).unwrap(),
        );
        assert!(filter.apply(&ds).is_empty());
    }

    #[test]
    fn test_dates_only_drops_store_selection() {
        let filter = Filter::new(StoreSelection::from_labels(["Astoria"]), DateRange::unbounded());
        assert_eq!(filter.dates_only().stores, StoreSelection::All);
    }
}
