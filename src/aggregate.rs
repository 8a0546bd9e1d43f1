use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Result, SalesError};
use crate::filter::Filter;
use crate::models::{Dataset, TransactionRecord};

fn expected_keys(keys: &[&str]) -> String {
    keys.join(", ")
}

/// `n / d`, or `None` when the denominator is zero.
pub fn safe_div(n: f64, d: f64) -> Option<f64> {
    if d == 0.0 {
        None
    } else {
        Some(n / d)
    }
}

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Revenue,
    #[serde(rename = "transactions")]
    TransactionCount,
    Quantity,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Revenue, Metric::TransactionCount, Metric::Quantity];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Revenue => "revenue",
            Self::TransactionCount => "transactions",
            Self::Quantity => "quantity",
        }
    }

    /// Short label used for toggles and column headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Sales",
            Self::TransactionCount => "Transactions",
            Self::Quantity => "Quantity",
        }
    }

    pub fn axis_title(&self) -> &'static str {
        match self {
            Self::Revenue => "Total Sales Amount",
            Self::TransactionCount => "Number of Transactions",
            Self::Quantity => "Total Quantity Sold",
        }
    }

    pub fn is_currency(&self) -> bool {
        matches!(self, Self::Revenue)
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Revenue => &["revenue", "sales", "total_amount"],
            Self::TransactionCount => &["transactions", "transaction-count", "count", "transaction_id"],
            Self::Quantity => &["quantity", "qty", "transaction_qty"],
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Revenue => Self::TransactionCount,
            Self::TransactionCount => Self::Quantity,
            Self::Quantity => Self::Revenue,
        }
    }
}

impl FromStr for Metric {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.aliases().contains(&needle.as_str()))
            .ok_or_else(|| {
                let keys: Vec<_> = Self::ALL.iter().map(|m| m.key()).collect();
                SalesError::invalid("metric", s, expected_keys(&keys))
            })
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ---------------------------------------------------------------------------
// Granularity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Daily, Granularity::Weekly, Granularity::Monthly];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Singular bucket noun: "Day", "Week", "Month".
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Daily => "Day",
            Self::Weekly => "Week",
            Self::Monthly => "Month",
        }
    }

    pub fn unit_plural(&self) -> &'static str {
        match self {
            Self::Daily => "Days",
            Self::Weekly => "Weeks",
            Self::Monthly => "Months",
        }
    }

    /// Truncate a date to the first day of its bucket. Weeks start on Monday.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => date,
            Self::Weekly => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Self::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// First day of the bucket following the one starting at `start`.
    pub fn next_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(1)),
            Self::Weekly => start.checked_add_days(Days::new(7)),
            Self::Monthly => start.checked_add_months(Months::new(1)),
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Daily => Self::Weekly,
            Self::Weekly => Self::Monthly,
            Self::Monthly => Self::Daily,
        }
    }
}

impl FromStr for Granularity {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        let found = match needle.as_str() {
            "daily" | "day" | "d" => Some(Self::Daily),
            "weekly" | "week" | "w" => Some(Self::Weekly),
            "monthly" | "month" | "m" => Some(Self::Monthly),
            _ => None,
        };
        found.ok_or_else(|| {
            let keys: Vec<_> = Self::ALL.iter().map(|g| g.key()).collect();
            SalesError::invalid("granularity", s, expected_keys(&keys))
        })
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A time bucket, identified by its granularity and first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    pub granularity: Granularity,
    pub start: NaiveDate,
}

impl Period {
    pub fn containing(granularity: Granularity, date: NaiveDate) -> Self {
        Self {
            granularity,
            start: granularity.bucket_start(date),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granularity {
            Granularity::Monthly => write!(f, "{}", self.start.format("%Y-%m")),
            _ => write!(f, "{}", self.start.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ---------------------------------------------------------------------------
// Grouping options
// ---------------------------------------------------------------------------

/// Whether empty interior time buckets are emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketPolicy {
    /// Only buckets with at least one row.
    #[default]
    Sparse,
    /// Zero-filled buckets strictly between the first and last observed bucket.
    Dense,
}

impl FromStr for BucketPolicy {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sparse" => Ok(Self::Sparse),
            "dense" => Ok(Self::Dense),
            _ => Err(SalesError::invalid("bucket policy", s, "sparse, dense")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupColumn {
    StoreLocation,
    ProductCategory,
    ProductType,
}

impl GroupColumn {
    pub const ALL: [GroupColumn; 3] = [
        GroupColumn::StoreLocation,
        GroupColumn::ProductCategory,
        GroupColumn::ProductType,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::StoreLocation => "store_location",
            Self::ProductCategory => "product_category",
            Self::ProductType => "product_type",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::StoreLocation => "Store",
            Self::ProductCategory => "Product Category",
            Self::ProductType => "Product Type",
        }
    }

    pub fn value<'a>(&self, row: &'a TransactionRecord) -> &'a str {
        match self {
            Self::StoreLocation => &row.store_location,
            Self::ProductCategory => &row.product_category,
            Self::ProductType => &row.product_type,
        }
    }
}

impl FromStr for GroupColumn {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        let found = match needle.as_str() {
            "store_location" | "store" => Some(Self::StoreLocation),
            "product_category" | "category" => Some(Self::ProductCategory),
            "product_type" | "type" => Some(Self::ProductType),
            _ => None,
        };
        found.ok_or_else(|| {
            let keys: Vec<_> = Self::ALL.iter().map(|c| c.key()).collect();
            SalesError::invalid("group_by", s, expected_keys(&keys))
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryOrder {
    /// Groups in the order their first row appears.
    #[default]
    FirstSeen,
    /// Largest aggregate first, for top-N rankings.
    Descending,
}

impl FromStr for CategoryOrder {
    type Err = SalesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-seen" | "first_seen" | "insertion" => Ok(Self::FirstSeen),
            "descending" | "desc" | "top" => Ok(Self::Descending),
            _ => Err(SalesError::invalid("order", s, "first-seen, descending")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    Time {
        granularity: Granularity,
        policy: BucketPolicy,
    },
    Category {
        column: GroupColumn,
        order: CategoryOrder,
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    pub filter: Filter,
    pub metric: Metric,
    pub grouping: Grouping,
}

// ---------------------------------------------------------------------------
// Per-bucket accumulator
// ---------------------------------------------------------------------------

/// Running totals for one bucket; yields any metric on demand.
#[derive(Debug, Default, Clone)]
pub(crate) struct Tally {
    revenue: f64,
    quantity: u64,
    tickets: HashSet<u64>,
}

impl Tally {
    pub(crate) fn add(&mut self, row: &TransactionRecord) {
        self.revenue += row.total_amount;
        self.quantity += u64::from(row.transaction_qty);
        self.tickets.insert(row.transaction_id);
    }

    pub(crate) fn of<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut tally = Self::default();
        for row in rows {
            tally.add(row);
        }
        tally
    }

    pub(crate) fn revenue(&self) -> f64 {
        self.revenue
    }

    pub(crate) fn quantity(&self) -> u64 {
        self.quantity
    }

    pub(crate) fn tickets(&self) -> usize {
        self.tickets.len()
    }

    pub(crate) fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Revenue => self.revenue,
            Metric::TransactionCount => self.tickets.len() as f64,
            Metric::Quantity => self.quantity as f64,
        }
    }
}

// ---------------------------------------------------------------------------
// AggregatedSeries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint<K> {
    pub key: K,
    pub value: f64,
}

/// Ordered `(key, value)` pairs with unique keys.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedSeries<K> {
    pub metric: Metric,
    pub points: Vec<SeriesPoint<K>>,
}

impl<K> AggregatedSeries<K> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.points.iter().map(|p| &p.key)
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Aggregation {
    Time(AggregatedSeries<Period>),
    Category(AggregatedSeries<String>),
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Filter `dataset` and aggregate it as the request describes.
pub fn aggregate(dataset: &Dataset, request: &AggregationRequest) -> Aggregation {
    let rows = request.filter.apply(dataset);
    match request.grouping {
        Grouping::Time {
            granularity,
            policy,
        } => Aggregation::Time(by_period(&rows, request.metric, granularity, policy)),
        Grouping::Category {
            column,
            order,
            limit,
        } => Aggregation::Category(by_category(&rows, request.metric, column, order, limit)),
    }
}

/// Time-bucketed aggregation in chronological order.
pub fn by_period(
    rows: &[&TransactionRecord],
    metric: Metric,
    granularity: Granularity,
    policy: BucketPolicy,
) -> AggregatedSeries<Period> {
    let mut buckets: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for row in rows {
        buckets
            .entry(granularity.bucket_start(row.transaction_date))
            .or_default()
            .add(row);
    }
    log::debug!(
        "{} by {}: {} rows into {} buckets",
        metric,
        granularity,
        rows.len(),
        buckets.len()
    );

    let mut points: Vec<SeriesPoint<Period>> = Vec::with_capacity(buckets.len());
    for (start, tally) in &buckets {
        if policy == BucketPolicy::Dense {
            if let Some(prev) = points.last().map(|p| p.key.start) {
                let mut cursor = granularity.next_start(prev);
                while let Some(gap) = cursor.filter(|c| c < start) {
                    points.push(SeriesPoint {
                        key: Period { granularity, start: gap },
                        value: 0.0,
                    });
                    cursor = granularity.next_start(gap);
                }
            }
        }
        points.push(SeriesPoint {
            key: Period {
                granularity,
                start: *start,
            },
            value: tally.value(metric),
        });
    }

    AggregatedSeries { metric, points }
}

/// Categorical aggregation. `limit` truncates after ordering.
pub fn by_category(
    rows: &[&TransactionRecord],
    metric: Metric,
    column: GroupColumn,
    order: CategoryOrder,
    limit: Option<usize>,
) -> AggregatedSeries<String> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Tally)> = Vec::new();
    for row in rows {
        let key = column.value(row);
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push((key.to_string(), Tally::default()));
            groups.len() - 1
        });
        groups[slot].1.add(row);
    }

    let mut points: Vec<SeriesPoint<String>> = groups
        .into_iter()
        .map(|(key, tally)| SeriesPoint {
            key,
            value: tally.value(metric),
        })
        .collect();

    if order == CategoryOrder::Descending {
        // Stable sort keeps first-seen order among ties.
        points.sort_by(|a, b| b.value.total_cmp(&a.value));
    }
    if let Some(n) = limit {
        points.truncate(n);
    }

    AggregatedSeries { metric, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DateRange, StoreSelection};
    use crate::models::fixtures::{date, row, sample};

    fn all_rows(ds: &Dataset) -> Vec<&TransactionRecord> {
        ds.rows().iter().collect()
    }

    #[test]
    fn test_two_row_daily_revenue() {
        let ds = Dataset::new(vec![
            row(1, "2024-01-01", "08:00:00", "Astoria", "Coffee", "Latte", 2, 3.0),
            row(2, "2024-01-02", "08:00:00", "Astoria", "Coffee", "Latte", 1, 5.0),
        ]);
        let series = by_period(&all_rows(&ds), Metric::Revenue, Granularity::Daily, BucketPolicy::Sparse);
        let keys: Vec<String> = series.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(series.values(), vec![6.0, 5.0]);
        assert_eq!(series.total(), 11.0);
    }

    #[test]
    fn test_transaction_count_is_distinct_ids() {
        let ds = Dataset::new(vec![
            row(10, "2024-01-01", "08:00:00", "Astoria", "Coffee", "Latte", 1, 3.0),
            row(10, "2024-01-01", "08:00:00", "Astoria", "Bakery", "Scone", 1, 2.0),
            row(10, "2024-01-01", "08:00:00", "Astoria", "Tea", "Chai", 1, 2.0),
            row(11, "2024-01-01", "09:00:00", "Astoria", "Coffee", "Drip", 1, 2.0),
            row(11, "2024-01-01", "09:00:00", "Astoria", "Coffee", "Drip", 1, 2.0),
        ]);
        let series = by_period(
            &all_rows(&ds),
            Metric::TransactionCount,
            Granularity::Daily,
            BucketPolicy::Sparse,
        );
        assert_eq!(series.values(), vec![2.0]);
    }

    #[test]
    fn test_revenue_is_conserved_across_granularities() {
        let ds = sample();
        let total: f64 = ds.rows().iter().map(|r| r.total_amount).sum();
        for g in Granularity::ALL {
            for policy in [BucketPolicy::Sparse, BucketPolicy::Dense] {
                let series = by_period(&all_rows(&ds), Metric::Revenue, g, policy);
                assert!((series.total() - total).abs() < 1e-9, "{g} {policy:?}");
            }
        }
    }

    #[test]
    fn test_revenue_is_conserved_under_filters() {
        let ds = sample();
        let filters = [
            Filter::new(StoreSelection::from_labels(["Astoria"]), DateRange::default()),
            Filter::new(
                StoreSelection::All,
                DateRange::new(Some(date("2024-01-02")), Some(date("2024-03-31"))).unwrap(),
            ),
            Filter::new(
                StoreSelection::from_labels(["Lower Manhattan", "Hell's Kitchen"]),
                DateRange::new(Some(date("2024-01-01")), Some(date("2024-01-08"))).unwrap(),
            ),
        ];
        for filter in filters {
            let rows = filter.apply(&ds);
            assert!(!rows.is_empty());
            let total: f64 = rows.iter().map(|r| r.total_amount).sum();
            for g in Granularity::ALL {
                for policy in [BucketPolicy::Sparse, BucketPolicy::Dense] {
                    let series = by_period(&rows, Metric::Revenue, g, policy);
                    assert!((series.total() - total).abs() < 1e-9, "{filter:?} {g} {policy:?}");
                }
            }
            let by_store = by_category(
                &rows,
                Metric::Revenue,
                GroupColumn::StoreLocation,
                CategoryOrder::FirstSeen,
                None,
            );
            assert!((by_store.total() - total).abs() < 1e-9);
        }
    }

    #[test]
    fn test_weekly_buckets_start_on_monday() {
        let ds = Dataset::new(vec![
            row(1, "2024-01-03", "08:00:00", "Astoria", "Coffee", "Latte", 1, 1.0), // Wed
            row(2, "2024-01-07", "08:00:00", "Astoria", "Coffee", "Latte", 1, 1.0), // Sun
            row(3, "2024-01-08", "08:00:00", "Astoria", "Coffee", "Latte", 1, 1.0), // Mon
        ]);
        let series = by_period(&all_rows(&ds), Metric::Quantity, Granularity::Weekly, BucketPolicy::Sparse);
        let starts: Vec<NaiveDate> = series.keys().map(|p| p.start).collect();
        assert_eq!(starts, vec![date("2024-01-01"), date("2024-01-08")]);
        assert_eq!(series.values(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_monthly_keys_display_as_year_month() {
        let ds = sample();
        let series = by_period(&all_rows(&ds), Metric::Quantity, Granularity::Monthly, BucketPolicy::Sparse);
        let keys: Vec<String> = series.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-03"]);
        assert_eq!(series.values(), vec![10.0, 4.0]);
    }

    #[test]
    fn test_dense_fills_interior_gaps_only() {
        let ds = sample();
        let series = by_period(&all_rows(&ds), Metric::Revenue, Granularity::Monthly, BucketPolicy::Dense);
        let keys: Vec<String> = series.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(series.points[1].value, 0.0);

        let weekly = by_period(&all_rows(&ds), Metric::Revenue, Granularity::Weekly, BucketPolicy::Dense);
        assert_eq!(weekly.points.first().unwrap().key.start, date("2024-01-01"));
        assert_eq!(weekly.points.last().unwrap().key.start, date("2024-03-04"));
        // Jan 1 through Mar 4 inclusive is 10 Monday-starting weeks.
        assert_eq!(weekly.len(), 10);
    }

    #[test]
    fn test_empty_rows_give_empty_series() {
        for policy in [BucketPolicy::Sparse, BucketPolicy::Dense] {
            let series = by_period(&[], Metric::Revenue, Granularity::Daily, policy);
            assert!(series.is_empty());
        }
        let series = by_category(&[], Metric::Revenue, GroupColumn::ProductType, CategoryOrder::Descending, Some(5));
        assert!(series.is_empty());
    }

    #[test]
    fn test_by_category_first_seen_and_descending() {
        let ds = sample();
        let rows = all_rows(&ds);
        let first_seen = by_category(&rows, Metric::Revenue, GroupColumn::ProductCategory, CategoryOrder::FirstSeen, None);
        let keys: Vec<&str> = first_seen.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Coffee", "Bakery", "Tea"]);
        assert_eq!(first_seen.values(), vec![19.0, 2.5, 17.5]);

        let top = by_category(&rows, Metric::Revenue, GroupColumn::ProductType, CategoryOrder::Descending, Some(2));
        let keys: Vec<&str> = top.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Chai", "Drip"]);
        assert_eq!(top.values(), vec![17.5, 10.0]);
    }

    #[test]
    fn test_aggregate_applies_filter() {
        let ds = sample();
        let request = AggregationRequest {
            filter: Filter::new(StoreSelection::from_labels(["Astoria"]), DateRange::unbounded()),
            metric: Metric::TransactionCount,
            grouping: Grouping::Time {
                granularity: Granularity::Monthly,
                policy: BucketPolicy::Sparse,
            },
        };
        match aggregate(&ds, &request) {
            Aggregation::Time(series) => assert_eq!(series.values(), vec![2.0]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_empty_store_selection_and_empty_range_give_empty_series() {
        let ds = sample();
        let request = AggregationRequest {
            filter: Filter::new(
                StoreSelection::from_labels(Vec::<String>::new()),
                DateRange::new(Some(date("2025-01-01")), Some(date("2025-01-31"))).unwrap(),
            ),
            metric: Metric::Revenue,
            grouping: Grouping::Time {
                granularity: Granularity::Daily,
                policy: BucketPolicy::Dense,
            },
        };
        match aggregate(&ds, &request) {
            Aggregation::Time(series) => assert!(series.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_enum_parsing_rejects_unknown_values() {
        assert_eq!("Sales".parse::<Metric>().unwrap(), Metric::Revenue);
        assert_eq!("transaction-count".parse::<Metric>().unwrap(), Metric::TransactionCount);
        assert_eq!("W".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!("category".parse::<GroupColumn>().unwrap(), GroupColumn::ProductCategory);

        let err = "profit".parse::<Metric>().unwrap_err();
        assert!(matches!(err, SalesError::InvalidParameter { param: "metric", .. }));
        assert!(err.to_string().contains("revenue, transactions, quantity"));

        let err = "hourly".parse::<Granularity>().unwrap_err();
        assert!(matches!(err, SalesError::InvalidParameter { param: "granularity", .. }));
        assert!("packed".parse::<BucketPolicy>().is_err());
    }

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), Some(2.5));
        assert_eq!(safe_div(10.0, 0.0), None);
    }
}
