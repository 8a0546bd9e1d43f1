use serde::Serialize;

use crate::aggregate::{
    by_category, by_period, safe_div, AggregatedSeries, BucketPolicy, CategoryOrder, Granularity,
    GroupColumn, Metric, Period, SeriesPoint, Tally,
};
use crate::breakdown::{by_hour, by_hour_per_category, by_weekday, CategoryHours, HourAverage, WeekdayAverage};
use crate::derive::{percent_change, rolling_average, DerivedSeries, RollingWindows};
use crate::error::Result;
use crate::filter::Filter;
use crate::models::{Dataset, TransactionRecord};

// ---------------------------------------------------------------------------
// Headline KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_transactions: usize,
    pub total_quantity: u64,
    /// Items per ticket; `None` with no transactions.
    pub avg_qty_per_ticket: Option<f64>,
    /// Revenue per ticket; `None` with no transactions.
    pub avg_sale_value: Option<f64>,
}

impl Kpis {
    fn from_tally(tally: &Tally) -> Self {
        let tickets = tally.tickets() as f64;
        Self {
            total_sales: tally.revenue(),
            total_transactions: tally.tickets(),
            total_quantity: tally.quantity(),
            avg_qty_per_ticket: safe_div(tally.quantity() as f64, tickets),
            avg_sale_value: safe_div(tally.revenue(), tickets),
        }
    }
}

pub fn get_kpis(rows: &[&TransactionRecord]) -> Kpis {
    Kpis::from_tally(&Tally::of(rows.iter().copied()))
}

// ---------------------------------------------------------------------------
// Sales trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendReport {
    pub metric: Metric,
    pub granularity: Granularity,
    pub series: AggregatedSeries<Period>,
    pub moving_average: DerivedSeries<Period>,
    pub growth: DerivedSeries<Period>,
}

pub fn get_trend(
    rows: &[&TransactionRecord],
    metric: Metric,
    granularity: Granularity,
    policy: BucketPolicy,
    windows: &RollingWindows,
) -> Result<TrendReport> {
    let series = by_period(rows, metric, granularity, policy);
    let moving_average = rolling_average(&series, granularity, windows)?;
    let growth = percent_change(&series, granularity);
    Ok(TrendReport {
        metric,
        granularity,
        series,
        moving_average,
        growth,
    })
}

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeOfDayReport {
    pub metric: Metric,
    pub weekdays: Vec<WeekdayAverage>,
    pub hours: Vec<HourAverage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_category: Option<Vec<CategoryHours>>,
}

pub fn get_time_of_day(rows: &[&TransactionRecord], metric: Metric, per_category: bool) -> TimeOfDayReport {
    TimeOfDayReport {
        metric,
        weekdays: by_weekday(rows, metric),
        hours: by_hour(rows, metric),
        by_category: per_category.then(|| by_hour_per_category(rows, metric)),
    }
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareItem {
    pub name: String,
    pub value: f64,
    /// Percent of the column total; 0 when the total is 0.
    pub pct: f64,
}

fn with_shares(series: &AggregatedSeries<String>) -> Vec<ShareItem> {
    let total = series.total();
    series
        .points
        .iter()
        .map(|p| ShareItem {
            name: p.key.clone(),
            value: p.value,
            pct: safe_div(p.value * 100.0, total).unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductReport {
    pub metric: Metric,
    pub categories: Vec<ShareItem>,
    /// Product types ranked by the ranking metric, largest first.
    pub top_products: AggregatedSeries<String>,
    pub selected_category: Option<String>,
    /// Product-type split inside `selected_category`.
    pub category_breakdown: Vec<ShareItem>,
}

/// Ranking metric for top products. Transactions rank by units sold,
/// since a ticket count per product type is rarely what anyone wants.
pub fn ranking_metric(metric: Metric) -> Metric {
    match metric {
        Metric::TransactionCount => Metric::Quantity,
        other => other,
    }
}

pub fn get_products(
    rows: &[&TransactionRecord],
    metric: Metric,
    category: Option<&str>,
    top_n: usize,
) -> ProductReport {
    let categories = by_category(
        rows,
        metric,
        GroupColumn::ProductCategory,
        CategoryOrder::Descending,
        None,
    );
    let top_products = by_category(
        rows,
        ranking_metric(metric),
        GroupColumn::ProductType,
        CategoryOrder::Descending,
        Some(top_n),
    );

    // Default to the largest category when none was asked for.
    let selected_category = category
        .map(str::to_string)
        .or_else(|| categories.points.first().map(|p| p.key.clone()));
    let category_breakdown = match &selected_category {
        Some(cat) => {
            let in_cat: Vec<&TransactionRecord> = rows
                .iter()
                .copied()
                .filter(|r| &r.product_category == cat)
                .collect();
            with_shares(&by_category(
                &in_cat,
                metric,
                GroupColumn::ProductType,
                CategoryOrder::Descending,
                None,
            ))
        }
        None => Vec::new(),
    };

    ProductReport {
        metric,
        categories: with_shares(&categories),
        top_products,
        selected_category,
        category_breakdown,
    }
}

// ---------------------------------------------------------------------------
// Store performance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreKpis {
    pub store: String,
    pub total_sales: f64,
    pub transactions: usize,
    pub avg_ticket_size: Option<f64>,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreTrend {
    pub store: String,
    pub series: AggregatedSeries<Period>,
    pub growth: DerivedSeries<Period>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreReport {
    pub metric: Metric,
    pub granularity: Granularity,
    pub stores: Vec<StoreKpis>,
    pub trends: Vec<StoreTrend>,
    pub distribution: Vec<ShareItem>,
}

/// Side-by-side store comparison over the filter's date range. The store
/// selection is ignored; every configured store gets one entry, in order.
pub fn get_store_report(
    dataset: &Dataset,
    filter: &Filter,
    stores: &[String],
    metric: Metric,
    granularity: Granularity,
    policy: BucketPolicy,
) -> StoreReport {
    let rows = filter.dates_only().apply(dataset);

    let mut kpis = Vec::with_capacity(stores.len());
    let mut trends = Vec::with_capacity(stores.len());
    for store in stores {
        let store_rows: Vec<&TransactionRecord> = rows
            .iter()
            .copied()
            .filter(|r| &r.store_location == store)
            .collect();
        if store_rows.is_empty() {
            log::debug!("no rows for configured store '{store}'");
        }

        let tally = Tally::of(store_rows.iter().copied());
        kpis.push(StoreKpis {
            store: store.clone(),
            total_sales: tally.revenue(),
            transactions: tally.tickets(),
            avg_ticket_size: safe_div(tally.revenue(), tally.tickets() as f64),
            quantity: tally.quantity(),
        });

        let series = by_period(&store_rows, metric, granularity, policy);
        let growth = percent_change(&series, granularity);
        trends.push(StoreTrend {
            store: store.clone(),
            series,
            growth,
        });
    }

    let totals = AggregatedSeries {
        metric,
        points: trends
            .iter()
            .map(|t| SeriesPoint {
                key: t.store.clone(),
                value: t.series.total(),
            })
            .collect(),
    };

    StoreReport {
        metric,
        granularity,
        stores: kpis,
        trends,
        distribution: with_shares(&totals),
    }
}
