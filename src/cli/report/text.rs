use std::collections::BTreeMap;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::aggregate::{AggregatedSeries, Aggregation, Metric, Period};
use crate::fmt::{metric_value, money, number, opt, pct};
use crate::reports::{Kpis, ProductReport, StoreReport, TimeOfDayReport, TrendReport};

fn value_cell(v: f64, metric: Metric) -> Cell {
    Cell::new(metric_value(v, metric.is_currency())).set_alignment(CellAlignment::Right)
}

fn opt_value_cell(v: Option<f64>, metric: Metric) -> Cell {
    Cell::new(opt(v, |x| metric_value(x, metric.is_currency()))).set_alignment(CellAlignment::Right)
}

fn growth_cell(v: Option<f64>) -> Cell {
    let s = match v {
        Some(g) if g > 0.0 => pct(g).green().to_string(),
        Some(g) if g < 0.0 => pct(g).red().to_string(),
        other => opt(other, pct),
    };
    Cell::new(s).set_alignment(CellAlignment::Right)
}

/// Average-style values are rarely integral, so they always get two decimals.
fn average_cell(v: Option<f64>, metric: Metric) -> Cell {
    let s = if metric.is_currency() {
        opt(v, money)
    } else {
        opt(v, |x| format!("{x:.2}"))
    };
    Cell::new(s).set_alignment(CellAlignment::Right)
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

pub fn format_kpis(k: &Kpis) -> String {
    let mut table = Table::new();
    table.set_header(vec!["KPI", "Value"]);
    table.add_row(vec![Cell::new("Total Sales"), Cell::new(money(k.total_sales))]);
    table.add_row(vec![
        Cell::new("Total Transactions"),
        Cell::new(number(k.total_transactions as u64)),
    ]);
    table.add_row(vec![
        Cell::new("Average Qty per Ticket"),
        Cell::new(opt(k.avg_qty_per_ticket, |v| format!("{v:.2}"))),
    ]);
    table.add_row(vec![
        Cell::new("Average Sale Value"),
        Cell::new(opt(k.avg_sale_value, money)),
    ]);
    format!("Dashboard\n{table}")
}

// ---------------------------------------------------------------------------
// Generic aggregation
// ---------------------------------------------------------------------------

fn series_table<K: std::fmt::Display>(series: &AggregatedSeries<K>, key_header: &str) -> String {
    if series.is_empty() {
        return "No transactions match the current filters.".to_string();
    }
    let mut table = Table::new();
    table.set_header(vec![key_header, series.metric.label()]);
    for p in &series.points {
        table.add_row(vec![Cell::new(&p.key), value_cell(p.value, series.metric)]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        value_cell(series.total(), series.metric),
    ]);
    table.to_string()
}

pub fn format_aggregation(a: &Aggregation, key_header: &str) -> String {
    match a {
        Aggregation::Time(series) => format!(
            "{} by {key_header}\n{}",
            series.metric.axis_title(),
            series_table(series, key_header)
        ),
        Aggregation::Category(series) => format!(
            "{} by {key_header}\n{}",
            series.metric.axis_title(),
            series_table(series, key_header)
        ),
    }
}

// ---------------------------------------------------------------------------
// Sales trend
// ---------------------------------------------------------------------------

pub fn format_trend(r: &TrendReport) -> String {
    let title = format!("{}: {}", r.metric.axis_title(), r.granularity.label());
    if r.series.is_empty() {
        return format!("{title}\nNo transactions match the current filters.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        r.granularity.unit().to_string(),
        r.metric.label().to_string(),
        r.moving_average.label.clone(),
        r.growth.label.clone(),
    ]);
    for ((point, avg), growth) in r
        .series
        .points
        .iter()
        .zip(&r.moving_average.points)
        .zip(&r.growth.points)
    {
        table.add_row(vec![
            Cell::new(point.key.to_string()),
            value_cell(point.value, r.metric),
            average_cell(avg.value, r.metric),
            growth_cell(growth.value),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        value_cell(r.series.total(), r.metric),
        Cell::new(""),
        Cell::new(""),
    ]);
    format!("{title}\n{table}")
}

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

pub fn format_time_of_day(r: &TimeOfDayReport) -> String {
    let mut days = Table::new();
    days.set_header(vec!["Weekday".to_string(), format!("Average {}", r.metric.label())]);
    for d in &r.weekdays {
        days.add_row(vec![Cell::new(d.weekday), average_cell(d.value, r.metric)]);
    }

    let mut hours = Table::new();
    hours.set_header(vec!["Hour".to_string(), format!("Average {}", r.metric.label())]);
    for h in &r.hours {
        hours.add_row(vec![
            Cell::new(format!("{:02}:00", h.hour)),
            average_cell(Some(h.value), r.metric),
        ]);
    }

    let mut out = format!(
        "Average {} by Weekday\n{days}\n\nAverage {} by Hour of Day\n{hours}",
        r.metric.label(),
        r.metric.label()
    );

    if let Some(categories) = &r.by_category {
        let mut grid: BTreeMap<u32, Vec<Option<f64>>> = BTreeMap::new();
        for (i, cat) in categories.iter().enumerate() {
            for h in &cat.hours {
                grid.entry(h.hour).or_insert_with(|| vec![None; categories.len()])[i] = Some(h.value);
            }
        }
        let mut table = Table::new();
        let mut header = vec!["Hour".to_string()];
        header.extend(categories.iter().map(|c| c.category.clone()));
        table.set_header(header);
        for (hour, values) in &grid {
            let mut row = vec![Cell::new(format!("{hour:02}:00"))];
            row.extend(values.iter().map(|v| average_cell(*v, r.metric)));
            table.add_row(row);
        }
        out.push_str(&format!(
            "\n\nAverage {} by Hour of Day (Product Category)\n{table}",
            r.metric.label()
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

pub fn format_products(r: &ProductReport) -> String {
    let mut cats = Table::new();
    cats.set_header(vec!["Product Category", r.metric.label(), "%"]);
    for c in &r.categories {
        cats.add_row(vec![
            Cell::new(&c.name),
            value_cell(c.value, r.metric),
            Cell::new(pct(c.pct)).set_alignment(CellAlignment::Right),
        ]);
    }
    let mut out = format!("Product Category Distribution\n{cats}");

    let mut top = Table::new();
    top.set_header(vec!["#", "Product Type", r.top_products.metric.axis_title()]);
    for (i, p) in r.top_products.points.iter().enumerate() {
        top.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&p.key),
            value_cell(p.value, r.top_products.metric),
        ]);
    }
    out.push_str(&format!("\n\nTop-Selling Products\n{top}"));

    if let Some(cat) = &r.selected_category {
        let mut split = Table::new();
        split.set_header(vec!["Product Type", r.metric.label(), "%"]);
        for t in &r.category_breakdown {
            split.add_row(vec![
                Cell::new(&t.name),
                value_cell(t.value, r.metric),
                Cell::new(pct(t.pct)).set_alignment(CellAlignment::Right),
            ]);
        }
        out.push_str(&format!("\n\nProduct Type Distribution: {cat}\n{split}"));
    }
    out
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

fn period_grid<F>(r: &StoreReport, pick: F) -> BTreeMap<Period, Vec<Option<f64>>>
where
    F: Fn(usize) -> Vec<(Period, Option<f64>)>,
{
    let mut grid: BTreeMap<Period, Vec<Option<f64>>> = BTreeMap::new();
    for i in 0..r.trends.len() {
        for (period, value) in pick(i) {
            grid.entry(period).or_insert_with(|| vec![None; r.trends.len()])[i] = value;
        }
    }
    grid
}

pub fn format_stores(r: &StoreReport) -> String {
    let mut kpis = Table::new();
    kpis.set_header(vec![
        "Store",
        "Total Sales",
        "Transactions",
        "Avg Ticket Size",
        "Quantity Sold",
    ]);
    for s in &r.stores {
        kpis.add_row(vec![
            Cell::new(&s.store),
            Cell::new(money(s.total_sales)),
            Cell::new(number(s.transactions as u64)),
            Cell::new(opt(s.avg_ticket_size, money)),
            Cell::new(number(s.quantity)),
        ]);
    }
    let mut out = format!("Store Performance\n{kpis}");

    let mut header = vec![r.granularity.unit().to_string()];
    header.extend(r.trends.iter().map(|t| t.store.clone()));

    let values = period_grid(r, |i| {
        r.trends[i]
            .series
            .points
            .iter()
            .map(|p| (p.key, Some(p.value)))
            .collect()
    });
    let mut trend = Table::new();
    trend.set_header(header.clone());
    for (period, row) in &values {
        let mut cells = vec![Cell::new(period.to_string())];
        cells.extend(row.iter().map(|v| opt_value_cell(*v, r.metric)));
        trend.add_row(cells);
    }
    out.push_str(&format!(
        "\n\nStore Sales Comparison ({})\n{trend}",
        r.metric.label()
    ));

    let growth = period_grid(r, |i| {
        r.trends[i]
            .growth
            .points
            .iter()
            .map(|p| (p.key, p.value))
            .collect()
    });
    let mut growth_table = Table::new();
    growth_table.set_header(header);
    for (period, row) in &growth {
        let mut cells = vec![Cell::new(period.to_string())];
        cells.extend(row.iter().map(|v| growth_cell(*v)));
        growth_table.add_row(cells);
    }
    out.push_str(&format!(
        "\n\n{} Growth Rates by Store Location ({})\n{growth_table}",
        r.granularity.label(),
        r.metric.label()
    ));

    let mut share = Table::new();
    share.set_header(vec!["Store", r.metric.label(), "%"]);
    for d in &r.distribution {
        share.add_row(vec![
            Cell::new(&d.name),
            value_cell(d.value, r.metric),
            Cell::new(pct(d.pct)).set_alignment(CellAlignment::Right),
        ]);
    }
    out.push_str(&format!("\n\nStore Sales Distribution\n{share}"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{BucketPolicy, Granularity};
    use crate::derive::RollingWindows;
    use crate::filter::Filter;
    use crate::models::fixtures::sample;
    use crate::models::TransactionRecord;
    use crate::reports;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_kpis() {
        plain();
        let ds = sample();
        let rows: Vec<&TransactionRecord> = ds.rows().iter().collect();
        let out = format_kpis(&reports::get_kpis(&rows));
        assert!(out.contains("$39.00"));
        assert!(out.contains("$6.50"));
    }

    #[test]
    fn test_format_kpis_empty_shows_dash() {
        plain();
        let out = format_kpis(&reports::get_kpis(&[]));
        assert!(out.contains("$0.00"));
        assert!(out.contains("—"));
    }

    #[test]
    fn test_format_trend() {
        plain();
        let ds = sample();
        let rows: Vec<&TransactionRecord> = ds.rows().iter().collect();
        let r = reports::get_trend(
            &rows,
            Metric::Revenue,
            Granularity::Monthly,
            BucketPolicy::Sparse,
            &RollingWindows::default(),
        )
        .unwrap();
        let out = format_trend(&r);
        assert!(out.starts_with("Total Sales Amount: Monthly"));
        assert!(out.contains("2024-01"));
        assert!(out.contains("2-Months Moving Average"));
        assert!(out.contains("-74.19%"));
    }

    #[test]
    fn test_format_trend_empty() {
        let r = reports::get_trend(
            &[],
            Metric::Quantity,
            Granularity::Daily,
            BucketPolicy::Sparse,
            &RollingWindows::default(),
        )
        .unwrap();
        assert!(format_trend(&r).contains("No transactions match"));
    }

    #[test]
    fn test_format_time_of_day_lists_all_weekdays() {
        plain();
        let ds = sample();
        let rows: Vec<&TransactionRecord> = ds.rows().iter().collect();
        let out = format_time_of_day(&reports::get_time_of_day(&rows, Metric::Revenue, true));
        for day in ["Monday", "Wednesday", "Sunday"] {
            assert!(out.contains(day));
        }
        assert!(out.contains("07:00"));
        assert!(out.contains("(Product Category)"));
    }

    #[test]
    fn test_format_aggregation_by_store() {
        plain();
        let ds = sample();
        let rows: Vec<&TransactionRecord> = ds.rows().iter().collect();
        let series = crate::aggregate::by_category(
            &rows,
            Metric::Revenue,
            crate::aggregate::GroupColumn::StoreLocation,
            crate::aggregate::CategoryOrder::Descending,
            None,
        );
        let out = format_aggregation(&Aggregation::Category(series), "Store");
        assert!(out.starts_with("Total Sales Amount by Store"));
        assert!(out.contains("Lower Manhattan"));
        assert!(out.contains("$39.00"));
    }

    #[test]
    fn test_format_products_and_stores() {
        plain();
        let ds = sample();
        let rows: Vec<&TransactionRecord> = ds.rows().iter().collect();
        let out = format_products(&reports::get_products(&rows, Metric::Revenue, Some("Tea"), 3));
        assert!(out.contains("Top-Selling Products"));
        assert!(out.contains("Product Type Distribution: Tea"));

        let stores = vec!["Astoria".to_string(), "Lower Manhattan".to_string()];
        let r = reports::get_store_report(
            &ds,
            &Filter::default(),
            &stores,
            Metric::Revenue,
            Granularity::Monthly,
            BucketPolicy::Sparse,
        );
        let out = format_stores(&r);
        assert!(out.contains("Store Performance"));
        assert!(out.contains("Monthly Growth Rates by Store Location"));
        assert!(out.contains("$11.50"));
    }
}
