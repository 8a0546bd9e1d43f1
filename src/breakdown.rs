use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::Serialize;

use crate::aggregate::{Metric, Tally};
use crate::models::TransactionRecord;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayAverage {
    pub weekday: &'static str,
    /// `None` when no date in the data falls on this weekday.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourAverage {
    pub hour: u32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryHours {
    pub category: String,
    pub hours: Vec<HourAverage>,
}

/// Mean of per-date totals for each bucket key. Each date is aggregated in
/// full first, so days with heavy traffic count once rather than per row.
fn mean_of_daily_totals<K, F>(rows: &[&TransactionRecord], metric: Metric, key: F) -> BTreeMap<K, f64>
where
    K: Ord + Copy + std::hash::Hash,
    F: Fn(&TransactionRecord) -> Option<K>,
{
    let mut per_day: HashMap<(K, NaiveDate), Tally> = HashMap::new();
    for row in rows {
        if let Some(k) = key(*row) {
            per_day.entry((k, row.transaction_date)).or_default().add(row);
        }
    }

    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for ((k, _), tally) in &per_day {
        let entry = sums.entry(*k).or_insert((0.0, 0));
        entry.0 += tally.value(metric);
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(k, (sum, days))| (k, sum / days as f64))
        .collect()
}

/// Average per-day metric for each weekday, always Monday through Sunday.
pub fn by_weekday(rows: &[&TransactionRecord], metric: Metric) -> Vec<WeekdayAverage> {
    let means = mean_of_daily_totals(rows, metric, |r| {
        Some(r.transaction_date.weekday().num_days_from_monday())
    });
    WEEK.iter()
        .map(|day| WeekdayAverage {
            weekday: weekday_name(*day),
            value: means.get(&day.num_days_from_monday()).copied(),
        })
        .collect()
}

/// Average per-day metric for each hour that occurs in the data, ascending.
/// Rows without a parsed time are skipped.
pub fn by_hour(rows: &[&TransactionRecord], metric: Metric) -> Vec<HourAverage> {
    mean_of_daily_totals(rows, metric, |r| r.transaction_time.map(|t| t.hour()))
        .into_iter()
        .map(|(hour, value)| HourAverage { hour, value })
        .collect()
}

/// Hourly breakdown for each product category, in first-seen order.
pub fn by_hour_per_category(rows: &[&TransactionRecord], metric: Metric) -> Vec<CategoryHours> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&TransactionRecord>> = HashMap::new();
    for row in rows {
        let cat = row.product_category.as_str();
        groups
            .entry(cat)
            .or_insert_with(|| {
                order.push(cat);
                Vec::new()
            })
            .push(*row);
    }
    order
        .into_iter()
        .map(|cat| CategoryHours {
            category: cat.to_string(),
            hours: groups.get(cat).map(|g| by_hour(g, metric)).unwrap_or_default(),
        })
        .collect()
}
