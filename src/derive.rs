//! Transforms over an already-aggregated time series: trailing moving average
//! and period-over-period percent change.

use serde::{Deserialize, Serialize};

use crate::aggregate::{safe_div, AggregatedSeries, Granularity};
use crate::error::{Result, SalesError};

/// Rolling-average window (in buckets) for each granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindows {
    #[serde(default = "default_daily")]
    pub daily: usize,
    #[serde(default = "default_weekly")]
    pub weekly: usize,
    #[serde(default = "default_monthly")]
    pub monthly: usize,
}

fn default_daily() -> usize {
    7
}

fn default_weekly() -> usize {
    4
}

fn default_monthly() -> usize {
    2
}

impl Default for RollingWindows {
    fn default() -> Self {
        Self {
            daily: default_daily(),
            weekly: default_weekly(),
            monthly: default_monthly(),
        }
    }
}

impl RollingWindows {
    pub fn window(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Daily => self.daily,
            Granularity::Weekly => self.weekly,
            Granularity::Monthly => self.monthly,
        }
    }

    /// Override one entry. A zero window is rejected.
    pub fn set(&mut self, granularity: Granularity, window: usize) -> Result<()> {
        if window == 0 {
            return Err(SalesError::invalid(
                "rolling window",
                format!("{granularity}=0"),
                "a window of at least 1 bucket",
            ));
        }
        match granularity {
            Granularity::Daily => self.daily = window,
            Granularity::Weekly => self.weekly = window,
            Granularity::Monthly => self.monthly = window,
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        match Granularity::ALL.into_iter().find(|g| self.window(*g) == 0) {
            Some(g) => Err(SalesError::invalid(
                "rolling window",
                format!("{g}=0"),
                "a window of at least 1 bucket",
            )),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedPoint<K> {
    pub key: K,
    pub value: Option<f64>,
}

/// Same keys as the source series; `None` where the value is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedSeries<K> {
    pub label: String,
    pub points: Vec<DerivedPoint<K>>,
}

impl<K> DerivedSeries<K> {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.value).collect()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Plain-slice trailing mean. Positions before the window fills are `None`.
pub fn rolling_mean_values(values: &[f64], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(SalesError::invalid("rolling window", "0", "a window of at least 1 bucket"));
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    Ok(out)
}

/// Percent change from the previous value, rounded to 2 places. The first
/// entry, and any entry following a zero, is `None`.
pub fn pct_change_values(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for (i, v) in values.iter().enumerate() {
        let change = if i == 0 {
            None
        } else {
            let prev = values[i - 1];
            safe_div(v - prev, prev).map(|r| round2(r * 100.0))
        };
        out.push(change);
    }
    out
}

pub fn rolling_average<K: Clone>(
    series: &AggregatedSeries<K>,
    granularity: Granularity,
    windows: &RollingWindows,
) -> Result<DerivedSeries<K>> {
    let window = windows.window(granularity);
    let values = rolling_mean_values(&series.values(), window)?;
    Ok(DerivedSeries {
        label: format!("{window}-{} Moving Average", granularity.unit_plural()),
        points: zip_keys(series, values),
    })
}

pub fn percent_change<K: Clone>(series: &AggregatedSeries<K>, granularity: Granularity) -> DerivedSeries<K> {
    DerivedSeries {
        label: format!("Growth Rate per {}", granularity.unit()),
        points: zip_keys(series, pct_change_values(&series.values())),
    }
}

fn zip_keys<K: Clone>(series: &AggregatedSeries<K>, values: Vec<Option<f64>>) -> Vec<DerivedPoint<K>> {
    series
        .points
        .iter()
        .zip(values)
        .map(|(p, value)| DerivedPoint {
            key: p.key.clone(),
            value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Metric, SeriesPoint};

    fn series(values: &[f64]) -> AggregatedSeries<usize> {
        AggregatedSeries {
            metric: Metric::Revenue,
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| SeriesPoint { key: i, value: *v })
                .collect(),
        }
    }

    #[test]
    fn test_default_windows() {
        let w = RollingWindows::default();
        assert_eq!(w.window(Granularity::Daily), 7);
        assert_eq!(w.window(Granularity::Weekly), 4);
        assert_eq!(w.window(Granularity::Monthly), 2);
    }

    #[test]
    fn test_override_window_and_reject_zero() {
        let mut w = RollingWindows::default();
        w.set(Granularity::Weekly, 3).unwrap();
        assert_eq!(w.window(Granularity::Weekly), 3);
        assert!(w.set(Granularity::Daily, 0).is_err());
        let bad = RollingWindows { daily: 0, ..Default::default() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_rolling_mean_keeps_length_and_leading_nones() {
        let s = series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let mut w = RollingWindows::default();
        w.set(Granularity::Daily, 3).unwrap();
        let avg = rolling_average(&s, Granularity::Daily, &w).unwrap();
        assert_eq!(avg.len(), 5);
        assert_eq!(avg.values(), vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(avg.label, "3-Days Moving Average");
    }

    #[test]
    fn test_rolling_mean_shorter_than_window_is_all_none() {
        let s = series(&[5.0, 6.0]);
        let avg = rolling_average(&s, Granularity::Weekly, &RollingWindows::default()).unwrap();
        assert_eq!(avg.values(), vec![None, None]);
    }

    #[test]
    fn test_rolling_mean_window_one_is_identity() {
        let out = rolling_mean_values(&[2.0, 4.0], 1).unwrap();
        assert_eq!(out, vec![Some(2.0), Some(4.0)]);
        assert!(rolling_mean_values(&[1.0], 0).is_err());
    }

    #[test]
    fn test_pct_change_constant_series_is_zero() {
        let out = pct_change_values(&[4.0, 4.0, 4.0, 4.0]);
        assert_eq!(out, vec![None, Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_pct_change_after_zero_is_none() {
        let out = pct_change_values(&[0.0, 5.0, 10.0, 0.0, 3.0]);
        assert_eq!(out, vec![None, None, Some(100.0), Some(-100.0), None]);
        assert!(out.iter().flatten().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pct_change_rounds_to_two_places() {
        let s = series(&[3.0, 4.0]);
        let growth = percent_change(&s, Granularity::Monthly);
        assert_eq!(growth.values(), vec![None, Some(33.33)]);
        assert_eq!(growth.label, "Growth Rate per Month");
    }

    #[test]
    fn test_empty_series_derives_empty() {
        let s = series(&[]);
        assert!(percent_change(&s, Granularity::Daily).is_empty());
        assert!(rolling_average(&s, Granularity::Daily, &RollingWindows::default())
            .unwrap()
            .is_empty());
    }
}
