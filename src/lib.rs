//! Sales analytics over a point-of-sale transaction log: load, filter,
//! aggregate by period or category, and derive moving averages, growth rates
//! and time-of-day breakdowns for whatever surface renders them.

pub mod aggregate;
pub mod breakdown;
pub mod cli;
pub mod derive;
pub mod error;
pub mod filter;
pub mod fmt;
pub mod loader;
pub mod models;
pub mod reports;
pub mod settings;
#[cfg(feature = "dashboard")]
pub mod tui;

pub use aggregate::{
    aggregate, AggregatedSeries, Aggregation, AggregationRequest, BucketPolicy, CategoryOrder,
    Granularity, GroupColumn, Grouping, Metric, Period, SeriesPoint,
};
pub use derive::{DerivedSeries, RollingWindows};
pub use error::{Result, SalesError};
pub use filter::{DateRange, Filter, StoreSelection};
pub use loader::{load_dataset, LoadReport};
pub use models::{Dataset, TransactionRecord};
