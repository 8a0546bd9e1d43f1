pub mod config;
#[cfg(feature = "dashboard")]
pub mod dashboard;
pub mod info;
pub mod report;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};

use crate::error::{Result, SalesError};
use crate::filter::{DateRange, Filter, StoreSelection};
use crate::loader::{load_dataset, LoadReport};
use crate::models::Dataset;
use crate::settings::{load_settings, shellexpand_path, Settings};

pub(crate) fn parse_date_opt(raw: Option<&str>, flag: &'static str) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| SalesError::invalid(flag, s, "a date as YYYY-MM-DD")),
    }
}

#[derive(Parser)]
#[command(
    name = "salesboard",
    version,
    about = "Sales analytics for point-of-sale transaction logs."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct GlobalArgs {
    /// Transaction CSV (default: data_path from settings)
    #[arg(long, global = true)]
    pub data: Option<String>,
    /// Only include this store; repeat for several (default: all stores)
    #[arg(long = "store", global = true)]
    pub stores: Vec<String>,
    /// Start date, inclusive: YYYY-MM-DD
    #[arg(long = "from", global = true)]
    pub from_date: Option<String>,
    /// End date, inclusive: YYYY-MM-DD
    #[arg(long = "to", global = true)]
    pub to_date: Option<String>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Headline KPIs: total sales, transactions, average ticket.
    Kpi,
    /// Sales over time with moving average and growth rate.
    Trend {
        /// Metric: revenue, transactions, quantity
        #[arg(long, default_value = "revenue")]
        metric: String,
        /// Granularity: daily, weekly, monthly (default from settings)
        #[arg(long)]
        granularity: Option<String>,
        /// Bucket policy: sparse, dense (default from settings)
        #[arg(long = "bucket-policy")]
        bucket_policy: Option<String>,
    },
    /// Aggregate one metric by period or by a categorical column.
    Aggregate {
        /// Metric: revenue, transactions, quantity
        #[arg(long, default_value = "revenue")]
        metric: String,
        /// Time buckets: daily, weekly, monthly (default from settings)
        #[arg(long, conflicts_with = "group_by")]
        granularity: Option<String>,
        /// Group by column: store_location, product_category, product_type
        #[arg(long = "group-by")]
        group_by: Option<String>,
        /// Group order: first-seen, descending
        #[arg(long, requires = "group_by")]
        order: Option<String>,
        /// Keep only the first N groups
        #[arg(long, requires = "group_by")]
        top: Option<usize>,
        /// Bucket policy for time buckets: sparse, dense
        #[arg(long = "bucket-policy", conflicts_with = "group_by")]
        bucket_policy: Option<String>,
    },
    /// Average sales by weekday and by hour of day.
    TimeOfDay {
        #[arg(long, default_value = "revenue")]
        metric: String,
        /// Also break the hourly view down by product category
        #[arg(long = "by-category")]
        by_category: bool,
    },
    /// Category distribution and top-selling product types.
    Products {
        #[arg(long, default_value = "revenue")]
        metric: String,
        /// Category for the product-type breakdown (default: largest)
        #[arg(long)]
        category: Option<String>,
        /// Number of top product types (default from settings)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Per-store KPIs, trends and growth for the configured stores.
    Stores {
        #[arg(long, default_value = "revenue")]
        metric: String,
        #[arg(long)]
        granularity: Option<String>,
        #[arg(long = "bucket-policy")]
        bucket_policy: Option<String>,
    },
    /// Interactive terminal dashboard.
    #[cfg(feature = "dashboard")]
    Dashboard,
    /// Show the loaded dataset: path, checksum, rows, stores, date span.
    Info,
    /// Manage settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print current settings and where they live.
    Show,
    /// Write a settings file with defaults.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Set the default transaction CSV.
    SetData {
        path: String,
    },
    /// Override the rolling-average window for a granularity.
    SetWindow {
        /// daily, weekly or monthly
        granularity: String,
        /// Window size in buckets
        window: usize,
    },
}

// ---------------------------------------------------------------------------
// Session: settings + loaded dataset + filter, built once per invocation
// ---------------------------------------------------------------------------

pub struct Session {
    pub settings: Settings,
    pub data_path: PathBuf,
    pub load: LoadReport,
    pub filter: Filter,
}

impl Session {
    pub fn dataset(&self) -> &Dataset {
        &self.load.dataset
    }
}

pub fn build_filter(global: &GlobalArgs) -> Result<Filter> {
    let dates = DateRange::new(
        parse_date_opt(global.from_date.as_deref(), "--from")?,
        parse_date_opt(global.to_date.as_deref(), "--to")?,
    )?;
    Ok(Filter::new(StoreSelection::from_labels(&global.stores), dates))
}

pub fn resolve_data_path(global: &GlobalArgs, settings: &Settings) -> PathBuf {
    let raw = global.data.as_deref().unwrap_or(&settings.data_path);
    PathBuf::from(shellexpand_path(raw))
}

pub fn open_session(global: &GlobalArgs) -> Result<Session> {
    let settings = load_settings()?;
    // Validate the request before paying for the load.
    let filter = build_filter(global)?;
    let data_path = resolve_data_path(global, &settings);
    if !data_path.exists() {
        return Err(SalesError::Settings(format!(
            "No transaction file at {}\nPass --data PATH or run `salesboard config set-data PATH`.",
            data_path.display()
        )));
    }
    let load = load_dataset(&data_path)?;
    Ok(Session {
        settings,
        data_path,
        load,
        filter,
    })
}

/// Bare `salesboard`: the dashboard when available, KPIs otherwise.
pub fn default_command(global: &GlobalArgs) -> Result<()> {
    #[cfg(feature = "dashboard")]
    {
        if global.format == OutputFormat::Text && std::io::IsTerminal::is_terminal(&std::io::stdout()) {
            return dashboard::run(global);
        }
    }
    report::kpi(global)
}

pub fn completions(shell: clap_complete::Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_opt() {
        assert_eq!(parse_date_opt(None, "--from").unwrap(), None);
        assert_eq!(
            parse_date_opt(Some("2023-06-30"), "--from").unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 30)
        );
        let err = parse_date_opt(Some("30-06-2023"), "--to").unwrap_err();
        assert!(err.to_string().contains("--to"));
    }

    #[test]
    fn test_build_filter_rejects_inverted_range() {
        let global = GlobalArgs {
            from_date: Some("2023-06-30".into()),
            to_date: Some("2023-01-01".into()),
            ..Default::default()
        };
        assert!(build_filter(&global).is_err());
    }

    #[test]
    fn test_build_filter_stores() {
        let global = GlobalArgs {
            stores: vec!["Astoria".into()],
            ..Default::default()
        };
        let filter = build_filter(&global).unwrap();
        assert!(filter.stores.allows("Astoria"));
        assert!(!filter.stores.allows("Hell's Kitchen"));
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "salesboard", "trend", "--metric", "quantity", "--store", "Astoria", "--store",
            "Hell's Kitchen", "--format", "json",
        ])
        .unwrap();
        assert_eq!(cli.global.stores.len(), 2);
        assert_eq!(cli.global.format, OutputFormat::Json);
        assert!(matches!(cli.command, Some(Commands::Trend { ref metric, .. }) if metric == "quantity"));
    }

    #[test]
    fn test_aggregate_grouping_flags_are_exclusive() {
        assert!(Cli::try_parse_from([
            "salesboard", "aggregate", "--granularity", "weekly", "--group-by", "store",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["salesboard", "aggregate", "--top", "3"]).is_err());
        let cli = Cli::try_parse_from([
            "salesboard", "aggregate", "--group-by", "store", "--order", "descending", "--top", "2",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Aggregate { top: Some(2), ref group_by, .. }) if group_by.as_deref() == Some("store")
        ));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
