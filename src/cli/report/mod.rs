pub mod text;

use serde::Serialize;

use crate::aggregate::{
    aggregate as run_aggregation, AggregationRequest, BucketPolicy, CategoryOrder, Granularity,
    GroupColumn, Grouping, Metric,
};
use crate::cli::{open_session, GlobalArgs, OutputFormat, Session};
use crate::error::Result;
use crate::reports;

fn emit<T: Serialize>(format: OutputFormat, data: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => println!("{}", render(data)),
    }
    Ok(())
}

fn granularity_or_default(raw: Option<&str>, session: &Session) -> Result<Granularity> {
    match raw {
        Some(g) => g.parse(),
        None => Ok(session.settings.default_granularity),
    }
}

fn policy_or_default(raw: Option<&str>, session: &Session) -> Result<BucketPolicy> {
    match raw {
        Some(p) => p.parse(),
        None => Ok(session.settings.bucket_policy),
    }
}

pub fn kpi(global: &GlobalArgs) -> Result<()> {
    let session = open_session(global)?;
    let rows = session.filter.apply(session.dataset());
    let data = reports::get_kpis(&rows);
    emit(global.format, &data, text::format_kpis)
}

pub fn trend(
    global: &GlobalArgs,
    metric: &str,
    granularity: Option<&str>,
    bucket_policy: Option<&str>,
) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let session = open_session(global)?;
    let granularity = granularity_or_default(granularity, &session)?;
    let policy = policy_or_default(bucket_policy, &session)?;
    let rows = session.filter.apply(session.dataset());
    let data = reports::get_trend(
        &rows,
        metric,
        granularity,
        policy,
        &session.settings.rolling_windows,
    )?;
    emit(global.format, &data, text::format_trend)
}

pub fn time_of_day(global: &GlobalArgs, metric: &str, by_category: bool) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let session = open_session(global)?;
    let rows = session.filter.apply(session.dataset());
    let data = reports::get_time_of_day(&rows, metric, by_category);
    emit(global.format, &data, text::format_time_of_day)
}

pub fn products(global: &GlobalArgs, metric: &str, category: Option<&str>, top: Option<usize>) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let session = open_session(global)?;
    let rows = session.filter.apply(session.dataset());
    let top_n = top.unwrap_or(session.settings.top_n);
    let data = reports::get_products(&rows, metric, category, top_n);
    emit(global.format, &data, text::format_products)
}

pub fn stores(
    global: &GlobalArgs,
    metric: &str,
    granularity: Option<&str>,
    bucket_policy: Option<&str>,
) -> Result<()> {
    let metric: Metric = metric.parse()?;
    let session = open_session(global)?;
    let granularity = granularity_or_default(granularity, &session)?;
    let policy = policy_or_default(bucket_policy, &session)?;
    let data = reports::get_store_report(
        session.dataset(),
        &session.filter,
        &session.settings.stores,
        metric,
        granularity,
        policy,
    );
    emit(global.format, &data, text::format_stores)
}

/// Options of the generic `aggregate` command, as given on the command line.
pub struct AggregateArgs<'a> {
    pub metric: &'a str,
    pub granularity: Option<&'a str>,
    pub group_by: Option<&'a str>,
    pub order: Option<&'a str>,
    pub top: Option<usize>,
    pub bucket_policy: Option<&'a str>,
}

pub fn aggregate(global: &GlobalArgs, args: &AggregateArgs) -> Result<()> {
    let metric: Metric = args.metric.parse()?;
    let column = args.group_by.map(str::parse::<GroupColumn>).transpose()?;
    // A bare --top ranks the largest groups.
    let order = match args.order {
        Some(o) => o.parse()?,
        None if args.top.is_some() => CategoryOrder::Descending,
        None => CategoryOrder::FirstSeen,
    };
    let session = open_session(global)?;

    let (grouping, key_header) = match column {
        Some(column) => (
            Grouping::Category {
                column,
                order,
                limit: args.top,
            },
            column.label(),
        ),
        None => {
            let granularity = granularity_or_default(args.granularity, &session)?;
            let policy = policy_or_default(args.bucket_policy, &session)?;
            (
                Grouping::Time {
                    granularity,
                    policy,
                },
                granularity.unit(),
            )
        }
    };
    let request = AggregationRequest {
        filter: session.filter.clone(),
        metric,
        grouping,
    };
    let data = run_aggregation(session.dataset(), &request);
    emit(global.format, &data, |a| text::format_aggregation(a, key_header))
}
