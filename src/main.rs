use clap::Parser;

use salesboard::cli::{self, Cli, Commands, ConfigCommands};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    let global = &cli.global;

    let result = match cli.command {
        None => cli::default_command(global),
        Some(Commands::Kpi) => cli::report::kpi(global),
        Some(Commands::Trend {
            metric,
            granularity,
            bucket_policy,
        }) => cli::report::trend(
            global,
            &metric,
            granularity.as_deref(),
            bucket_policy.as_deref(),
        ),
        Some(Commands::Aggregate {
            metric,
            granularity,
            group_by,
            order,
            top,
            bucket_policy,
        }) => cli::report::aggregate(
            global,
            &cli::report::AggregateArgs {
                metric: &metric,
                granularity: granularity.as_deref(),
                group_by: group_by.as_deref(),
                order: order.as_deref(),
                top,
                bucket_policy: bucket_policy.as_deref(),
            },
        ),
        Some(Commands::TimeOfDay {
            metric,
            by_category,
        }) => cli::report::time_of_day(global, &metric, by_category),
        Some(Commands::Products {
            metric,
            category,
            top,
        }) => cli::report::products(global, &metric, category.as_deref(), top),
        Some(Commands::Stores {
            metric,
            granularity,
            bucket_policy,
        }) => cli::report::stores(
            global,
            &metric,
            granularity.as_deref(),
            bucket_policy.as_deref(),
        ),
        #[cfg(feature = "dashboard")]
        Some(Commands::Dashboard) => cli::dashboard::run(global),
        Some(Commands::Info) => cli::info::run(global),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Init { force } => cli::config::init(force),
            ConfigCommands::SetData { path } => cli::config::set_data(&path),
            ConfigCommands::SetWindow { granularity, window } => {
                cli::config::set_window(&granularity, window)
            }
        },
        Some(Commands::Completions { shell }) => cli::completions(shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
