use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use statchart::config::Config;
use statchart::models::{MetricField, PeriodRecord, PeriodUnit};
use statchart::window::{parse_date, WindowResolver};
use statchart::{format_period, QueryPlanner, ResultMerger};

#[derive(Parser)]
#[command(name = "statchart")]
#[command(about = "Stats chart query planning and result merging", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the window anchor for a date
    Anchor {
        #[arg(long)]
        period: PeriodUnit,
        #[arg(long)]
        date: String,
        #[arg(long)]
        quantity: u32,
        /// Minutes east of UTC (defaults to STATCHART_TZ_OFFSET_MINUTES)
        #[arg(long, allow_hyphen_values = true)]
        tz_offset: Option<i32>,
    },
    /// Print the primary and supplemental queries for a chart tab as JSON
    Queries {
        #[arg(long)]
        period: PeriodUnit,
        #[arg(long)]
        date: String,
        #[arg(long)]
        quantity: u32,
        #[arg(long)]
        tab: MetricField,
        #[arg(long, allow_hyphen_values = true)]
        tz_offset: Option<i32>,
    },
    /// Merge two JSON arrays of period records
    Merge {
        primary: PathBuf,
        supplemental: PathBuf,
        /// Field identifying a period
        #[arg(long, default_value = "period")]
        key: String,
    },
    /// Print the axis label for a date
    Label {
        #[arg(long)]
        date: String,
        #[arg(long)]
        period: PeriodUnit,
    },
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    info!(
        week_start = ?config.calendar.week_start,
        merge_cache = config.merge_cache.enabled,
        "Loaded configuration"
    );

    match cli.command {
        Commands::Anchor {
            period,
            date,
            quantity,
            tz_offset,
        } => {
            let raw_date = parse_date(&date)?;
            let offset = tz_offset.unwrap_or(config.calendar.timezone_offset_minutes);
            let anchor = WindowResolver::new(config.calendar.week_start).anchor_at(
                chrono::Utc::now(),
                period,
                offset,
                raw_date,
                quantity,
            )?;
            println!("{}", anchor.format("%Y-%m-%d"));
        }
        Commands::Queries {
            period,
            date,
            quantity,
            tab,
            tz_offset,
        } => {
            let mut planner = QueryPlanner::from_config(&config);
            if let Some(offset) = tz_offset {
                planner = planner.with_timezone_offset(offset);
            }
            let queries = planner.plan(period, parse_date(&date)?, quantity, tab)?;
            println!("{}", serde_json::to_string_pretty(&queries)?);
        }
        Commands::Merge {
            primary,
            supplemental,
            key,
        } => {
            let primary = read_records(&primary)?;
            let supplemental = read_records(&supplemental)?;
            let merged = ResultMerger::from_config(&config)
                .with_key_field(key)
                .merge(&primary, &supplemental)?;
            println!("{}", serde_json::to_string_pretty(merged.as_ref())?);
        }
        Commands::Label { date, period } => {
            let date = parse_date(&date)?;
            println!("{}", format_period(date, period));
        }
    }

    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<PeriodRecord>> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a JSON array of period records", path.display()))
}
