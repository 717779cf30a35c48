//! tamsui CLI binary.
//!
//! Quarter lookups, factor expansion and ranking on CSV files, and
//! single- or multi-factor tear sheets over a data directory.

use std::{
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use polars::prelude::*;
use tamsui::{
    analysis::TearSheet,
    calendar::{FiscalQuarter, TradingCalendar, date_str_to_quarter},
    config::{Overrides, Settings},
    logging,
    pipeline::{run_multi, run_single, write_report},
    primitives::{FactorDirection, Symbol, columns},
    rank::rank_factor,
    sources::{scan_csv, scan_long_csv, write_csv},
    utils::expand_to_long,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "tamsui")]
#[command(about = "Cross-sectional factor ranking for Taiwan equities", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Directory holding prices.csv and factors/<name>.csv
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the disclosure window of a quarter label, or the quarter of a date
    Quarter {
        /// `YYYY-Qn` label or `YYYY-MM-DD` date
        input: String,
    },

    /// Expand a quarterly factor table to daily long records
    Expand {
        /// Wide quarterly factor CSV (`date` plus one column per symbol)
        #[arg(long)]
        factor: PathBuf,

        /// Price CSV whose dates define the trading days
        #[arg(long)]
        prices: PathBuf,

        /// Restrict to these symbols
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Output CSV
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Rank a long factor table per date
    Rank {
        /// Long factor CSV (`date, symbol, value`)
        #[arg(long)]
        factor: PathBuf,

        /// Rank largest values first
        #[arg(long)]
        negative: bool,

        /// Output CSV
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Single-factor tear sheet
    Single {
        /// YAML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Write the tear sheet as JSON
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Weighted-rank tear sheets for every factor combination
    Multi {
        /// YAML settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        overrides: Overrides,

        /// Directory for per-combination JSON reports and rank CSVs
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    match cli.command {
        Commands::Quarter { input } => show_quarter(&input)?,
        Commands::Expand { factor, prices, symbols, out } => {
            expand(&factor, &prices, &symbols, &out)?;
        }
        Commands::Rank { factor, negative, out } => rank(&factor, negative, &out)?,
        Commands::Single { config, overrides, out } => {
            let params = load_settings(config.as_deref())?.resolve_single(&overrides)?;
            let sheet = run_single(&cli.data_dir, &params)?;
            print_sheet(params.factor.as_str(), &sheet);
            if let Some(out) = out {
                write_report(&sheet, &out)?;
            }
        }
        Commands::Multi { config, overrides, out } => {
            let params = load_settings(config.as_deref())?.resolve_multi(&overrides)?;
            let reports = run_multi(&cli.data_dir, &params)?;
            if let Some(dir) = &out {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
            for mut report in reports {
                let label = report.label();
                print_sheet(&label, &report.sheet);
                if let Some(dir) = &out {
                    write_report(&report.sheet, &dir.join(format!("{label}.json")))?;
                    write_csv(&mut report.ranks, &dir.join(format!("{label}_ranks.csv")))?;
                }
            }
        }
    }

    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::from_path(path)
            .with_context(|| format!("reading settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn show_quarter(input: &str) -> Result<()> {
    if let Ok(quarter) = input.parse::<FiscalQuarter>() {
        let window = quarter.window();
        println!("{quarter}: {} .. {} ({} days)", window.start, window.end, window.len_days());
        return Ok(());
    }

    let quarter = date_str_to_quarter(input)
        .with_context(|| format!("{input} is neither a quarter label nor a date"))?;
    let window = quarter.window();
    println!("{input} -> {quarter} ({} .. {})", window.start, window.end);
    Ok(())
}

fn expand(factor: &Path, prices: &Path, symbols: &[String], out: &Path) -> Result<()> {
    let table =
        scan_csv(factor)?.with_column(col(columns::DATE).cast(DataType::Date)).collect()?;
    let price_dates =
        scan_csv(prices)?.select([col(columns::DATE).cast(DataType::Date)]).collect()?;
    let calendar = TradingCalendar::from_frame(&price_dates, columns::DATE)?;
    let symbols: Vec<Symbol> = symbols.iter().map(|s| Symbol::from(s.as_str())).collect();

    let mut long = expand_to_long(&table, &calendar, columns::DATE, &symbols)?;
    write_csv(&mut long, out)?;
    info!(rows = long.height(), out = %out.display(), "wrote daily factor");
    Ok(())
}

fn rank(factor: &Path, negative: bool, out: &Path) -> Result<()> {
    let records = scan_long_csv(factor)?.with_column(col(columns::DATE).cast(DataType::Date));
    let direction = FactorDirection::from_positive_corr(!negative);

    let mut ranked = rank_factor(records, direction.ascending())?;
    write_csv(&mut ranked, out)?;
    info!(rows = ranked.height(), %direction, out = %out.display(), "wrote ranks");
    Ok(())
}

fn print_sheet(label: &str, sheet: &TearSheet) {
    println!(
        "\n=== {label} ({} observations, {} quantiles) ===",
        sheet.observations, sheet.quantiles
    );
    for period in &sheet.periods {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |x| format!("{x:.4}"));
        let means: Vec<String> = period.mean_return_by_quantile.iter().map(|&m| fmt(m)).collect();
        println!(
            "  {:>3}D  mean by quantile [{}]  spread {}  IC {} (std {}, IR {}, {} dates)",
            period.period,
            means.join(", "),
            fmt(period.spread),
            fmt(period.ic_mean),
            fmt(period.ic_std),
            fmt(period.ic_ir),
            period.ic_dates,
        );
    }
}
