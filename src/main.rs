//! Finplan CLI
//!
//! Command-line interface for projecting a net-worth portfolio

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use finplan::cashflow::{annual_to_monthly_rate, load_cash_flows, load_cash_flows_json};
use finplan::dates::parse_date;
use finplan::projection::DEFAULT_PERCENTILES;
use finplan::{AggregateTable, CashFlow, NetWorth, TotalSummary};

#[derive(Parser, Debug)]
#[command(name = "finplan", version, about = "Project net worth month by month")]
struct Args {
    /// Cash flow definitions (.csv or .json); defaults to a built-in demo portfolio
    #[arg(long)]
    cash_flows: Option<PathBuf>,

    /// Name of the portfolio
    #[arg(long, default_value = "wealth")]
    name: String,

    /// Exclusive horizon date (YYYY-MM-DD); defaults to 2050-01-01
    #[arg(long, value_parser = parse_horizon)]
    horizon: Option<NaiveDate>,

    /// Number of Monte Carlo paths
    #[arg(long, default_value_t = 1)]
    paths: u32,

    /// Force stochastic sampling on or off; by default only multi-path runs sample
    #[arg(long)]
    stochastic: Option<bool>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output file (.csv, or .json for JSON)
    #[arg(long, default_value = "networth_output.csv")]
    output: PathBuf,

    /// Print per-date statistics of the total for the final month
    #[arg(long)]
    summary: bool,

    /// Increase diagnostic output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_horizon(text: &str) -> Result<NaiveDate, String> {
    parse_date(text).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let today = Local::now().date_naive();
    let cash_flows = match &args.cash_flows {
        Some(path) => load_portfolio(path)?,
        None => demo_portfolio(today)?,
    };

    let mut net_worth = NetWorth::new(&args.name, today);
    net_worth
        .register_all(cash_flows)
        .context("failed to register cash flows")?;

    let horizon = args.horizon.unwrap_or_else(|| net_worth.default_horizon());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let table = net_worth
        .aggregate(horizon, args.paths, args.stochastic, args.verbose, &mut rng)
        .with_context(|| format!("failed to aggregate '{}' to {}", args.name, horizon))?;

    write_table(&table, &args.output)?;
    println!(
        "{} rows ({} cash flows, {} paths) written to {}",
        table.len(),
        table.columns().len(),
        table.path_count(),
        args.output.display()
    );

    if args.summary {
        let summary = TotalSummary::from_table(&table, &DEFAULT_PERCENTILES);
        match summary.final_row() {
            Some(last) => {
                println!("\nTotal at {} across {} paths:", last.date, last.paths);
                println!("  Mean:    {:>16.2}", last.mean);
                println!("  Std dev: {:>16.2}", last.std_dev);
                println!("  Min:     {:>16.2}", last.min);
                println!("  Max:     {:>16.2}", last.max);
                for (p, value) in &last.percentiles {
                    println!("  P{:<6} {:>16.2}", (p * 100.0).round(), value);
                }
            }
            None => println!("\nNo rows to summarize"),
        }
    }

    Ok(())
}

fn load_portfolio(path: &Path) -> Result<Vec<CashFlow>> {
    let is_json = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    let flows = if is_json {
        load_cash_flows_json(path)
    } else {
        load_cash_flows(path)
    };
    flows.with_context(|| format!("failed to load cash flows from {}", path.display()))
}

fn write_table(table: &AggregateTable, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("unable to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    let is_json = path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::to_writer_pretty(writer, table).context("failed to write JSON output")?;
    } else {
        table.write_csv(writer).context("failed to write CSV output")?;
    }
    Ok(())
}

/// Household portfolio used when no cash flow file is given
fn demo_portfolio(today: NaiveDate) -> Result<Vec<CashFlow>> {
    let date = |y, m| NaiveDate::from_ymd_opt(y, m, 1).context("invalid demo date");

    Ok(vec![
        CashFlow::builder("equity", today)
            .start_value(1_000_000.0)
            .growth_rate(annual_to_monthly_rate(0.05))
            .volatility(0.04)
            .build()?,
        CashFlow::builder("bonds", today)
            .start_value(1_000_000.0)
            .growth_rate(annual_to_monthly_rate(0.01))
            .volatility(0.005)
            .build()?,
        CashFlow::builder("income", today)
            .monthly_value(50_000.0)
            .growth_rate(annual_to_monthly_rate(0.01))
            .build()?,
        CashFlow::builder("expenses", today)
            .monthly_value(-40_000.0)
            .growth_rate(annual_to_monthly_rate(0.01))
            .build()?,
        CashFlow::builder("college", date(2027, 9)?)
            .end_date(date(2031, 6)?)
            .monthly_value(-5_000.0)
            .build()?,
    ])
}
