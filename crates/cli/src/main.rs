use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tideover_core::{
    bill::next_commission,
    projection::{self, ProjectionInputs},
    schedule, Bill, BillResolutionStatus, FinancialProjection, HolidayTable, Money, PayPeriod,
    Transaction,
};
use tideover_import::{
    ingest, matcher, write_table, CategoryRuleSet, ProcessorOptions, TransactionProcessor,
};

mod config;
use config::Config;

#[derive(Parser)]
#[command(name = "tideover", version, about = "Commission cash-flow tracker")]
struct Cli {
    /// Reference date (YYYY-MM-DD) instead of the wall clock.
    #[arg(long, global = true, value_name = "DATE")]
    as_of: Option<NaiveDate>,

    /// Emit JSON instead of tables.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse an export file and print the processed transactions.
    Ingest {
        file: PathBuf,
        /// Balance before the oldest transaction in the file.
        #[arg(long, default_value_t = 0.0)]
        balance: f64,
    },
    /// The full picture: bills, next payday, and safe-to-spend.
    Forecast {
        file: PathBuf,
        #[arg(long, default_value = "tideover.toml")]
        config: PathBuf,
    },
    /// Upcoming cutoffs and payment dates.
    Schedule {
        #[arg(long, default_value_t = 3)]
        months: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    // The only place the real clock is consulted; everything below takes an
    // explicit date.
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());

    match cli.command {
        Command::Ingest { file, balance } => run_ingest(&file, balance, today, cli.json),
        Command::Forecast { file, config } => run_forecast(&file, &config, today, cli.json),
        Command::Schedule { months } => run_schedule(today, months, cli.json),
    }
}

fn read_export(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading export {}", path.display()))
}

fn run_ingest(file: &Path, balance: f64, today: NaiveDate, json: bool) -> Result<()> {
    let text = read_export(file)?;
    let processor = TransactionProcessor::new();
    let options = ProcessorOptions {
        starting_balance: Money::from_dollars(balance),
        today,
        holidays: HolidayTable::us_federal(today.year() - 1..=today.year() + 2),
    };
    let (transactions, skipped) = ingest(&text, &processor, &options);
    if skipped > 0 {
        info!(skipped, "some rows could not be parsed");
    }
    if transactions.is_empty() {
        println!("0 transactions parsed");
        return Ok(());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
    } else {
        print!("{}", write_table(&transactions)?);
    }
    Ok(())
}

#[derive(Serialize)]
struct BillLine {
    vendor: String,
    amount: Money,
    due: NaiveDate,
    resolved: bool,
}

#[derive(Serialize)]
struct ForecastReport {
    as_of: NaiveDate,
    next_payment: PayPeriod,
    bills_due: Vec<BillLine>,
    projection: FinancialProjection,
    transactions: Vec<Transaction>,
}

fn run_forecast(file: &Path, config_path: &Path, today: NaiveDate, json: bool) -> Result<()> {
    let text = read_export(file)?;
    let config = Config::load(config_path)?;

    let holidays = config.holiday_table(today);
    let processor = TransactionProcessor::with_rules(CategoryRuleSet::with_custom(
        config.rules.clone(),
    ));
    let options = ProcessorOptions {
        starting_balance: Money::from_dollars(config.starting_balance),
        today,
        holidays: holidays.clone(),
    };
    let (transactions, skipped) = ingest(&text, &processor, &options);
    if skipped > 0 {
        info!(skipped, "some rows could not be parsed");
    }

    let bills = config.bills();
    let resolutions = matcher::resolve_bills(
        &bills,
        &transactions,
        today.year(),
        today.month(),
        processor.normalizer(),
    );
    let resolved: HashMap<&str, &BillResolutionStatus> =
        resolutions.iter().map(|r| (r.bill_id.as_str(), r)).collect();

    let next_payment = schedule::next_payment(today, &holidays);
    let in_window = projection::bills_due_in_window(&bills, today, next_payment.payment_date);

    let commissions = config.commissions();
    let commission = next_commission(&commissions, today);

    let projection = projection::project(&ProjectionInputs {
        current_balance: Money::from_dollars(config.current_balance),
        bills_in_window: in_window.clone(),
        resolutions: &resolutions,
        commission,
        today,
    });

    let bills_due = bill_lines(&in_window, &resolved, today);

    if json {
        let report = ForecastReport {
            as_of: today,
            next_payment,
            bills_due,
            projection,
            transactions,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Next payday  {} ({})",
        next_payment.payment_date, next_payment.label
    );
    if bills_due.is_empty() {
        println!("No bills due before payday");
    } else {
        println!("Bills due before payday:");
        for line in &bills_due {
            let mark = if line.resolved { "x" } else { " " };
            println!(
                "  [{mark}] {:<28} {:>10}  due {}",
                line.vendor,
                line.amount.to_string(),
                line.due
            );
        }
    }
    println!("Amount to keep    {:>12}", projection.amount_to_keep.to_string());
    println!("Liquidity         {:>12}", projection.liquidity_balance.to_string());
    println!("Safe to spend     {:>12}", projection.safe_to_spend.to_string());
    println!("Projected balance {:>12}", projection.projected_balance.to_string());
    println!("Coverage          {:>11}%", projection.coverage_percent);
    if projection.is_short {
        println!("SHORT by          {:>12}", projection.shortfall.to_string());
    }
    Ok(())
}

fn bill_lines(
    in_window: &[&Bill],
    resolved: &HashMap<&str, &BillResolutionStatus>,
    today: NaiveDate,
) -> Vec<BillLine> {
    in_window
        .iter()
        .map(|bill| {
            // Same-month due date unless the window already rolled over.
            let due = bill.due_date_in(today.year(), today.month());
            let due = if due < today {
                let (y, m) = if today.month() == 12 {
                    (today.year() + 1, 1)
                } else {
                    (today.year(), today.month() + 1)
                };
                bill.due_date_in(y, m)
            } else {
                due
            };
            BillLine {
                vendor: bill.vendor.clone(),
                amount: bill.amount,
                due,
                resolved: resolved.get(bill.id.as_str()).is_some_and(|r| r.resolved),
            }
        })
        .collect()
}

fn run_schedule(today: NaiveDate, months: u32, json: bool) -> Result<()> {
    let holidays = HolidayTable::us_federal(today.year() - 1..=today.year() + 2);
    let periods = schedule::upcoming_periods(today, months, &holidays);
    if json {
        println!("{}", serde_json::to_string_pretty(&periods)?);
        return Ok(());
    }
    for period in periods {
        let marker = if period.payment_date > today { "  " } else { "* " };
        println!(
            "{marker}cutoff {}  pays {}  {}",
            period.cutoff, period.payment_date, period.label
        );
    }
    println!("(* already paid)");
    Ok(())
}
