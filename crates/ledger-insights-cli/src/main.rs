mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::LedgerArgs;
use output::OutputFormat;

/// Financial indicators from a double-entry ledger
#[derive(Parser)]
#[command(
    name = "ledgerx",
    version,
    about = "Financial indicators from a double-entry ledger",
    long_about = "Derives the SIG cascade, a balance-sheet snapshot, liquidity and \
                  operating-cycle ratios, a break-even point and a rule-based health \
                  score from one fiscal year of ledger entries, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log pipeline stages to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Full financial report (cascade, balance sheet, ratios, alerts, data quality)
    Report(LedgerArgs),
    /// Intermediate management balances, revenue down to self-financing capacity
    Sig(LedgerArgs),
    /// Balance-sheet snapshot and totals
    BalanceSheet(LedgerArgs),
    /// Working capital, liquidity, solvency, operating cycle and break-even
    Ratios(LedgerArgs),
    /// Triggered alerts with the health score and grade
    Alerts(LedgerArgs),
    /// Bank recap lines removed before aggregation
    Dedup(LedgerArgs),
    /// Print version information
    Version,
}

/// Stderr logging; RUST_LOG wins over -v.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Report(args) => commands::ledger::run_report(args),
        Commands::Sig(args) => commands::ledger::run_sig(args),
        Commands::BalanceSheet(args) => commands::ledger::run_balance_sheet(args),
        Commands::Ratios(args) => commands::ledger::run_ratios(args),
        Commands::Alerts(args) => commands::ledger::run_alerts(args),
        Commands::Dedup(args) => commands::dedup::run_dedup(args),
        Commands::Version => {
            println!("ledgerx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            cli.output.render(&value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
