pub mod dedup;
pub mod ledger;

use clap::Args;
use tracing::debug;

use ledger_insights_core::{AnalysisConfig, LedgerAnalysisInput};

use crate::input;

/// Where the ledger comes from and how to analyse it; shared by every
/// ledger subcommand.
#[derive(Args, Debug, Clone)]
pub struct LedgerArgs {
    /// Path to a JSON ledger (`{"fiscal_year", "entries", "config"}` or a bare
    /// array of entries). Read from stdin when omitted.
    #[arg(long)]
    pub input: Option<String>,

    /// Fiscal year to analyse (overrides the one in the input)
    #[arg(long)]
    pub fiscal_year: Option<i32>,

    /// Analysis configuration file (.toml, .yaml, .yml or .json)
    #[arg(long)]
    pub config: Option<String>,
}

/// Assemble the analysis input from the file/stdin payload and the flags.
pub fn load_analysis_input(
    args: &LedgerArgs,
) -> Result<LedgerAnalysisInput, Box<dyn std::error::Error>> {
    let mut analysis_input = input::ledger::read_ledger(args.input.as_deref())?
        .into_analysis_input(args.fiscal_year)?;

    if let Some(ref path) = args.config {
        analysis_input.config = Some(input::config::load_config(path)?);
    }
    debug!(
        fiscal_year = analysis_input.fiscal_year,
        entries = analysis_input.entries.len(),
        config_file = args.config.as_deref().unwrap_or("-"),
        "ledger loaded"
    );
    Ok(analysis_input)
}

/// The configuration in force for `analysis_input`.
pub fn effective_config(analysis_input: &LedgerAnalysisInput) -> AnalysisConfig {
    analysis_input.config.clone().unwrap_or_default()
}
