use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;

use ledger_insights_core::config::AnalysisConfig;
use ledger_insights_core::ledger::dedup::DuplicateFilter;
use ledger_insights_core::report::{self, LedgerAnalysisInput};
use ledger_insights_core::LedgerEntry;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_config(config_json: Option<String>) -> NapiResult<AnalysisConfig> {
    match config_json {
        Some(json) => serde_json::from_str(&json).map_err(to_napi_error),
        None => Ok(AnalysisConfig::default()),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// `{fiscal_year, entries, config?}` in, the full report envelope out.
#[napi]
pub fn analyze_ledger(input_json: String) -> NapiResult<String> {
    let input: LedgerAnalysisInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = report::analyze_ledger(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Bare report for a year, without the envelope.
#[napi]
pub fn compute_financials(
    fiscal_year: i32,
    entries_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let entries: Vec<LedgerEntry> = serde_json::from_str(&entries_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    let report =
        report::compute_financials(fiscal_year, &entries, &config).map_err(to_napi_error)?;
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Duplicates and configuration
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct RemovedLine<'a> {
    marker: &'a str,
    account_number: &'a str,
    entry_label: &'a str,
    debit: Decimal,
    credit: Decimal,
}

/// Recap lines the filter removes from `entries_json`.
#[napi]
pub fn filter_duplicates(entries_json: String, config_json: Option<String>) -> NapiResult<String> {
    let entries: Vec<LedgerEntry> = serde_json::from_str(&entries_json).map_err(to_napi_error)?;
    let config = parse_config(config_json)?;
    config.validate().map_err(to_napi_error)?;
    let filter = DuplicateFilter::from_config(&config).map_err(to_napi_error)?;

    let filtered = filter.filter(&entries);
    let removed: Vec<RemovedLine> = filtered
        .removed
        .iter()
        .map(|r| RemovedLine {
            marker: &r.marker,
            account_number: &r.entry.account_number,
            entry_label: &r.entry.entry_label,
            debit: r.entry.debit,
            credit: r.entry.credit,
        })
        .collect();
    let output = serde_json::json!({
        "summary": filtered.summary(),
        "removed": removed,
    });
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// The default configuration, as a starting point for callers.
#[napi]
pub fn default_config() -> NapiResult<String> {
    serde_json::to_string(&AnalysisConfig::default()).map_err(to_napi_error)
}
