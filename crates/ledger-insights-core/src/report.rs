use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::alerts::{evaluate_alerts, health_score, Alert, Grade, RuleContext};
use crate::analysis::quality::{assess_quality, DataQualityReport};
use crate::analysis::ratios::{calculate_ratios, RatioSet};
use crate::config::AnalysisConfig;
use crate::error::LedgerInsightsError;
use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::dedup::{DuplicateFilter, DuplicateSummary};
use crate::ledger::entry::{LedgerEntry, LedgerSource};
use crate::statements::balance_sheet::{
    build_balance_sheet, BalanceSheetSnapshot, BalanceSheetTotals,
};
use crate::statements::charges::{charge_structure, ChargeLine};
use crate::statements::monthly::{monthly_activity, MonthlyActivity};
use crate::statements::sig::{calculate_sig, SigCascade};
use crate::types::{with_metadata, ComputationOutput};
use crate::LedgerInsightsResult;

pub const MIN_FISCAL_YEAR: i32 = 1900;
pub const MAX_FISCAL_YEAR: i32 = 2100;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAnalysisInput {
    pub fiscal_year: i32,
    pub entries: Vec<LedgerEntry>,
    /// Engine tunables; defaults apply when absent
    #[serde(default)]
    pub config: Option<AnalysisConfig>,
}

/// Every indicator derived from one fiscal year of a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub fiscal_year: i32,
    pub sig_cascade: SigCascade,
    pub balance_sheet: BalanceSheetSnapshot,
    pub balance_sheet_totals: BalanceSheetTotals,
    pub ratios: RatioSet,
    pub alerts: Vec<Alert>,
    pub health_score: i32,
    pub grade: Grade,
    pub duplicates: DuplicateSummary,
    pub data_quality: DataQualityReport,
    pub monthly_activity: Vec<MonthlyActivity>,
    pub charge_structure: Vec<ChargeLine>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub fn validate_fiscal_year(fiscal_year: i32) -> LedgerInsightsResult<()> {
    if !(MIN_FISCAL_YEAR..=MAX_FISCAL_YEAR).contains(&fiscal_year) {
        return Err(LedgerInsightsError::InvalidFiscalYear {
            year: fiscal_year,
            min: MIN_FISCAL_YEAR,
            max: MAX_FISCAL_YEAR,
        });
    }
    Ok(())
}

/// Derive the full report for `fiscal_year` from `entries`.
///
/// Deterministic and independent of entry order. Only an out-of-range year
/// or an unusable `config` is an error; sparse or inconsistent ledgers
/// surface as alerts.
pub fn compute_financials(
    fiscal_year: i32,
    entries: &[LedgerEntry],
    config: &AnalysisConfig,
) -> LedgerInsightsResult<FinancialReport> {
    validate_fiscal_year(fiscal_year)?;
    config.validate()?;
    let filter = DuplicateFilter::from_config(config)?;

    let filtered = filter.filter(entries);
    let duplicates = filtered.summary();
    debug!(
        entries = entries.len(),
        kept = filtered.kept.len(),
        removed = duplicates.removed_count,
        "recap lines filtered"
    );

    let agg = LedgerAggregates::aggregate(filtered.kept.iter().copied());
    let sig_cascade = calculate_sig(&agg, config);
    let balance_sheet = build_balance_sheet(&agg);
    let ratios = calculate_ratios(&agg, &sig_cascade, &balance_sheet, config);
    let data_quality = assess_quality(entries, &agg, &sig_cascade, fiscal_year, config);

    let alerts = evaluate_alerts(&RuleContext {
        sig: &sig_cascade,
        sheet: &balance_sheet,
        ratios: &ratios,
        quality: &data_quality,
        config,
    });
    let health_score = health_score(&alerts);
    let grade = Grade::from_score(health_score);
    info!(
        fiscal_year,
        health_score,
        grade = %grade,
        alerts = alerts.len(),
        "financial report computed"
    );

    Ok(FinancialReport {
        fiscal_year,
        balance_sheet_totals: balance_sheet.totals(),
        monthly_activity: monthly_activity(filtered.kept.iter().copied(), fiscal_year),
        charge_structure: charge_structure(&agg),
        sig_cascade,
        balance_sheet,
        ratios,
        alerts,
        health_score,
        grade,
        duplicates,
        data_quality,
    })
}

/// Fetch the year from `source`, then compute.
pub fn compute_financials_from<S: LedgerSource + ?Sized>(
    source: &S,
    fiscal_year: i32,
    config: &AnalysisConfig,
) -> LedgerInsightsResult<FinancialReport> {
    validate_fiscal_year(fiscal_year)?;
    let entries = source.entries_for_year(fiscal_year)?;
    compute_financials(fiscal_year, &entries, config)
}

/// `compute_financials` wrapped in the standard output envelope.
pub fn analyze_ledger(
    input: &LedgerAnalysisInput,
) -> LedgerInsightsResult<ComputationOutput<FinancialReport>> {
    let start = Instant::now();
    let config = input.config.clone().unwrap_or_default();
    let report = compute_financials(input.fiscal_year, &input.entries, &config)?;

    let mut warnings: Vec<String> = Vec::new();
    if input.entries.is_empty() {
        warnings.push(format!(
            "No entries supplied for fiscal year {}; all indicators are zero.",
            input.fiscal_year
        ));
    }
    if report.duplicates.removed_count > 0 {
        warnings.push(format!(
            "{} bank recap lines removed before aggregation (net {}).",
            report.duplicates.removed_count, report.duplicates.removed_net
        ));
    }
    if !report.data_quality.income_statement_gap.is_zero() {
        warnings.push(format!(
            "{} of the income statement is not reached by the SIG formulas.",
            report.data_quality.income_statement_gap
        ));
    }

    let assumptions = serde_json::json!({
        "fiscal_year": input.fiscal_year,
        "fiscal_year_basis": "calendar year",
        "bank_fee_reclassification": config.reclassifies_bank_fees(),
        "bank_fee_roots_to_reclassify": config.bank_fee_roots_to_reclassify,
        "bank_fee_duplicate_roots": config.bank_fee_duplicate_roots,
        "liquidity_sentinel_value": config.liquidity_sentinel_value,
        "epsilon_for_reconciliation_checks": config.epsilon_for_reconciliation_checks,
        "variable_cost_roots": config.variable_cost_roots,
        "fixed_cost_roots": config.fixed_cost_roots,
    });

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "French chart of accounts: SIG cascade, balance sheet, ratios and rule-based alerts",
        &assumptions,
        warnings,
        elapsed,
        report,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::InMemoryLedger;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(account: &str, debit: Decimal, credit: Decimal) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        LedgerEntry::new(account, date, debit, credit)
    }

    #[test]
    fn test_year_bounds() {
        assert!(validate_fiscal_year(1900).is_ok());
        assert!(validate_fiscal_year(2100).is_ok());
        match validate_fiscal_year(1899) {
            Err(LedgerInsightsError::InvalidFiscalYear { year, min, max }) => {
                assert_eq!((year, min, max), (1899, 1900, 2100));
            }
            other => panic!("expected InvalidFiscalYear, got {other:?}"),
        }
        assert!(validate_fiscal_year(2101).is_err());
    }

    #[test]
    fn test_invalid_config_rejected_before_computation() {
        let mut config = AnalysisConfig::default();
        config.liquidity_sentinel_value = Decimal::ZERO;
        assert!(compute_financials(2024, &[], &config).is_err());
    }

    #[test]
    fn test_simple_sale_report() {
        let entries = vec![
            entry("411000", dec!(1_200), dec!(0)),
            entry("706000", dec!(0), dec!(1_000)),
            entry("445710", dec!(0), dec!(200)),
        ];
        let report = compute_financials(2024, &entries, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.sig_cascade.revenue.value, dec!(1_000));
        assert_eq!(report.sig_cascade.net_result.value, dec!(1_000));
        assert_eq!(report.monthly_activity[5].revenue, dec!(1_000));
        assert_eq!(report.balance_sheet.receivables, dec!(1_200));
    }

    #[test]
    fn test_source_is_queried_for_the_year() {
        let mut other_year = entry("706000", dec!(0), dec!(500));
        other_year.entry_date = NaiveDate::from_ymd_opt(2023, 6, 30).unwrap();
        let ledger = InMemoryLedger::new(vec![entry("706000", dec!(0), dec!(1_000)), other_year]);
        let report =
            compute_financials_from(&ledger, 2024, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.sig_cascade.revenue.value, dec!(1_000));
        assert_eq!(report.data_quality.entries_outside_fiscal_year, 0);
    }

    #[test]
    fn test_envelope_warnings() {
        let input = LedgerAnalysisInput {
            fiscal_year: 2024,
            entries: Vec::new(),
            config: None,
        };
        let output = analyze_ledger(&input).unwrap();
        assert_eq!(output.result.health_score, 100);
        assert_eq!(output.warnings.len(), 1);
        assert_eq!(output.assumptions["fiscal_year"], 2024);
    }
}
