use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::classifier::classify;
use crate::ledger::entry::LedgerEntry;
use crate::statements::sig::SigCascade;
use crate::types::Money;

const BANK_ROOT: &str = "512";

/// Signals about the ledger itself rather than the business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataQualityReport {
    /// Entries received
    pub entry_count: usize,
    /// Entries left after recap-line removal
    pub analysed_entry_count: usize,
    pub total_debit: Money,
    pub total_credit: Money,
    /// total_debit - total_credit of the analysed entries
    pub balance_gap: Money,
    pub is_balanced: bool,
    pub entries_outside_fiscal_year: usize,
    pub unreconciled_bank_entries: usize,
    pub unclassified_entries: usize,
    /// Part of the classes 6/7 result the SIG formulas do not reach
    pub income_statement_gap: Money,
}

pub fn assess_quality(
    entries: &[LedgerEntry],
    agg: &LedgerAggregates,
    sig: &SigCascade,
    fiscal_year: i32,
    config: &AnalysisConfig,
) -> DataQualityReport {
    let entries_outside_fiscal_year = entries
        .iter()
        .filter(|e| !e.is_in_fiscal_year(fiscal_year))
        .count();
    let unreconciled_bank_entries = entries
        .iter()
        .filter(|e| !e.is_reconciled)
        .filter(|e| {
            classify(&e.account_number)
                .roots()
                .is_some_and(|r| r.has_root(BANK_ROOT))
        })
        .count();

    let balance_gap = agg.totals.balance;
    let ledger_result = -(agg.balance("6") + agg.balance("7"));

    DataQualityReport {
        entry_count: entries.len(),
        analysed_entry_count: agg.totals.entry_count,
        total_debit: agg.totals.debit,
        total_credit: agg.totals.credit,
        balance_gap,
        is_balanced: balance_gap.abs() <= config.epsilon_for_reconciliation_checks,
        entries_outside_fiscal_year,
        unreconciled_bank_entries,
        unclassified_entries: agg.unclassified.entry_count,
        income_statement_gap: ledger_result - sig.net_result.value,
    }
}
