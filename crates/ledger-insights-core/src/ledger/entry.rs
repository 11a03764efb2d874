use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Money;
use crate::LedgerInsightsResult;

// ---------------------------------------------------------------------------
// Ledger entry
// ---------------------------------------------------------------------------

/// One normalized line of a general ledger.
///
/// Both `debit` and `credit` may be non-zero on the same line; the engine
/// only ever looks at their difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub account_number: String,
    #[serde(default)]
    pub debit: Money,
    #[serde(default)]
    pub credit: Money,
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub journal_code: String,
    #[serde(default)]
    pub entry_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub piece_reference: Option<String>,
    #[serde(default)]
    pub is_reconciled: bool,
}

impl LedgerEntry {
    pub fn new(
        account_number: impl Into<String>,
        entry_date: NaiveDate,
        debit: Money,
        credit: Money,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            debit,
            credit,
            entry_date,
            journal_code: String::new(),
            entry_label: String::new(),
            counterparty_label: None,
            piece_reference: None,
            is_reconciled: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.entry_label = label.into();
        self
    }

    pub fn reconciled(mut self, is_reconciled: bool) -> Self {
        self.is_reconciled = is_reconciled;
        self
    }

    /// Debit minus credit.
    pub fn net(&self) -> Money {
        self.debit - self.credit
    }

    pub fn is_in_fiscal_year(&self, fiscal_year: i32) -> bool {
        self.entry_date.year() == fiscal_year
    }
}

// ---------------------------------------------------------------------------
// Ledger source
// ---------------------------------------------------------------------------

/// Anything able to hand back the entries of one fiscal year.
///
/// Storage lives outside the engine; callers pass an implementation in
/// rather than the engine reaching for a global connection.
pub trait LedgerSource {
    fn entries_for_year(&self, fiscal_year: i32) -> LedgerInsightsResult<Vec<LedgerEntry>>;
}

/// A ledger held entirely in memory, possibly spanning several years.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    pub entries: Vec<LedgerEntry>,
}

impl InMemoryLedger {
    pub fn new(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }
}

impl LedgerSource for InMemoryLedger {
    fn entries_for_year(&self, fiscal_year: i32) -> LedgerInsightsResult<Vec<LedgerEntry>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.is_in_fiscal_year(fiscal_year))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_net_is_debit_minus_credit() {
        let entry = LedgerEntry::new("512000", date(2024, 3, 1), dec!(150), dec!(40));
        assert_eq!(entry.net(), dec!(110));
    }

    #[test]
    fn test_in_memory_source_filters_by_year() {
        let ledger = InMemoryLedger::new(vec![
            LedgerEntry::new("701000", date(2023, 12, 31), dec!(0), dec!(100)),
            LedgerEntry::new("701000", date(2024, 1, 1), dec!(0), dec!(200)),
            LedgerEntry::new("601000", date(2024, 6, 15), dec!(50), dec!(0)),
        ]);
        let entries = ledger.entries_for_year(2024).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.is_in_fiscal_year(2024)));
    }

    #[test]
    fn test_entry_deserializes_with_defaults() {
        let json = r#"{"account_number":"411CLIENT","debit":"2500","entry_date":"2024-02-10"}"#;
        let entry: LedgerEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.debit, dec!(2500));
        assert_eq!(entry.credit, Decimal::ZERO);
        assert!(entry.counterparty_label.is_none());
        assert!(!entry.is_reconciled);
    }
}
