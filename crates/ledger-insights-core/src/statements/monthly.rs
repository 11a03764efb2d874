use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::ledger::classifier::{classify, AccountBucket};
use crate::ledger::entry::LedgerEntry;
use crate::types::Money;

/// Activity of one calendar month of the fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyActivity {
    /// 1 = January
    pub month: u32,
    /// Sales (70), sign-resolved
    pub revenue: Money,
    /// Class 6 balance
    pub charges: Money,
    /// Classes 7 minus 6
    pub result: Money,
}

/// Twelve rows, January to December. Entries dated outside `fiscal_year`
/// are skipped.
pub fn monthly_activity<'a, I>(entries: I, fiscal_year: i32) -> Vec<MonthlyActivity>
where
    I: IntoIterator<Item = &'a LedgerEntry>,
{
    let mut months: Vec<MonthlyActivity> = (1..=12)
        .map(|month| MonthlyActivity {
            month,
            ..Default::default()
        })
        .collect();

    for entry in entries {
        if !entry.is_in_fiscal_year(fiscal_year) {
            continue;
        }
        let class = classify(&entry.account_number);
        let Some(roots) = class.roots() else {
            continue;
        };
        let row = &mut months[entry.entry_date.month0() as usize];
        let net = entry.net();
        match roots.root1.as_str() {
            "6" => {
                row.charges += net;
                row.result -= net;
            }
            "7" => {
                row.result -= net;
                if roots.has_any_root(AccountBucket::SalesRevenue.roots()) {
                    row.revenue -= net;
                }
            }
            _ => {}
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn entry(account: &str, month: u32, debit: Decimal, credit: Decimal) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, month, 15).unwrap();
        LedgerEntry::new(account, date, debit, credit)
    }

    #[test]
    fn test_twelve_rows_even_when_empty() {
        let entries: Vec<LedgerEntry> = Vec::new();
        let months = monthly_activity(&entries, 2024);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].month, 1);
        assert_eq!(months[11].month, 12);
        assert!(months.iter().all(|m| m.result.is_zero()));
    }

    #[test]
    fn test_entries_land_in_their_month() {
        let entries = vec![
            entry("706000", 1, dec!(0), dec!(1_000)),
            entry("758000", 1, dec!(0), dec!(50)),
            entry("606000", 1, dec!(200), dec!(0)),
            entry("706000", 3, dec!(0), dec!(400)),
            entry("512000", 3, dec!(400), dec!(0)),
        ];
        let months = monthly_activity(&entries, 2024);
        assert_eq!(months[0].revenue, dec!(1_000));
        assert_eq!(months[0].charges, dec!(200));
        assert_eq!(months[0].result, dec!(850));
        assert_eq!(months[1].result, Decimal::ZERO);
        assert_eq!(months[2].revenue, dec!(400));
        let year: Decimal = months.iter().map(|m| m.result).sum();
        assert_eq!(year, dec!(1_250));
    }

    #[test]
    fn test_other_years_skipped() {
        let entries = vec![LedgerEntry::new(
            "706000",
            NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            dec!(0),
            dec!(999),
        )];
        let months = monthly_activity(&entries, 2024);
        assert!(months.iter().all(|m| m.revenue.is_zero() && m.result.is_zero()));
    }
}
