//! Simplified balance sheet.
//!
//! This is the single place where balance-sheet signs are resolved: asset
//! roots are debit-normal and read as is, liability and equity roots are
//! credit-normal and negated. Every field of the snapshot is non-negative;
//! a balance on the "wrong" side of a third-party account is moved to the
//! opposite column instead of being clamped away.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::classifier::AccountBucket;
use crate::types::Money;

const THIRD_PARTY_PREFIXES: [&str; 1] = ["4"];
const CASH_PREFIXES: [&str; 4] = ["51", "52", "53", "54"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetSnapshot {
    /// Gross fixed assets net of depreciation (20..27 + 28, 29)
    pub fixed_assets: Money,
    /// Stock net of depreciation (31..37 + 39)
    pub stock_net: Money,
    /// Customer receivables (411)
    pub receivables: Money,
    /// Debit balances of the other third-party accounts (40..49)
    pub other_receivables: Money,
    pub cash_positive: Money,
    /// Capital, reserves, provisions and the unallocated result of the year
    pub equity: Money,
    /// Borrowings (16, 17)
    pub financial_debt: Money,
    /// Supplier payables (401)
    pub supplier_payables: Money,
    /// Credit balances of the other third-party accounts (40..49)
    pub other_payables: Money,
    pub cash_overdraft: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceSheetTotals {
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub total_assets: Money,
    pub total_debt: Money,
    /// Equity + financial debt - fixed assets
    pub funds_available: Money,
}

impl BalanceSheetSnapshot {
    pub fn current_assets(&self) -> Money {
        self.stock_net + self.receivables + self.other_receivables + self.cash_positive
    }

    pub fn current_liabilities(&self) -> Money {
        self.supplier_payables + self.other_payables + self.cash_overdraft
    }

    pub fn total_assets(&self) -> Money {
        self.fixed_assets + self.current_assets()
    }

    pub fn total_debt(&self) -> Money {
        self.financial_debt + self.current_liabilities()
    }

    pub fn funds_available(&self) -> Money {
        self.equity + self.financial_debt - self.fixed_assets
    }

    pub fn totals(&self) -> BalanceSheetTotals {
        BalanceSheetTotals {
            current_assets: self.current_assets(),
            current_liabilities: self.current_liabilities(),
            total_assets: self.total_assets(),
            total_debt: self.total_debt(),
            funds_available: self.funds_available(),
        }
    }

    /// Every field, for invariant checks.
    pub fn fields(&self) -> [(&'static str, Money); 10] {
        [
            ("fixed_assets", self.fixed_assets),
            ("stock_net", self.stock_net),
            ("receivables", self.receivables),
            ("other_receivables", self.other_receivables),
            ("cash_positive", self.cash_positive),
            ("equity", self.equity),
            ("financial_debt", self.financial_debt),
            ("supplier_payables", self.supplier_payables),
            ("other_payables", self.other_payables),
            ("cash_overdraft", self.cash_overdraft),
        ]
    }
}

fn positive(value: Money) -> Money {
    value.max(Decimal::ZERO)
}

/// Split a debit-minus-credit balance into (debit side, credit side).
fn split(balance: Money) -> (Money, Money) {
    (positive(balance), positive(-balance))
}

pub fn build_balance_sheet(agg: &LedgerAggregates) -> BalanceSheetSnapshot {
    let fixed_assets = positive(
        agg.bucket(AccountBucket::FixedAssetsGross)
            + agg.bucket(AccountBucket::FixedAssetDepreciation),
    );
    let stock_net = positive(
        agg.bucket(AccountBucket::StockGross) + agg.bucket(AccountBucket::StockDepreciation),
    );

    // Result of the year not yet closed into class 12 (zero once it is).
    let unallocated_result = -(agg.balance("6") + agg.balance("7"));
    let equity = positive(-agg.bucket(AccountBucket::Equity) + unallocated_result);
    let financial_debt = positive(-agg.bucket(AccountBucket::FinancialDebt));

    let (receivables, customer_advances) = split(agg.bucket(AccountBucket::TradeReceivables));
    let (supplier_advances, supplier_payables) =
        split(agg.bucket(AccountBucket::SupplierPayables));

    let mut other_receivables = supplier_advances;
    let mut other_payables = customer_advances;
    for aggregate in agg.roots3_under(&THIRD_PARTY_PREFIXES) {
        if AccountBucket::SupplierPayables.roots().contains(&aggregate.root.as_str())
            || AccountBucket::TradeReceivables.roots().contains(&aggregate.root.as_str())
        {
            continue;
        }
        let (debit_side, credit_side) = split(aggregate.balance);
        other_receivables += debit_side;
        other_payables += credit_side;
    }

    // Cash is split by sign per three-digit account (512, 514, 519...) rather
    // than on the 51..54 total, so an overdrawn 519 facility shows as an
    // overdraft next to a positive 512. Net cash is identical either way.
    let mut cash_positive = Decimal::ZERO;
    let mut cash_overdraft = Decimal::ZERO;
    for aggregate in agg.roots3_under(&CASH_PREFIXES) {
        let (debit_side, credit_side) = split(aggregate.balance);
        cash_positive += debit_side;
        cash_overdraft += credit_side;
    }

    let snapshot = BalanceSheetSnapshot {
        fixed_assets,
        stock_net,
        receivables,
        other_receivables,
        cash_positive,
        equity,
        financial_debt,
        supplier_payables,
        other_payables,
        cash_overdraft,
    };
    debug!(
        total_assets = %snapshot.total_assets(),
        equity = %snapshot.equity,
        cash_positive = %snapshot.cash_positive,
        cash_overdraft = %snapshot.cash_overdraft,
        "balance sheet built"
    );
    snapshot
}
