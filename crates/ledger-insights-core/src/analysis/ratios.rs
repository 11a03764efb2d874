//! Working capital, operating cycle, structure ratios and break-even.
//!
//! Every function here is total: a zero denominator yields zero for
//! day counts and break-even, and the configured sentinel for coverage-type
//! ratios, where the degenerate case means "unbounded".

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AnalysisConfig;
use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::classifier::AccountBucket;
use crate::statements::balance_sheet::BalanceSheetSnapshot;
use crate::statements::sig::SigCascade;
use crate::types::{Days, Money, Multiple, Rate};

/// Days in the fiscal year used by DSO, DPO and stock days.
pub const DAYS_IN_YEAR: Decimal = dec!(365);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    /// Stock + receivables + other receivables - payables - other payables
    pub working_capital_need: Money,
    /// Cash minus overdraft
    pub net_cash_position: Money,
    /// Net cash position rebuilt as funds available - working capital need
    pub net_cash_from_structure: Money,
    /// net_cash_position - net_cash_from_structure
    pub cash_reconciliation_gap: Money,
    pub cash_reconciled: bool,
    pub dso: Days,
    pub dpo: Days,
    pub stock_days: Days,
    pub conversion_cycle_days: Days,
    pub liquidity_ratio: Multiple,
    pub immediate_liquidity_ratio: Multiple,
    pub solvency_ratio: Multiple,
    pub autonomy_ratio_pct: Decimal,
    /// Financial debt / equity
    pub debt_ratio: Multiple,
    pub break_even_point: Money,
    /// (revenue - variable costs) / revenue, as a fraction
    pub margin_on_variable_costs_rate: Rate,
    pub purchases: Money,
    pub variable_costs: Money,
    pub fixed_costs: Money,
}

// ---------------------------------------------------------------------------
// Total helpers
// ---------------------------------------------------------------------------

/// `numerator / denominator`, or `fallback` when the denominator is zero or
/// the quotient does not fit in a `Decimal`.
pub fn ratio_or(numerator: Decimal, denominator: Decimal, fallback: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(fallback)
}

/// `amount / flow * 365` when both are strictly positive, zero otherwise
/// (including on overflow). Multiplies first so exact day counts stay exact.
pub fn days_or_zero(amount: Money, flow: Money) -> Days {
    if amount > Decimal::ZERO && flow > Decimal::ZERO {
        amount
            .checked_mul(DAYS_IN_YEAR)
            .and_then(|scaled| scaled.checked_div(flow))
            .or_else(|| amount.checked_div(flow)?.checked_mul(DAYS_IN_YEAR))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

/// Sentinel-guarded coverage ratio: the sentinel when nothing is owed or the
/// ratio is too large to represent.
fn coverage(numerator: Money, denominator: Money, sentinel: Decimal) -> Multiple {
    if denominator > Decimal::ZERO {
        numerator.checked_div(denominator).unwrap_or(sentinel)
    } else {
        sentinel
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

pub fn calculate_ratios(
    agg: &LedgerAggregates,
    sig: &SigCascade,
    sheet: &BalanceSheetSnapshot,
    config: &AnalysisConfig,
) -> RatioSet {
    let sentinel = config.liquidity_sentinel_value;
    let revenue = sig.revenue.value;

    // -- Working capital and cash --------------------------------------------
    let working_capital_need = sheet.stock_net + sheet.receivables + sheet.other_receivables
        - sheet.supplier_payables
        - sheet.other_payables;
    let net_cash_position = sheet.cash_positive - sheet.cash_overdraft;
    let net_cash_from_structure = sheet.funds_available() - working_capital_need;
    let cash_reconciliation_gap = net_cash_position - net_cash_from_structure;
    let cash_reconciled =
        cash_reconciliation_gap.abs() <= config.epsilon_for_reconciliation_checks;
    if !cash_reconciled {
        warn!(
            net_cash_position = %net_cash_position,
            net_cash_from_structure = %net_cash_from_structure,
            gap = %cash_reconciliation_gap,
            "net cash position does not reconcile with balance-sheet structure"
        );
    }

    // -- Operating cycle ------------------------------------------------------
    let purchases =
        agg.bucket(AccountBucket::Purchases) - agg.bucket(AccountBucket::StockVariation);
    let dso = days_or_zero(sheet.receivables, revenue);
    let dpo = days_or_zero(sheet.supplier_payables, purchases);
    let stock_days = days_or_zero(sheet.stock_net, purchases);
    let conversion_cycle_days = dso
        .checked_add(stock_days)
        .and_then(|d| d.checked_sub(dpo))
        .unwrap_or(Decimal::ZERO);

    // -- Structure ------------------------------------------------------------
    let current_assets = sheet.current_assets();
    let current_liabilities = sheet.current_liabilities();
    let total_assets = sheet.total_assets();
    let total_debt = sheet.total_debt();

    let liquidity_ratio = coverage(current_assets, current_liabilities, sentinel);
    let immediate_liquidity_ratio = coverage(sheet.cash_positive, current_liabilities, sentinel);
    let solvency_ratio = coverage(total_assets, total_debt, sentinel);
    let autonomy_ratio_pct = if total_assets > Decimal::ZERO {
        ratio_or(sheet.equity, total_assets, Decimal::ZERO)
            .checked_mul(dec!(100))
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };
    let debt_ratio = if sheet.financial_debt.is_zero() {
        Decimal::ZERO
    } else {
        coverage(sheet.financial_debt, sheet.equity, sentinel)
    };

    // -- Break-even -----------------------------------------------------------
    let variable_costs = agg.sum(&config.variable_cost_roots);
    let fixed_costs = agg.sum(&config.fixed_cost_roots);
    let margin_on_variable_costs_rate = if revenue > Decimal::ZERO {
        revenue
            .checked_sub(variable_costs)
            .map_or(Decimal::ZERO, |margin| ratio_or(margin, revenue, Decimal::ZERO))
    } else {
        Decimal::ZERO
    };
    let break_even_point = if margin_on_variable_costs_rate > Decimal::ZERO {
        ratio_or(fixed_costs, margin_on_variable_costs_rate, Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    debug!(
        working_capital_need = %working_capital_need,
        net_cash_position = %net_cash_position,
        dso = %dso,
        break_even_point = %break_even_point,
        "ratios computed"
    );

    RatioSet {
        working_capital_need,
        net_cash_position,
        net_cash_from_structure,
        cash_reconciliation_gap,
        cash_reconciled,
        dso,
        dpo,
        stock_days,
        conversion_cycle_days,
        liquidity_ratio,
        immediate_liquidity_ratio,
        solvency_ratio,
        autonomy_ratio_pct,
        debt_ratio,
        break_even_point,
        margin_on_variable_costs_rate,
        purchases,
        variable_costs,
        fixed_costs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::LedgerEntry;
    use crate::statements::balance_sheet::build_balance_sheet;
    use crate::statements::sig::calculate_sig;
    use chrono::NaiveDate;

    fn entry(account: &str, debit: Decimal, credit: Decimal) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        LedgerEntry::new(account, date, debit, credit)
    }

    fn ratios_of(entries: &[LedgerEntry]) -> RatioSet {
        let config = AnalysisConfig::default();
        let agg = LedgerAggregates::aggregate(entries);
        let sig = calculate_sig(&agg, &config);
        let sheet = build_balance_sheet(&agg);
        calculate_ratios(&agg, &sig, &sheet, &config)
    }

    #[test]
    fn test_ratio_or() {
        assert_eq!(ratio_or(dec!(10), dec!(4), dec!(999)), dec!(2.5));
        assert_eq!(ratio_or(dec!(10), Decimal::ZERO, dec!(999)), dec!(999));
    }

    #[test]
    fn test_days_or_zero() {
        assert_eq!(days_or_zero(dec!(2_500), dec!(10_000)), dec!(91.25));
        assert_eq!(days_or_zero(dec!(2_500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(days_or_zero(Decimal::ZERO, dec!(10_000)), Decimal::ZERO);
        assert_eq!(days_or_zero(dec!(100), dec!(-50)), Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_quotients_fall_back() {
        let huge = dec!(100_000_000_000_000_000_000);
        let tiny = dec!(0.00000001);
        assert_eq!(days_or_zero(huge, tiny), Decimal::ZERO);
        assert_eq!(ratio_or(Decimal::MAX, dec!(0.5), dec!(999)), dec!(999));
        assert_eq!(coverage(Decimal::MAX, dec!(0.1), dec!(999)), dec!(999));
    }

    #[test]
    fn test_extreme_balances_do_not_panic() {
        let r = ratios_of(&[
            entry("411000", dec!(100_000_000_000_000_000_000), dec!(0)),
            entry("706000", dec!(0), dec!(0.00000001)),
        ]);
        assert_eq!(r.dso, Decimal::ZERO);
        assert_eq!(r.margin_on_variable_costs_rate, Decimal::ONE);
        assert_eq!(r.break_even_point, Decimal::ZERO);
    }

    #[test]
    fn test_dso_from_receivables_and_revenue() {
        let r = ratios_of(&[
            entry("411000", dec!(2_500), dec!(0)),
            entry("706000", dec!(0), dec!(10_000)),
        ]);
        assert_eq!(r.dso, dec!(91.25));
    }

    #[test]
    fn test_dpo_and_stock_days() {
        let r = ratios_of(&[
            entry("607000", dec!(36_500), dec!(0)),
            entry("603700", dec!(0), dec!(1_000)),
            entry("401000", dec!(0), dec!(3_750)),
            entry("370000", dec!(7_500), dec!(0)),
        ]);
        // purchases exclude the stock variation
        assert_eq!(r.purchases, dec!(36_500));
        assert_eq!(r.dpo, dec!(37.5));
        assert_eq!(r.stock_days, dec!(75));
        assert_eq!(r.conversion_cycle_days, dec!(37.5));
    }

    #[test]
    fn test_break_even() {
        let r = ratios_of(&[
            entry("706000", dec!(0), dec!(100_000)),
            entry("601000", dec!(40_000), dec!(0)),
            entry("641000", dec!(30_000), dec!(0)),
        ]);
        assert_eq!(r.margin_on_variable_costs_rate, dec!(0.6));
        assert_eq!(r.fixed_costs, dec!(30_000));
        assert_eq!(r.break_even_point, dec!(50_000));
    }

    #[test]
    fn test_break_even_zero_when_margin_negative() {
        let r = ratios_of(&[
            entry("706000", dec!(0), dec!(1_000)),
            entry("601000", dec!(2_000), dec!(0)),
            entry("641000", dec!(500), dec!(0)),
        ]);
        assert!(r.margin_on_variable_costs_rate < Decimal::ZERO);
        assert_eq!(r.break_even_point, Decimal::ZERO);
    }

    #[test]
    fn test_sentinels_when_nothing_owed() {
        let r = ratios_of(&[entry("512000", dec!(1_000), dec!(0))]);
        assert_eq!(r.liquidity_ratio, dec!(999));
        assert_eq!(r.immediate_liquidity_ratio, dec!(999));
        assert_eq!(r.solvency_ratio, dec!(999));
        assert_eq!(r.debt_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_structure_ratios() {
        let r = ratios_of(&[
            entry("101300", dec!(0), dec!(40_000)),
            entry("164000", dec!(0), dec!(20_000)),
            entry("218000", dec!(50_000), dec!(0)),
            entry("512000", dec!(30_000), dec!(0)),
            entry("401000", dec!(0), dec!(20_000)),
        ]);
        // assets 80k, current liabilities 20k, total debt 40k
        assert_eq!(r.liquidity_ratio, dec!(1.5));
        assert_eq!(r.immediate_liquidity_ratio, dec!(1.5));
        assert_eq!(r.solvency_ratio, dec!(2));
        assert_eq!(r.autonomy_ratio_pct, dec!(50));
        assert_eq!(r.debt_ratio, dec!(0.5));
        // funds available 10k, wcn -20k => 30k, matches the bank balance
        assert_eq!(r.working_capital_need, dec!(-20_000));
        assert_eq!(r.net_cash_position, dec!(30_000));
        assert!(r.cash_reconciled);
    }

    #[test]
    fn test_reconciliation_gap_reported() {
        // Cash with no counterpart anywhere on the balance sheet.
        let r = ratios_of(&[entry("512000", dec!(1_000), dec!(0))]);
        assert_eq!(r.cash_reconciliation_gap, dec!(1_000));
        assert!(!r.cash_reconciled);
    }

    #[test]
    fn test_debt_without_equity_hits_sentinel() {
        let r = ratios_of(&[
            entry("164000", dec!(0), dec!(10_000)),
            entry("512000", dec!(10_000), dec!(0)),
        ]);
        assert_eq!(r.debt_ratio, dec!(999));
    }

    #[test]
    fn test_zero_revenue_is_total() {
        let r = ratios_of(&[
            entry("411000", dec!(500), dec!(0)),
            entry("401000", dec!(0), dec!(200)),
            entry("641000", dec!(1_000), dec!(0)),
        ]);
        assert_eq!(r.dso, Decimal::ZERO);
        assert_eq!(r.dpo, Decimal::ZERO);
        assert_eq!(r.stock_days, Decimal::ZERO);
        assert_eq!(r.break_even_point, Decimal::ZERO);
        assert_eq!(r.margin_on_variable_costs_rate, Decimal::ZERO);
    }
}
