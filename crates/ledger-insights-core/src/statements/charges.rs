use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::analysis::ratios::ratio_or;
use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::classifier::charge_label;
use crate::types::{Money, Rate};

/// One class-6 category and its weight in total charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeLine {
    pub root: String,
    pub label: String,
    pub amount: Money,
    /// amount / total charges; zero when total charges are zero
    pub share: Rate,
}

/// Class-6 balances per two-digit root, largest first. Roots with a zero
/// balance are left out.
pub fn charge_structure(agg: &LedgerAggregates) -> Vec<ChargeLine> {
    let total = agg.balance("6");
    let mut lines: Vec<ChargeLine> = agg
        .level(2)
        .filter(|a| a.root.starts_with('6') && !a.balance.is_zero())
        .map(|a| ChargeLine {
            root: a.root.clone(),
            label: charge_label(&a.root).to_string(),
            amount: a.balance,
            share: ratio_or(a.balance, total, Decimal::ZERO),
        })
        .collect();
    lines.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.root.cmp(&b.root)));
    lines
}
