//! Rule-based alerts and the 0-100 health score.
//!
//! Rules live in a single static table. Adding a rule means adding one
//! entry to `RULES`; nothing else changes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::analysis::quality::DataQualityReport;
use crate::analysis::ratios::RatioSet;
use crate::config::AnalysisConfig;
use crate::statements::balance_sheet::BalanceSheetSnapshot;
use crate::statements::sig::SigCascade;

pub const MAX_SCORE: i32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn penalty(&self) -> i32 {
        match self {
            Severity::Critical => 20,
            Severity::Warning => 10,
            Severity::Info => 3,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 80 => Grade::A,
            s if s >= 60 => Grade::B,
            s if s >= 40 => Grade::C,
            _ => Grade::D,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
        };
        write!(f, "{}", s)
    }
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub sig: &'a SigCascade,
    pub sheet: &'a BalanceSheetSnapshot,
    pub ratios: &'a RatioSet,
    pub quality: &'a DataQualityReport,
    pub config: &'a AnalysisConfig,
}

pub struct AlertRule {
    pub code: &'static str,
    pub severity: Severity,
    pub condition: fn(&RuleContext) -> bool,
    pub message: fn(&RuleContext) -> String,
}

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

pub static RULES: &[AlertRule] = &[
    AlertRule {
        code: "NET_LOSS",
        severity: Severity::Critical,
        condition: |c| c.sig.net_result.value < Decimal::ZERO,
        message: |c| format!("Net result is a loss of {}.", c.sig.net_result.value),
    },
    AlertRule {
        code: "NEGATIVE_EBITDA",
        severity: Severity::Critical,
        condition: |c| c.sig.ebitda.value < Decimal::ZERO,
        message: |c| {
            format!(
                "EBITDA is negative ({}): operations consume cash before financing.",
                c.sig.ebitda.value
            )
        },
    },
    AlertRule {
        code: "NEGATIVE_NET_CASH",
        severity: Severity::Critical,
        condition: |c| c.ratios.net_cash_position < Decimal::ZERO,
        message: |c| {
            format!(
                "Net cash position is negative ({}): the business runs on overdraft.",
                c.ratios.net_cash_position
            )
        },
    },
    AlertRule {
        code: "BELOW_BREAK_EVEN",
        severity: Severity::Critical,
        condition: |c| {
            c.ratios.break_even_point > Decimal::ZERO
                && c.sig.revenue.value < c.ratios.break_even_point
        },
        message: |c| {
            format!(
                "Revenue {} is below the break-even point {}.",
                c.sig.revenue.value,
                c.ratios.break_even_point.round_dp(2)
            )
        },
    },
    AlertRule {
        code: "NEGATIVE_VARIABLE_MARGIN",
        severity: Severity::Warning,
        condition: |c| {
            c.sig.revenue.value > Decimal::ZERO
                && c.ratios.margin_on_variable_costs_rate <= Decimal::ZERO
        },
        message: |c| {
            format!(
                "Variable costs {} absorb all revenue {}: no break-even is reachable.",
                c.ratios.variable_costs, c.sig.revenue.value
            )
        },
    },
    AlertRule {
        code: "HIGH_DSO",
        severity: Severity::Warning,
        condition: |c| c.ratios.dso > Decimal::from(c.config.dso_warning_threshold_days),
        message: |c| {
            format!(
                "Customers pay in {} days on average (threshold {}).",
                c.ratios.dso.round_dp(1),
                c.config.dso_warning_threshold_days
            )
        },
    },
    AlertRule {
        code: "WCN_EXCEEDS_CASH",
        severity: Severity::Warning,
        condition: |c| {
            c.ratios.working_capital_need > Decimal::ZERO
                && c.ratios.working_capital_need > c.ratios.net_cash_position
        },
        message: |c| {
            format!(
                "Working capital need {} exceeds net cash position {}.",
                c.ratios.working_capital_need, c.ratios.net_cash_position
            )
        },
    },
    AlertRule {
        code: "LOW_AUTONOMY",
        severity: Severity::Warning,
        condition: |c| {
            c.sheet.total_assets() > Decimal::ZERO
                && c.ratios.autonomy_ratio_pct < c.config.autonomy_warning_threshold_pct
        },
        message: |c| {
            format!(
                "Equity covers {}% of total assets (threshold {}%).",
                c.ratios.autonomy_ratio_pct.round_dp(1),
                c.config.autonomy_warning_threshold_pct
            )
        },
    },
    AlertRule {
        code: "LOW_LIQUIDITY",
        severity: Severity::Warning,
        condition: |c| {
            c.sheet.current_liabilities() > Decimal::ZERO && c.ratios.liquidity_ratio < dec!(1)
        },
        message: |c| {
            format!(
                "Current assets cover {}x current liabilities.",
                c.ratios.liquidity_ratio.round_dp(2)
            )
        },
    },
    AlertRule {
        code: "CASH_RECONCILIATION_MISMATCH",
        severity: Severity::Info,
        condition: |c| !c.ratios.cash_reconciled,
        message: |c| {
            format!(
                "Net cash position differs from funds available minus working capital need by {}.",
                c.ratios.cash_reconciliation_gap
            )
        },
    },
    AlertRule {
        code: "UNBALANCED_LEDGER",
        severity: Severity::Info,
        condition: |c| !c.quality.is_balanced,
        message: |c| {
            format!(
                "Debits and credits differ by {}; the ledger may be partial.",
                c.quality.balance_gap
            )
        },
    },
    AlertRule {
        code: "ENTRIES_OUTSIDE_FISCAL_YEAR",
        severity: Severity::Info,
        condition: |c| c.quality.entries_outside_fiscal_year > 0,
        message: |c| {
            format!(
                "{} entries are dated outside the fiscal year.",
                c.quality.entries_outside_fiscal_year
            )
        },
    },
];

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate `rules` once, most severe first (table order within a severity).
pub fn evaluate_rules(rules: &[AlertRule], ctx: &RuleContext) -> Vec<Alert> {
    let mut alerts: Vec<Alert> = rules
        .iter()
        .filter(|rule| (rule.condition)(ctx))
        .map(|rule| Alert {
            severity: rule.severity,
            code: rule.code.to_string(),
            message: (rule.message)(ctx),
        })
        .collect();
    alerts.sort_by(|a, b| b.severity.cmp(&a.severity));
    alerts
}

pub fn evaluate_alerts(ctx: &RuleContext) -> Vec<Alert> {
    evaluate_rules(RULES, ctx)
}

/// 100 minus the penalty of every alert, clamped to [0, 100].
pub fn health_score(alerts: &[Alert]) -> i32 {
    let penalty: i32 = alerts.iter().map(|a| a.severity.penalty()).sum();
    (MAX_SCORE - penalty).clamp(0, MAX_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statements::sig::SigStage;

    fn alert(severity: Severity) -> Alert {
        Alert {
            severity,
            code: "TEST".into(),
            message: String::new(),
        }
    }

    struct Fixture {
        sig: SigCascade,
        sheet: BalanceSheetSnapshot,
        ratios: RatioSet,
        quality: DataQualityReport,
        config: AnalysisConfig,
    }

    impl Fixture {
        fn healthy() -> Self {
            let mut quality = DataQualityReport::default();
            quality.is_balanced = true;
            let mut ratios = RatioSet::default();
            ratios.cash_reconciled = true;
            Self {
                sig: SigCascade::default(),
                sheet: BalanceSheetSnapshot::default(),
                ratios,
                quality,
                config: AnalysisConfig::default(),
            }
        }

        fn codes(&self) -> Vec<String> {
            let ctx = RuleContext {
                sig: &self.sig,
                sheet: &self.sheet,
                ratios: &self.ratios,
                quality: &self.quality,
                config: &self.config,
            };
            evaluate_alerts(&ctx).into_iter().map(|a| a.code).collect()
        }
    }

    #[test]
    fn test_no_alerts_on_neutral_input() {
        assert!(Fixture::healthy().codes().is_empty());
    }

    #[test]
    fn test_loss_and_negative_ebitda() {
        let mut f = Fixture::healthy();
        f.sig.net_result = SigStage::new(dec!(-10));
        f.sig.ebitda = SigStage::new(dec!(-5));
        assert_eq!(f.codes(), vec!["NET_LOSS", "NEGATIVE_EBITDA"]);
    }

    #[test]
    fn test_dso_threshold_is_strict() {
        let mut f = Fixture::healthy();
        f.ratios.dso = dec!(60);
        assert!(f.codes().is_empty());
        f.ratios.dso = dec!(60.5);
        assert_eq!(f.codes(), vec!["HIGH_DSO"]);
        f.config.dso_warning_threshold_days = 90;
        assert!(f.codes().is_empty());
    }

    #[test]
    fn test_wcn_exceeds_cash_requires_positive_need() {
        let mut f = Fixture::healthy();
        f.ratios.working_capital_need = dec!(-100);
        f.ratios.net_cash_position = dec!(-200);
        assert_eq!(f.codes(), vec!["NEGATIVE_NET_CASH"]);
        f.ratios.working_capital_need = dec!(50);
        assert_eq!(f.codes(), vec!["NEGATIVE_NET_CASH", "WCN_EXCEEDS_CASH"]);
    }

    #[test]
    fn test_below_break_even() {
        let mut f = Fixture::healthy();
        f.sig.revenue = SigStage::new(dec!(40_000));
        f.ratios.break_even_point = dec!(50_000);
        f.ratios.margin_on_variable_costs_rate = dec!(0.6);
        assert_eq!(f.codes(), vec!["BELOW_BREAK_EVEN"]);
    }

    #[test]
    fn test_low_autonomy_needs_assets() {
        let mut f = Fixture::healthy();
        f.ratios.autonomy_ratio_pct = dec!(10);
        assert!(f.codes().is_empty());
        f.sheet.fixed_assets = dec!(1_000);
        assert_eq!(f.codes(), vec!["LOW_AUTONOMY"]);
    }

    #[test]
    fn test_severity_ordering() {
        let mut f = Fixture::healthy();
        f.quality.entries_outside_fiscal_year = 3;
        f.ratios.dso = dec!(120);
        f.sig.net_result = SigStage::new(dec!(-1));
        assert_eq!(
            f.codes(),
            vec!["NET_LOSS", "HIGH_DSO", "ENTRIES_OUTSIDE_FISCAL_YEAR"]
        );
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = [AlertRule {
            code: "ALWAYS",
            severity: Severity::Info,
            condition: |_| true,
            message: |_| "always fires".into(),
        }];
        let f = Fixture::healthy();
        let ctx = RuleContext {
            sig: &f.sig,
            sheet: &f.sheet,
            ratios: &f.ratios,
            quality: &f.quality,
            config: &f.config,
        };
        let alerts = evaluate_rules(&rules, &ctx);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].message, "always fires");
    }

    #[test]
    fn test_score_penalties_and_clamp() {
        assert_eq!(health_score(&[]), 100);
        let mixed = [
            alert(Severity::Critical),
            alert(Severity::Warning),
            alert(Severity::Info),
        ];
        assert_eq!(health_score(&mixed), 67);
        let many: Vec<Alert> = (0..6).map(|_| alert(Severity::Critical)).collect();
        assert_eq!(health_score(&many), 0);
    }

    #[test]
    fn test_grade_buckets() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(80), Grade::A);
        assert_eq!(Grade::from_score(79), Grade::B);
        assert_eq!(Grade::from_score(60), Grade::B);
        assert_eq!(Grade::from_score(40), Grade::C);
        assert_eq!(Grade::from_score(39), Grade::D);
        assert_eq!(Grade::from_score(0), Grade::D);
    }
}
