use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LedgerInsightsError;
use crate::ledger::classifier::is_valid_root;
use crate::LedgerInsightsResult;

pub const DEFAULT_DSO_WARNING_DAYS: u32 = 60;
pub const DEFAULT_LIQUIDITY_SENTINEL: Decimal = dec!(999);
pub const DEFAULT_RECONCILIATION_EPSILON: Decimal = dec!(0.01);
pub const DEFAULT_AUTONOMY_WARNING_PCT: Decimal = dec!(20);

// ---------------------------------------------------------------------------
// Recap markers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    #[default]
    Substring,
    Regex,
}

/// A label pattern identifying a bank's periodic recap line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecapMarker {
    pub tag: String,
    pub pattern: String,
    #[serde(default)]
    pub kind: MarkerKind,
}

impl RecapMarker {
    pub fn substring(tag: &str, pattern: &str) -> Self {
        Self {
            tag: tag.into(),
            pattern: pattern.into(),
            kind: MarkerKind::Substring,
        }
    }

    pub fn regex(tag: &str, pattern: &str) -> Self {
        Self {
            tag: tag.into(),
            pattern: pattern.into(),
            kind: MarkerKind::Regex,
        }
    }
}

/// French bank recap vocabulary: "arrêté de compte", "intérêts et frais",
/// "résultat d'arrêté", with or without accents.
pub fn default_recap_markers() -> Vec<RecapMarker> {
    vec![
        RecapMarker::regex("period_closing", r"arr[eéê]t[eé]?\s+(de\s+)?comptes?"),
        RecapMarker::regex("interest_and_fees", r"int[eé]r[eê]ts?\s+(et|&)\s+frais"),
        RecapMarker::regex("closing_result", r"r[eé]sultat\s+(d['’]\s*)?arr[eéê]t[eé]"),
    ]
}

// ---------------------------------------------------------------------------
// Analysis configuration
// ---------------------------------------------------------------------------

/// Tunables of the engine. Every field has a default, so an empty JSON/TOML
/// document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Label patterns of bank recap lines to drop before aggregation
    pub bank_fee_duplicate_markers: Vec<RecapMarker>,
    /// Roots on which recap lines are looked for
    pub bank_fee_duplicate_roots: Vec<String>,
    /// Roots moved from external services into financial charges; empty disables
    pub bank_fee_roots_to_reclassify: Vec<String>,
    pub dso_warning_threshold_days: u32,
    /// Value reported for a ratio whose denominator is zero
    pub liquidity_sentinel_value: Decimal,
    pub epsilon_for_reconciliation_checks: Decimal,
    pub autonomy_warning_threshold_pct: Decimal,
    /// Roots whose debit balance counts as variable costs (break-even)
    pub variable_cost_roots: Vec<String>,
    /// Roots whose debit balance counts as fixed costs (break-even)
    pub fixed_cost_roots: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bank_fee_duplicate_markers: default_recap_markers(),
            bank_fee_duplicate_roots: roots(&["627", "661", "668"]),
            bank_fee_roots_to_reclassify: roots(&["627"]),
            dso_warning_threshold_days: DEFAULT_DSO_WARNING_DAYS,
            liquidity_sentinel_value: DEFAULT_LIQUIDITY_SENTINEL,
            epsilon_for_reconciliation_checks: DEFAULT_RECONCILIATION_EPSILON,
            autonomy_warning_threshold_pct: DEFAULT_AUTONOMY_WARNING_PCT,
            variable_cost_roots: roots(&["60"]),
            fixed_cost_roots: roots(&["61", "62", "63", "64", "65", "66", "68"]),
        }
    }
}

impl AnalysisConfig {
    /// Reject configurations the engine cannot honour. Marker regexes are
    /// compiled (and checked) by `DuplicateFilter::from_config`.
    pub fn validate(&self) -> LedgerInsightsResult<()> {
        check_roots("bank_fee_duplicate_roots", &self.bank_fee_duplicate_roots)?;
        check_roots(
            "bank_fee_roots_to_reclassify",
            &self.bank_fee_roots_to_reclassify,
        )?;
        check_roots("variable_cost_roots", &self.variable_cost_roots)?;
        check_roots("fixed_cost_roots", &self.fixed_cost_roots)?;

        // Summed lists: a balance reached through two roots would count twice.
        check_no_overlap(
            "bank_fee_roots_to_reclassify",
            &self.bank_fee_roots_to_reclassify,
        )?;
        check_no_overlap("variable_cost_roots", &self.variable_cost_roots)?;
        check_no_overlap("fixed_cost_roots", &self.fixed_cost_roots)?;
        for root in &self.fixed_cost_roots {
            if let Some(other) = self.variable_cost_roots.iter().find(|v| nested(root, v)) {
                return Err(overlap("fixed_cost_roots", root, other));
            }
        }

        if let Some(marker) = self
            .bank_fee_duplicate_markers
            .iter()
            .find(|m| m.pattern.trim().is_empty())
        {
            return Err(invalid(
                "bank_fee_duplicate_markers",
                &format!("Marker '{}' has an empty pattern.", marker.tag),
            ));
        }
        if self.liquidity_sentinel_value <= Decimal::ZERO {
            return Err(invalid(
                "liquidity_sentinel_value",
                "Sentinel must be positive.",
            ));
        }
        if self.epsilon_for_reconciliation_checks < Decimal::ZERO {
            return Err(invalid(
                "epsilon_for_reconciliation_checks",
                "Epsilon cannot be negative.",
            ));
        }
        if self.autonomy_warning_threshold_pct < Decimal::ZERO
            || self.autonomy_warning_threshold_pct > dec!(100)
        {
            return Err(invalid(
                "autonomy_warning_threshold_pct",
                "Threshold must lie between 0 and 100.",
            ));
        }
        Ok(())
    }

    pub fn reclassifies_bank_fees(&self) -> bool {
        !self.bank_fee_roots_to_reclassify.is_empty()
    }
}

fn roots(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn check_roots(field: &str, roots: &[String]) -> LedgerInsightsResult<()> {
    match roots.iter().find(|r| !is_valid_root(r)) {
        Some(bad) => Err(invalid(
            field,
            &format!("'{bad}' is not an account root of 1 to 3 digits."),
        )),
        None => Ok(()),
    }
}

/// One root equal to, or a prefix of, the other.
fn nested(a: &str, b: &str) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn check_no_overlap(field: &str, roots: &[String]) -> LedgerInsightsResult<()> {
    for (i, root) in roots.iter().enumerate() {
        if let Some(other) = roots[i + 1..].iter().find(|r| nested(root, r)) {
            return Err(overlap(field, root, other));
        }
    }
    Ok(())
}

fn overlap(field: &str, root: &str, other: &str) -> LedgerInsightsError {
    invalid(field, &format!("Roots '{root}' and '{other}' overlap."))
}

fn invalid(field: &str, reason: &str) -> LedgerInsightsError {
    LedgerInsightsError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}
