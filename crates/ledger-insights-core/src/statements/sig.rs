//! Intermediate management balances (SIG).
//!
//! Each stage is built only from aggregates and stages computed before it.
//! Revenue accounts (class 7) carry credit balances, so they are negated
//! once, here, when read into `SigComponents`; charges (class 6) are read as
//! is. No stage divides, so the cascade is defined for every ledger.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::ledger::aggregate::LedgerAggregates;
use crate::ledger::classifier::AccountBucket;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SigStage {
    pub value: Money,
    pub is_positive: bool,
}

impl SigStage {
    pub fn new(value: Money) -> Self {
        Self {
            value,
            is_positive: value > Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigStageName {
    Revenue,
    Production,
    RawMaterialConsumption,
    CommercialMargin,
    ProductionMargin,
    ExternalServices,
    ValueAdded,
    Ebitda,
    OperatingResult,
    FinancialResult,
    PretaxResult,
    ExceptionalResult,
    NetResult,
    SelfFinancingCapacity,
}

impl SigStageName {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Production => "Production of the period",
            Self::RawMaterialConsumption => "Raw material consumption",
            Self::CommercialMargin => "Commercial margin",
            Self::ProductionMargin => "Production margin",
            Self::ExternalServices => "External services",
            Self::ValueAdded => "Value added",
            Self::Ebitda => "EBITDA",
            Self::OperatingResult => "Operating result",
            Self::FinancialResult => "Financial result",
            Self::PretaxResult => "Pre-tax result",
            Self::ExceptionalResult => "Exceptional result",
            Self::NetResult => "Net result",
            Self::SelfFinancingCapacity => "Self-financing capacity",
        }
    }
}

/// Sign-resolved amounts read from the aggregates. Income is positive when
/// earned, charges positive when incurred.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigComponents {
    pub sales_revenue: Money,
    pub stored_production: Money,
    pub capitalised_production: Money,
    pub raw_materials: Money,
    pub stock_variation: Money,
    pub merchandise_sales: Money,
    pub merchandise_purchases: Money,
    /// 61 + 62 before any bank-fee reclassification
    pub external_services_gross: Money,
    /// Part of 61/62 moved into financial charges
    pub reclassified_bank_fees: Money,
    pub subsidies: Money,
    pub taxes_and_duties: Money,
    pub personnel_costs: Money,
    pub other_operating_income: Money,
    pub reversals: Money,
    pub charge_transfers: Money,
    pub other_operating_charges: Money,
    pub depreciation_and_provisions: Money,
    pub financial_income: Money,
    /// 66 plus reclassified bank fees
    pub financial_charges: Money,
    pub exceptional_income: Money,
    pub exceptional_charges: Money,
    pub corporate_tax: Money,
    pub net_book_value_of_disposals: Money,
    pub proceeds_from_disposals: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SigCascade {
    pub revenue: SigStage,
    pub production: SigStage,
    pub raw_material_consumption: SigStage,
    pub commercial_margin: SigStage,
    pub production_margin: SigStage,
    pub external_services: SigStage,
    pub value_added: SigStage,
    pub ebitda: SigStage,
    pub operating_result: SigStage,
    pub financial_result: SigStage,
    pub pretax_result: SigStage,
    pub exceptional_result: SigStage,
    pub net_result: SigStage,
    pub self_financing_capacity: SigStage,
    pub components: SigComponents,
}

impl SigCascade {
    /// Stages in computation order.
    pub fn stages(&self) -> Vec<(SigStageName, SigStage)> {
        vec![
            (SigStageName::Revenue, self.revenue),
            (SigStageName::Production, self.production),
            (SigStageName::RawMaterialConsumption, self.raw_material_consumption),
            (SigStageName::CommercialMargin, self.commercial_margin),
            (SigStageName::ProductionMargin, self.production_margin),
            (SigStageName::ExternalServices, self.external_services),
            (SigStageName::ValueAdded, self.value_added),
            (SigStageName::Ebitda, self.ebitda),
            (SigStageName::OperatingResult, self.operating_result),
            (SigStageName::FinancialResult, self.financial_result),
            (SigStageName::PretaxResult, self.pretax_result),
            (SigStageName::ExceptionalResult, self.exceptional_result),
            (SigStageName::NetResult, self.net_result),
            (SigStageName::SelfFinancingCapacity, self.self_financing_capacity),
        ]
    }
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Read the sign-resolved components out of the aggregates.
pub fn read_components(agg: &LedgerAggregates, config: &AnalysisConfig) -> SigComponents {
    let income = |b: AccountBucket| -agg.bucket(b);
    let charge = |b: AccountBucket| agg.bucket(b);

    let reclassified_bank_fees = reclassified_bank_fees(agg, config);

    SigComponents {
        sales_revenue: income(AccountBucket::SalesRevenue),
        stored_production: income(AccountBucket::StoredProduction),
        capitalised_production: income(AccountBucket::CapitalisedProduction),
        raw_materials: charge(AccountBucket::RawMaterials),
        stock_variation: charge(AccountBucket::StockVariation),
        merchandise_sales: income(AccountBucket::MerchandiseSales),
        merchandise_purchases: charge(AccountBucket::MerchandisePurchases),
        external_services_gross: charge(AccountBucket::ExternalServices),
        reclassified_bank_fees,
        subsidies: income(AccountBucket::Subsidies),
        taxes_and_duties: charge(AccountBucket::TaxesAndDuties),
        personnel_costs: charge(AccountBucket::PersonnelCosts),
        other_operating_income: income(AccountBucket::OtherOperatingIncome),
        reversals: income(AccountBucket::Reversals),
        charge_transfers: income(AccountBucket::ChargeTransfers),
        other_operating_charges: charge(AccountBucket::OtherOperatingCharges),
        depreciation_and_provisions: charge(AccountBucket::DepreciationAndProvisions),
        financial_income: income(AccountBucket::FinancialIncome),
        financial_charges: charge(AccountBucket::FinancialCharges) + reclassified_bank_fees,
        exceptional_income: income(AccountBucket::ExceptionalIncome),
        exceptional_charges: charge(AccountBucket::ExceptionalCharges),
        corporate_tax: charge(AccountBucket::CorporateTax),
        net_book_value_of_disposals: charge(AccountBucket::DisposedAssetsBookValue),
        proceeds_from_disposals: income(AccountBucket::DisposalProceeds),
    }
}

/// Balance of the configured bank-fee roots that sit inside external
/// services (61/62). Roots elsewhere are ignored so nothing is moved twice.
fn reclassified_bank_fees(agg: &LedgerAggregates, config: &AnalysisConfig) -> Money {
    config
        .bank_fee_roots_to_reclassify
        .iter()
        .filter(|r| r.len() >= 2 && (r.starts_with("61") || r.starts_with("62")))
        .map(|r| agg.balance(r))
        .sum()
}

/// Run the cascade from revenue down to self-financing capacity.
pub fn calculate_sig(agg: &LedgerAggregates, config: &AnalysisConfig) -> SigCascade {
    let c = read_components(agg, config);

    let revenue = c.sales_revenue;
    let production = c.sales_revenue + c.stored_production + c.capitalised_production;
    let raw_material_consumption = c.raw_materials + c.stock_variation;
    let commercial_margin = c.merchandise_sales - c.merchandise_purchases + c.stock_variation;
    let production_margin = production - raw_material_consumption;
    let external_services = c.external_services_gross - c.reclassified_bank_fees;
    let value_added = production_margin - external_services;
    let ebitda = value_added + c.subsidies - c.taxes_and_duties - c.personnel_costs;
    let operating_result = ebitda
        + (c.other_operating_income + c.reversals + c.charge_transfers)
        - (c.other_operating_charges + c.depreciation_and_provisions);
    let financial_result = c.financial_income - c.financial_charges;
    let pretax_result = operating_result + financial_result;
    let exceptional_result = c.exceptional_income - c.exceptional_charges;
    let net_result = pretax_result + exceptional_result - c.corporate_tax;
    let self_financing_capacity = net_result + c.depreciation_and_provisions - c.reversals
        + c.net_book_value_of_disposals
        - c.proceeds_from_disposals;

    debug!(
        revenue = %revenue,
        ebitda = %ebitda,
        net_result = %net_result,
        reclassified_bank_fees = %c.reclassified_bank_fees,
        "SIG cascade computed"
    );

    SigCascade {
        revenue: SigStage::new(revenue),
        production: SigStage::new(production),
        raw_material_consumption: SigStage::new(raw_material_consumption),
        commercial_margin: SigStage::new(commercial_margin),
        production_margin: SigStage::new(production_margin),
        external_services: SigStage::new(external_services),
        value_added: SigStage::new(value_added),
        ebitda: SigStage::new(ebitda),
        operating_result: SigStage::new(operating_result),
        financial_result: SigStage::new(financial_result),
        pretax_result: SigStage::new(pretax_result),
        exceptional_result: SigStage::new(exceptional_result),
        net_result: SigStage::new(net_result),
        self_financing_capacity: SigStage::new(self_financing_capacity),
        components: c,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::LedgerEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(account: &str, debit: Decimal, credit: Decimal) -> LedgerEntry {
        let date = NaiveDate::from_ymd_opt(2024, 9, 30).unwrap();
        LedgerEntry::new(account, date, debit, credit)
    }

    fn sig_of(entries: &[LedgerEntry]) -> SigCascade {
        let agg = LedgerAggregates::aggregate(entries);
        calculate_sig(&agg, &AnalysisConfig::default())
    }

    #[test]
    fn test_sales_and_raw_materials() {
        let sig = sig_of(&[
            entry("701000", dec!(0), dec!(10_000)),
            entry("601000", dec!(3_000), dec!(0)),
        ]);
        assert_eq!(sig.revenue.value, dec!(10_000));
        assert_eq!(sig.production.value, dec!(10_000));
        assert_eq!(sig.raw_material_consumption.value, dec!(3_000));
        assert_eq!(sig.production_margin.value, dec!(7_000));
        assert_eq!(sig.value_added.value, dec!(7_000));
        assert_eq!(sig.ebitda.value, dec!(7_000));
        assert_eq!(sig.net_result.value, dec!(7_000));
        assert!(sig.net_result.is_positive);
    }

    #[test]
    fn test_full_cascade() {
        let sig = sig_of(&[
            entry("706000", dec!(0), dec!(100_000)),
            entry("713000", dec!(0), dec!(5_000)),
            entry("601000", dec!(20_000), dec!(0)),
            entry("603100", dec!(0), dec!(2_000)),
            entry("613000", dec!(6_000), dec!(0)),
            entry("622000", dec!(4_000), dec!(0)),
            entry("740000", dec!(0), dec!(1_000)),
            entry("635000", dec!(1_500), dec!(0)),
            entry("641000", dec!(30_000), dec!(0)),
            entry("645000", dec!(12_000), dec!(0)),
            entry("681100", dec!(8_000), dec!(0)),
            entry("781000", dec!(0), dec!(500)),
            entry("651000", dec!(200), dec!(0)),
            entry("761000", dec!(0), dec!(300)),
            entry("661100", dec!(900), dec!(0)),
            entry("771000", dec!(0), dec!(400)),
            entry("671000", dec!(100), dec!(0)),
            entry("675000", dec!(2_000), dec!(0)),
            entry("775000", dec!(0), dec!(2_500)),
            entry("695000", dec!(3_000), dec!(0)),
        ]);
        // production = 100k + 5k
        assert_eq!(sig.production.value, dec!(105_000));
        // consumption = 20k + (-2k) stock variation
        assert_eq!(sig.raw_material_consumption.value, dec!(18_000));
        assert_eq!(sig.production_margin.value, dec!(87_000));
        assert_eq!(sig.external_services.value, dec!(10_000));
        assert_eq!(sig.value_added.value, dec!(77_000));
        // 77k + 1k - 1.5k - 42k
        assert_eq!(sig.ebitda.value, dec!(34_500));
        // 34.5k + 0.5k - (0.2k + 8k)
        assert_eq!(sig.operating_result.value, dec!(26_800));
        assert_eq!(sig.financial_result.value, dec!(-600));
        assert_eq!(sig.pretax_result.value, dec!(26_200));
        // 0.4k + 2.5k - 0.1k - 2k
        assert_eq!(sig.exceptional_result.value, dec!(800));
        assert_eq!(sig.net_result.value, dec!(24_000));
        // 24k + 8k - 0.5k + 2k - 2.5k
        assert_eq!(sig.self_financing_capacity.value, dec!(31_000));
        assert!(!sig.financial_result.is_positive);
    }

    #[test]
    fn test_commercial_margin() {
        let sig = sig_of(&[
            entry("707000", dec!(0), dec!(50_000)),
            entry("607000", dec!(30_000), dec!(0)),
            entry("603700", dec!(1_000), dec!(0)),
        ]);
        // 50k - 30k + 1k
        assert_eq!(sig.commercial_margin.value, dec!(21_000));
    }

    #[test]
    fn test_bank_fees_reclassified_into_financial_charges() {
        let entries = [
            entry("626000", dec!(300), dec!(0)),
            entry("627000", dec!(120), dec!(0)),
            entry("661000", dec!(80), dec!(0)),
        ];
        let sig = sig_of(&entries);
        assert_eq!(sig.external_services.value, dec!(300));
        assert_eq!(sig.components.reclassified_bank_fees, dec!(120));
        assert_eq!(sig.components.financial_charges, dec!(200));
        assert_eq!(sig.financial_result.value, dec!(-200));

        let config = AnalysisConfig {
            bank_fee_roots_to_reclassify: vec![],
            ..Default::default()
        };
        let sig = calculate_sig(&LedgerAggregates::aggregate(&entries), &config);
        assert_eq!(sig.external_services.value, dec!(420));
        assert_eq!(sig.components.financial_charges, dec!(80));
        // Net result does not depend on where the fees are shown.
        assert_eq!(sig.net_result.value, dec!(-500));
    }

    #[test]
    fn test_reclassification_ignores_roots_outside_external_services() {
        let config = AnalysisConfig {
            bank_fee_roots_to_reclassify: vec!["661".into()],
            ..Default::default()
        };
        let entries = [entry("661000", dec!(80), dec!(0))];
        let sig = calculate_sig(&LedgerAggregates::aggregate(&entries), &config);
        assert_eq!(sig.components.reclassified_bank_fees, Decimal::ZERO);
        assert_eq!(sig.components.financial_charges, dec!(80));
    }

    #[test]
    fn test_empty_ledger_is_all_zero() {
        let sig = sig_of(&[]);
        for (name, stage) in sig.stages() {
            assert_eq!(stage.value, Decimal::ZERO, "{name:?}");
            assert!(!stage.is_positive);
        }
    }

    #[test]
    fn test_stage_order() {
        let sig = sig_of(&[entry("701000", dec!(0), dec!(10))]);
        let names: Vec<SigStageName> = sig.stages().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.first(), Some(&SigStageName::Revenue));
        assert_eq!(names.last(), Some(&SigStageName::SelfFinancingCapacity));
        assert_eq!(names.len(), 14);
        assert_eq!(sig.stages()[0].1.value, dec!(10));
    }
}
