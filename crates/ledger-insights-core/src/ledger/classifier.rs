//! Chart-of-accounts classification.
//!
//! Accounts follow the French PCG numbering: the first digit is the class,
//! the first two or three digits name the category. Classification only
//! looks at those leading characters; everything after them (sub-accounts,
//! auxiliary suffixes such as `411DUPONT`) is ignored.

use serde::{Deserialize, Serialize};

/// Number of leading digits required for an account to be classified.
pub const MAX_ROOT_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Roots
// ---------------------------------------------------------------------------

/// The 1-, 2- and 3-character prefixes of a classified account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRoots {
    pub root1: String,
    pub root2: String,
    pub root3: String,
}

impl AccountRoots {
    /// Roots from the shortest to the longest.
    pub fn all(&self) -> [&str; 3] {
        [&self.root1, &self.root2, &self.root3]
    }

    /// Whether `root` (1 to 3 characters) is one of this account's prefixes.
    pub fn has_root(&self, root: &str) -> bool {
        match root.len() {
            1 => self.root1 == root,
            2 => self.root2 == root,
            3 => self.root3 == root,
            _ => false,
        }
    }

    pub fn has_any_root<S: AsRef<str>>(&self, roots: &[S]) -> bool {
        roots.iter().any(|r| self.has_root(r.as_ref()))
    }

    /// Semantic buckets this account falls into. May be several (a `627`
    /// account is both an external service and a bank fee).
    pub fn buckets(&self) -> Vec<AccountBucket> {
        AccountBucket::ALL
            .iter()
            .copied()
            .filter(|b| self.has_any_root(b.roots()))
            .collect()
    }
}

/// Result of classifying an account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AccountClass {
    Classified(AccountRoots),
    Unclassified,
}

impl AccountClass {
    pub fn roots(&self) -> Option<&AccountRoots> {
        match self {
            AccountClass::Classified(roots) => Some(roots),
            AccountClass::Unclassified => None,
        }
    }
}

/// Split an account number into its roots.
///
/// Anything whose first three characters are not ASCII digits is
/// unclassified. It still takes part in the totals, but in no named bucket.
pub fn classify(account_number: &str) -> AccountClass {
    let head = account_number.as_bytes();
    if head.len() < MAX_ROOT_LEN || !head[..MAX_ROOT_LEN].iter().all(u8::is_ascii_digit) {
        return AccountClass::Unclassified;
    }
    AccountClass::Classified(AccountRoots {
        root1: account_number[..1].to_string(),
        root2: account_number[..2].to_string(),
        root3: account_number[..3].to_string(),
    })
}

/// Whether `root` is a syntactically valid root (1 to 3 ASCII digits).
pub fn is_valid_root(root: &str) -> bool {
    (1..=MAX_ROOT_LEN).contains(&root.len()) && root.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Buckets
// ---------------------------------------------------------------------------

/// Named categories of the chart of accounts used by the statements.
///
/// Each bucket owns a list of non-overlapping roots; summing the balances of
/// those roots gives the bucket balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountBucket {
    // Balance sheet
    Equity,
    FinancialDebt,
    FixedAssetsGross,
    FixedAssetDepreciation,
    StockGross,
    StockDepreciation,
    SupplierPayables,
    TradeReceivables,
    ThirdPartyAccounts,
    CashAccounts,
    // Charges
    Purchases,
    RawMaterials,
    StockVariation,
    MerchandisePurchases,
    ExternalServices,
    BankFees,
    TaxesAndDuties,
    PersonnelCosts,
    OtherOperatingCharges,
    FinancialCharges,
    ExceptionalCharges,
    DisposedAssetsBookValue,
    DepreciationAndProvisions,
    CorporateTax,
    // Revenue
    SalesRevenue,
    MerchandiseSales,
    StoredProduction,
    CapitalisedProduction,
    Subsidies,
    OtherOperatingIncome,
    FinancialIncome,
    ExceptionalIncome,
    DisposalProceeds,
    Reversals,
    ChargeTransfers,
}

impl AccountBucket {
    pub const ALL: [AccountBucket; 35] = [
        AccountBucket::Equity,
        AccountBucket::FinancialDebt,
        AccountBucket::FixedAssetsGross,
        AccountBucket::FixedAssetDepreciation,
        AccountBucket::StockGross,
        AccountBucket::StockDepreciation,
        AccountBucket::SupplierPayables,
        AccountBucket::TradeReceivables,
        AccountBucket::ThirdPartyAccounts,
        AccountBucket::CashAccounts,
        AccountBucket::Purchases,
        AccountBucket::RawMaterials,
        AccountBucket::StockVariation,
        AccountBucket::MerchandisePurchases,
        AccountBucket::ExternalServices,
        AccountBucket::BankFees,
        AccountBucket::TaxesAndDuties,
        AccountBucket::PersonnelCosts,
        AccountBucket::OtherOperatingCharges,
        AccountBucket::FinancialCharges,
        AccountBucket::ExceptionalCharges,
        AccountBucket::DisposedAssetsBookValue,
        AccountBucket::DepreciationAndProvisions,
        AccountBucket::CorporateTax,
        AccountBucket::SalesRevenue,
        AccountBucket::MerchandiseSales,
        AccountBucket::StoredProduction,
        AccountBucket::CapitalisedProduction,
        AccountBucket::Subsidies,
        AccountBucket::OtherOperatingIncome,
        AccountBucket::FinancialIncome,
        AccountBucket::ExceptionalIncome,
        AccountBucket::DisposalProceeds,
        AccountBucket::Reversals,
        AccountBucket::ChargeTransfers,
    ];

    pub fn roots(&self) -> &'static [&'static str] {
        match self {
            Self::Equity => &["10", "11", "12", "13", "14", "15"],
            Self::FinancialDebt => &["16", "17"],
            Self::FixedAssetsGross => &["20", "21", "22", "23", "24", "25", "26", "27"],
            Self::FixedAssetDepreciation => &["28", "29"],
            Self::StockGross => &["31", "32", "33", "34", "35", "36", "37"],
            Self::StockDepreciation => &["39"],
            Self::SupplierPayables => &["401"],
            Self::TradeReceivables => &["411"],
            Self::ThirdPartyAccounts => {
                &["40", "41", "42", "43", "44", "45", "46", "47", "48", "49"]
            }
            Self::CashAccounts => &["51", "52", "53", "54"],
            Self::Purchases => &["60"],
            Self::RawMaterials => &["601", "602"],
            Self::StockVariation => &["603"],
            Self::MerchandisePurchases => &["607"],
            Self::ExternalServices => &["61", "62"],
            Self::BankFees => &["627"],
            Self::TaxesAndDuties => &["63"],
            Self::PersonnelCosts => &["64"],
            Self::OtherOperatingCharges => &["65"],
            Self::FinancialCharges => &["66"],
            Self::ExceptionalCharges => &["67"],
            Self::DisposedAssetsBookValue => &["675"],
            Self::DepreciationAndProvisions => &["68"],
            Self::CorporateTax => &["695"],
            Self::SalesRevenue => &["70"],
            Self::MerchandiseSales => &["707"],
            Self::StoredProduction => &["71"],
            Self::CapitalisedProduction => &["72"],
            Self::Subsidies => &["74"],
            Self::OtherOperatingIncome => &["75"],
            Self::FinancialIncome => &["76"],
            Self::ExceptionalIncome => &["77"],
            Self::DisposalProceeds => &["775"],
            Self::Reversals => &["78"],
            Self::ChargeTransfers => &["79"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Equity => "Equity and provisions",
            Self::FinancialDebt => "Borrowings",
            Self::FixedAssetsGross => "Fixed assets (gross)",
            Self::FixedAssetDepreciation => "Fixed asset depreciation",
            Self::StockGross => "Stock (gross)",
            Self::StockDepreciation => "Stock depreciation",
            Self::SupplierPayables => "Suppliers",
            Self::TradeReceivables => "Customers",
            Self::ThirdPartyAccounts => "Third-party accounts",
            Self::CashAccounts => "Bank and cash",
            Self::Purchases => "Purchases",
            Self::RawMaterials => "Raw materials and supplies",
            Self::StockVariation => "Stock variation",
            Self::MerchandisePurchases => "Merchandise purchases",
            Self::ExternalServices => "External services",
            Self::BankFees => "Bank fees",
            Self::TaxesAndDuties => "Taxes and duties",
            Self::PersonnelCosts => "Personnel costs",
            Self::OtherOperatingCharges => "Other operating charges",
            Self::FinancialCharges => "Financial charges",
            Self::ExceptionalCharges => "Exceptional charges",
            Self::DisposedAssetsBookValue => "Book value of disposed assets",
            Self::DepreciationAndProvisions => "Depreciation and provisions",
            Self::CorporateTax => "Corporate tax",
            Self::SalesRevenue => "Sales",
            Self::MerchandiseSales => "Merchandise sales",
            Self::StoredProduction => "Stored production",
            Self::CapitalisedProduction => "Capitalised production",
            Self::Subsidies => "Operating subsidies",
            Self::OtherOperatingIncome => "Other operating income",
            Self::FinancialIncome => "Financial income",
            Self::ExceptionalIncome => "Exceptional income",
            Self::DisposalProceeds => "Disposal proceeds",
            Self::Reversals => "Reversals of depreciation and provisions",
            Self::ChargeTransfers => "Charge transfers",
        }
    }
}

/// Human label for a class-6 root-2 (`"64"` -> "Personnel costs").
pub fn charge_label(root2: &str) -> &'static str {
    match root2 {
        "60" => AccountBucket::Purchases.label(),
        "61" | "62" => AccountBucket::ExternalServices.label(),
        "63" => AccountBucket::TaxesAndDuties.label(),
        "64" => AccountBucket::PersonnelCosts.label(),
        "65" => AccountBucket::OtherOperatingCharges.label(),
        "66" => AccountBucket::FinancialCharges.label(),
        "67" => AccountBucket::ExceptionalCharges.label(),
        "68" => AccountBucket::DepreciationAndProvisions.label(),
        "69" => "Income tax and profit sharing",
        _ => "Other charges",
    }
}
