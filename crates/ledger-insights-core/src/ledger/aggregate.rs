use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ledger::classifier::{classify, AccountBucket, AccountClass};
use crate::ledger::entry::LedgerEntry;
use crate::types::Money;

// ---------------------------------------------------------------------------
// Aggregate
// ---------------------------------------------------------------------------

/// Cumulative debit/credit of every entry under one root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountAggregate {
    pub root: String,
    pub debit: Money,
    pub credit: Money,
    /// debit - credit, never re-signed here
    pub balance: Money,
    pub entry_count: usize,
}

impl AccountAggregate {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn add(&mut self, entry: &LedgerEntry) {
        self.debit += entry.debit;
        self.credit += entry.credit;
        self.balance = self.debit - self.credit;
        self.entry_count += 1;
    }
}

// ---------------------------------------------------------------------------
// Aggregates of a whole ledger
// ---------------------------------------------------------------------------

/// Per-root totals of a ledger at root lengths 1, 2 and 3.
///
/// Roots of different lengths never collide as strings ("6", "62", "627"),
/// so a single ordered map holds all three levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerAggregates {
    pub by_root: BTreeMap<String, AccountAggregate>,
    /// Entries whose account number could not be classified
    pub unclassified: AccountAggregate,
    /// Every entry, classified or not
    pub totals: AccountAggregate,
}

impl LedgerAggregates {
    /// Sum `entries` into root buckets. Does not interpret signs.
    pub fn aggregate<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a LedgerEntry>,
    {
        let mut aggregates = LedgerAggregates {
            by_root: BTreeMap::new(),
            unclassified: AccountAggregate::new("unclassified"),
            totals: AccountAggregate::new("total"),
        };
        for entry in entries {
            aggregates.add(entry);
        }
        debug!(
            roots = aggregates.by_root.len(),
            entries = aggregates.totals.entry_count,
            unclassified = aggregates.unclassified.entry_count,
            "ledger aggregated"
        );
        aggregates
    }

    fn add(&mut self, entry: &LedgerEntry) {
        self.totals.add(entry);
        match classify(&entry.account_number) {
            AccountClass::Classified(roots) => {
                for root in roots.all() {
                    self.by_root
                        .entry(root.to_string())
                        .or_insert_with(|| AccountAggregate::new(root))
                        .add(entry);
                }
            }
            AccountClass::Unclassified => self.unclassified.add(entry),
        }
    }

    pub fn get(&self, root: &str) -> Option<&AccountAggregate> {
        self.by_root.get(root)
    }

    /// Debit-minus-credit balance of `root`; zero when nothing was posted.
    pub fn balance(&self, root: &str) -> Money {
        self.get(root).map(|a| a.balance).unwrap_or(Decimal::ZERO)
    }

    pub fn sum<S: AsRef<str>>(&self, roots: &[S]) -> Money {
        roots.iter().map(|r| self.balance(r.as_ref())).sum()
    }

    pub fn bucket(&self, bucket: AccountBucket) -> Money {
        self.sum(bucket.roots())
    }

    /// Aggregates of the given root length, in root order.
    pub fn level(&self, len: usize) -> impl Iterator<Item = &AccountAggregate> {
        self.by_root.values().filter(move |a| a.root.len() == len)
    }

    /// Level-3 aggregates whose root starts with one of `prefixes`.
    pub fn roots3_under<'s>(
        &'s self,
        prefixes: &'s [&'s str],
    ) -> impl Iterator<Item = &'s AccountAggregate> + 's {
        self.level(3)
            .filter(move |a| prefixes.iter().any(|p| a.root.starts_with(p)))
    }

    /// Sum of all balances at one root length plus the unclassified bucket.
    /// Equals `totals.balance` for every level.
    pub fn reconciled_balance(&self, len: usize) -> Money {
        self.level(len).map(|a| a.balance).sum::<Decimal>() + self.unclassified.balance
    }

    pub fn is_empty(&self) -> bool {
        self.totals.entry_count == 0
    }
}
