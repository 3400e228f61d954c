//! Frozen fare table shared by pricing calls.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{AgencyId, CurrencyCode, FareId};

use super::product::FareProduct;
use super::rule_set::{FareRuleSet, RideGroup};

/// A fare product together with the rules scoping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FareEntry {
    pub product: FareProduct,
    pub rules: FareRuleSet,
}

impl FareEntry {
    /// Create an entry with an empty (unrestricted) rule set.
    pub fn new(product: FareProduct) -> Self {
        Self {
            product,
            rules: FareRuleSet::new(),
        }
    }

    /// Whether the product may be used for the group.
    ///
    /// Checks agency scope, then (optionally) the transfer policy, then the
    /// rule set.
    pub fn applies_to(&self, group: &RideGroup<'_>, enforce_transfers: bool) -> bool {
        if let Some(agency) = &self.product.agency
            && group.single_agency() != Some(agency)
        {
            return false;
        }
        if enforce_transfers
            && !self
                .product
                .transfers
                .permits(group.transfer_count(), group.span())
        {
            return false;
        }
        self.rules.matches(group)
    }
}

/// Immutable fare table: every product and its rule set, plus an agency
/// index for candidate pruning.
///
/// Built once by [`FareTableBuilder`](super::FareTableBuilder) and never
/// mutated afterwards, so it can be shared across threads without locks.
#[derive(Debug, Clone, Default)]
pub struct FareSnapshot {
    entries: BTreeMap<FareId, FareEntry>,
    by_agency: BTreeMap<AgencyId, Vec<FareId>>,
    unscoped: Vec<FareId>,
    currencies: BTreeSet<CurrencyCode>,
}

impl FareSnapshot {
    /// A snapshot with no fare products. Prices nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_entries(entries: BTreeMap<FareId, FareEntry>) -> Self {
        let mut by_agency: BTreeMap<AgencyId, Vec<FareId>> = BTreeMap::new();
        let mut unscoped = Vec::new();
        let currencies = entries.values().map(|e| e.product.currency).collect();

        // BTreeMap iteration keeps each index list sorted by fare id
        for (id, entry) in &entries {
            match &entry.product.agency {
                Some(agency) => by_agency.entry(agency.clone()).or_default().push(id.clone()),
                None => unscoped.push(id.clone()),
            }
        }

        Self {
            entries,
            by_agency,
            unscoped,
            currencies,
        }
    }

    /// Number of fare products.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &FareId) -> Option<&FareEntry> {
        self.entries.get(id)
    }

    /// Every currency some product is priced in, in code order.
    pub fn currencies(&self) -> impl Iterator<Item = CurrencyCode> + '_ {
        self.currencies.iter().copied()
    }

    /// All entries in fare id order.
    pub fn entries(&self) -> impl Iterator<Item = &FareEntry> {
        self.entries.values()
    }

    /// Entries that could possibly apply to the group, in fare id order.
    ///
    /// Products scoped to an agency other than the group's are skipped;
    /// for a group spanning several agencies only unscoped products remain.
    /// Callers still check [`FareEntry::applies_to`]: this only prunes.
    pub fn candidates(&self, group: &RideGroup<'_>) -> Vec<&FareEntry> {
        let scoped = group
            .single_agency()
            .and_then(|agency| self.by_agency.get(agency))
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut ids: Vec<&FareId> = scoped.iter().chain(self.unscoped.iter()).collect();
        ids.sort_unstable();
        ids.into_iter()
            .filter_map(|id| self.entries.get(id))
            .collect()
    }
}
