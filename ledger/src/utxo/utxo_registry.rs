use super::{selection::SelectionPolicy, utxo_entry::Utxo};
use crate::amount::{Amount, AmountSum};
use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, hash_set};

pub type UtxoCollection = HashSet<Utxo>;

/// An unordered set of unique UTXOs.
///
/// Set algebra (`union`, `intersection`) builds new registries and never mutates either operand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UtxoRegistry {
    utxos: UtxoCollection,
}

impl UtxoRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_collection(utxos: UtxoCollection) -> Self {
        Self { utxos }
    }

    /// Inserts `utxo`. Adding a UTXO that is already held is a no-op.
    pub fn add(&mut self, utxo: Utxo) {
        trace!("Adding UTXO {utxo}");
        self.utxos.insert(utxo);
    }

    /// Removes `utxo`, returning whether it was held
    pub fn remove(&mut self, utxo: &Utxo) -> bool {
        let removed = self.utxos.remove(utxo);
        if removed {
            trace!("Removed UTXO {utxo}");
        } else {
            trace!("UTXO {utxo} not found");
        }
        removed
    }

    pub fn contains(&self, utxo: &Utxo) -> bool {
        self.utxos.contains(utxo)
    }

    /// The sum of all held amounts
    pub fn balance(&self) -> AmountSum {
        self.utxos.iter().map(|utxo| utxo.amount).sum()
    }

    pub fn count(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, Utxo> {
        self.utxos.iter()
    }

    /// Iterates the held UTXOs in [`Utxo::selection_order`]
    pub fn iter_selection_order(&self) -> impl Iterator<Item = &Utxo> + '_ {
        self.utxos.iter().sorted_by(|a, b| a.selection_order(b))
    }

    /// Selects UTXOs covering `target` using [`SelectionPolicy::Exhaustive`]: either every held
    /// UTXO is returned (when their total reaches `target`) or none is.
    pub fn select_for_target(&self, target: Amount) -> UtxoCollection {
        self.select_for_target_with(target, SelectionPolicy::Exhaustive)
    }

    pub fn select_for_target_with(&self, target: Amount, policy: SelectionPolicy) -> UtxoCollection {
        let target = AmountSum::from(target);
        let mut selected = UtxoCollection::new();
        let mut total: AmountSum = 0;

        for utxo in self.iter_selection_order() {
            if policy == SelectionPolicy::EarlyStop && total >= target {
                break;
            }
            total += AmountSum::from(utxo.amount);
            selected.insert(utxo.clone());
        }

        if total >= target {
            debug!("Selected {} of {} UTXOs totalling {total} for target {target} ({policy})", selected.len(), self.count());
            selected
        } else {
            debug!("Insufficient UTXOs for target {target}: registry holds {total} ({policy})");
            UtxoCollection::new()
        }
    }

    /// Returns true if every UTXO held here is also held by `other`
    pub fn is_subset_of(&self, other: &UtxoRegistry) -> bool {
        self.utxos.is_subset(&other.utxos)
    }

    /// Returns whether the two registries share at least one UTXO
    pub fn intersects(&self, other: &UtxoRegistry) -> bool {
        !self.utxos.is_disjoint(&other.utxos)
    }

    pub fn union(&self, other: &UtxoRegistry) -> UtxoRegistry {
        self.utxos.union(&other.utxos).cloned().collect()
    }

    pub fn intersection(&self, other: &UtxoRegistry) -> UtxoRegistry {
        self.utxos.intersection(&other.utxos).cloned().collect()
    }

    pub fn into_collection(self) -> UtxoCollection {
        self.utxos
    }
}

impl FromIterator<Utxo> for UtxoRegistry {
    fn from_iter<I: IntoIterator<Item = Utxo>>(iter: I) -> Self {
        Self { utxos: iter.into_iter().collect() }
    }
}

impl Extend<Utxo> for UtxoRegistry {
    fn extend<I: IntoIterator<Item = Utxo>>(&mut self, iter: I) {
        self.utxos.extend(iter)
    }
}

impl<'a> IntoIterator for &'a UtxoRegistry {
    type Item = &'a Utxo;
    type IntoIter = hash_set::Iter<'a, Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.iter()
    }
}

impl IntoIterator for UtxoRegistry {
    type Item = Utxo;
    type IntoIter = hash_set::IntoIter<Utxo>;

    fn into_iter(self) -> Self::IntoIter {
        self.utxos.into_iter()
    }
}
