use super::{
    selection::SelectionPolicy,
    utxo_entry::Utxo,
    utxo_registry::{UtxoCollection, UtxoRegistry},
};
use crate::amount::{Amount, AmountSum};
use parking_lot::RwLock;
use std::sync::Arc;

/// A [`UtxoRegistry`] shared between threads.
///
/// Mutations take the write lock, queries share the read lock. Clones refer to the same registry.
#[derive(Clone, Debug, Default)]
pub struct SharedUtxoRegistry {
    inner: Arc<RwLock<UtxoRegistry>>,
}

impl SharedUtxoRegistry {
    pub fn new(registry: UtxoRegistry) -> Self {
        Self { inner: Arc::new(RwLock::new(registry)) }
    }

    pub fn add(&self, utxo: Utxo) {
        self.inner.write().add(utxo)
    }

    pub fn remove(&self, utxo: &Utxo) -> bool {
        self.inner.write().remove(utxo)
    }

    /// Adds every UTXO of `other` under a single write lock
    pub fn union_from(&self, other: &UtxoRegistry) {
        self.inner.write().extend(other.iter().cloned())
    }

    pub fn balance(&self) -> AmountSum {
        self.inner.read().balance()
    }

    pub fn count(&self) -> usize {
        self.inner.read().count()
    }

    pub fn is_subset_of(&self, other: &UtxoRegistry) -> bool {
        self.inner.read().is_subset_of(other)
    }

    pub fn select_for_target(&self, target: Amount) -> UtxoCollection {
        self.inner.read().select_for_target(target)
    }

    pub fn select_for_target_with(&self, target: Amount, policy: SelectionPolicy) -> UtxoCollection {
        self.inner.read().select_for_target_with(target, policy)
    }

    /// A point-in-time copy of the registry
    pub fn snapshot(&self) -> UtxoRegistry {
        self.inner.read().clone()
    }
}

impl From<UtxoRegistry> for SharedUtxoRegistry {
    fn from(registry: UtxoRegistry) -> Self {
        Self::new(registry)
    }
}
