//! Change tracking
//!
//! The discovery engine only sees trackers through [`ChangeTracker`]. A
//! tracker owns the comparison baseline; each `discover_changes` call
//! advances it and returns what changed since the previous call.
//!
//! [`TriggerContextTracker`] is an in-memory tracker keyed by entity id,
//! comparing current entity states against the last accepted states.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::errors::{Result, TriggerError};

/// Source of change descriptors for the discovery engine
pub trait ChangeTracker {
    /// Token for one changed entity. Routed, never inspected.
    type Descriptor: Clone + Eq + Hash + fmt::Debug;

    /// Whether any discovery has run since the baseline was last reset
    fn has_discovered_changes(&self) -> bool;

    /// Every change discovered since the baseline was last reset
    ///
    /// # Errors
    ///
    /// Returns `TriggerError::DiscoveryNotStarted` if no discovery has run.
    fn discovered_changes(&self) -> Result<ChangeBatch<Self::Descriptor>>;

    /// Compare current state against the baseline and return only changes
    /// not reported by an earlier call
    fn discover_changes(&mut self) -> ChangeBatch<Self::Descriptor>;
}

/// Duplicate-free collection of descriptors from one discovery attempt
///
/// Keeps the order the tracker produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeBatch<D>(Vec<D>);

impl<D> ChangeBatch<D> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, D> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[D] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<D> {
        self.0
    }
}

impl<D> Default for ChangeBatch<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> From<Vec<D>> for ChangeBatch<D> {
    fn from(changes: Vec<D>) -> Self {
        Self(changes)
    }
}

impl<D> FromIterator<D> for ChangeBatch<D> {
    fn from_iter<I: IntoIterator<Item = D>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<D> IntoIterator for ChangeBatch<D> {
    type Item = D;
    type IntoIter = std::vec::IntoIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, D> IntoIterator for &'a ChangeBatch<D> {
    type Item = &'a D;
    type IntoIter = std::slice::Iter<'a, D>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Kind of state change relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

/// One entity whose state changed, as reported by [`TriggerContextTracker`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerContextDescriptor<K> {
    pub entity_key: K,
    pub change_type: ChangeType,
}

impl<K> TriggerContextDescriptor<K> {
    pub fn new(entity_key: K, change_type: ChangeType) -> Self {
        Self {
            entity_key,
            change_type,
        }
    }
}

/// In-memory change tracker
///
/// Entities are held as `key -> state`. The baseline is the state as of the
/// last [`accept_all_changes`](Self::accept_all_changes) (or as attached).
/// An entity is reported again only if its change type differs from every
/// earlier report, so a modified entity that is modified again stays a
/// single `Modified` descriptor until the baseline moves.
#[derive(Debug, Clone)]
pub struct TriggerContextTracker<K, S> {
    current: BTreeMap<K, S>,
    baseline: BTreeMap<K, S>,
    discovered: Option<Vec<TriggerContextDescriptor<K>>>,
    reported: HashSet<TriggerContextDescriptor<K>>,
}

impl<K, S> TriggerContextTracker<K, S>
where
    K: Ord + Hash + Clone,
    S: PartialEq + Clone,
{
    pub fn new() -> Self {
        Self {
            current: BTreeMap::new(),
            baseline: BTreeMap::new(),
            discovered: None,
            reported: HashSet::new(),
        }
    }

    /// Start tracking an entity as unchanged
    pub fn attach(&mut self, key: K, state: S) {
        self.baseline.insert(key.clone(), state.clone());
        self.current.insert(key, state);
    }

    /// Insert or replace an entity's current state, returning the previous one
    pub fn upsert(&mut self, key: K, state: S) -> Option<S> {
        self.current.insert(key, state)
    }

    /// Remove an entity from the current state, returning it
    pub fn remove(&mut self, key: &K) -> Option<S> {
        self.current.remove(key)
    }

    pub fn state(&self, key: &K) -> Option<&S> {
        self.current.get(key)
    }

    pub fn entity_count(&self) -> usize {
        self.current.len()
    }

    /// Make the current state the new baseline and forget all discoveries
    pub fn accept_all_changes(&mut self) {
        self.baseline = self.current.clone();
        self.discovered = None;
        self.reported.clear();
    }

    fn compare(&self) -> Vec<TriggerContextDescriptor<K>> {
        let mut changes = Vec::new();

        for (key, state) in &self.current {
            let change_type = match self.baseline.get(key) {
                None => Some(ChangeType::Added),
                Some(original) if original != state => Some(ChangeType::Modified),
                Some(_) => None,
            };
            if let Some(change_type) = change_type {
                changes.push(TriggerContextDescriptor::new(key.clone(), change_type));
            }
        }

        for key in self.baseline.keys() {
            if !self.current.contains_key(key) {
                changes.push(TriggerContextDescriptor::new(
                    key.clone(),
                    ChangeType::Deleted,
                ));
            }
        }

        changes
    }
}

impl<K, S> Default for TriggerContextTracker<K, S>
where
    K: Ord + Hash + Clone,
    S: PartialEq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, S> ChangeTracker for TriggerContextTracker<K, S>
where
    K: Ord + Hash + Clone + fmt::Debug,
    S: PartialEq + Clone,
{
    type Descriptor = TriggerContextDescriptor<K>;

    fn has_discovered_changes(&self) -> bool {
        self.discovered.is_some()
    }

    fn discovered_changes(&self) -> Result<ChangeBatch<Self::Descriptor>> {
        self.discovered
            .as_ref()
            .map(|changes| ChangeBatch::from(changes.clone()))
            .ok_or(TriggerError::DiscoveryNotStarted)
    }

    fn discover_changes(&mut self) -> ChangeBatch<Self::Descriptor> {
        let fresh: Vec<_> = self
            .compare()
            .into_iter()
            .filter(|change| !self.reported.contains(change))
            .collect();

        self.reported.extend(fresh.iter().cloned());
        self.discovered
            .get_or_insert_with(Vec::new)
            .extend(fresh.iter().cloned());

        tracing::trace!(changes = fresh.len(), "compared tracked entities");
        ChangeBatch::from(fresh)
    }
}
