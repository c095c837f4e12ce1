//! Per-timeslot value timeline
//!
//! Both the layout cache and the cluster cache keep one value per
//! [`LayoutKey`] and share the same rules:
//!
//! - an **explicit** entry is written by a user action (save, reset, move);
//! - an **inherited** entry is a copy made by closest-prior fallback or by
//!   forward propagation, and always mirrors its closest prior explicit entry
//!   (or the base configuration when there is none);
//! - an explicit write propagates forward through the inherited entries of the
//!   same category and stops at the first later explicit entry.
//!
//! Keys order by category first, so one category is one contiguous range.

use std::collections::BTreeMap;
use std::ops::Bound;

use serde::{Deserialize, Serialize};
use shared::models::LayoutKey;

/// Where a timeline entry's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Provenance {
    Explicit,
    /// Copied from the explicit entry at `from`, or from the base when `None`
    Inherited { from: Option<LayoutKey> },
}

impl Provenance {
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    pub value: V,
    pub provenance: Provenance,
}

impl<V> Entry<V> {
    /// Explicit key this entry mirrors (itself when explicit)
    pub fn source(&self, key: LayoutKey) -> Option<LayoutKey> {
        match self.provenance {
            Provenance::Explicit => Some(key),
            Provenance::Inherited { from } => from,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timeline<V> {
    entries: BTreeMap<LayoutKey, Entry<V>>,
}

impl<V> Default for Timeline<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: Clone> Timeline<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &LayoutKey) -> Option<&Entry<V>> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &LayoutKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Latest entry strictly before `key` in the same category
    pub fn closest_prior(&self, key: &LayoutKey) -> Option<(LayoutKey, &Entry<V>)> {
        self.entries
            .range(LayoutKey::first_of(key.category)..*key)
            .next_back()
            .map(|(k, e)| (*k, e))
    }

    /// Copy the closest prior entry into `key` as inherited
    ///
    /// Returns the prior key that was copied, `None` when there is none.
    pub fn inherit_from_prior(
        &mut self,
        key: LayoutKey,
        retarget: impl Fn(&V, LayoutKey) -> V,
    ) -> Option<LayoutKey> {
        let (prior_key, prior) = self.closest_prior(&key)?;
        let entry = Entry {
            value: retarget(&prior.value, key),
            provenance: Provenance::Inherited {
                from: prior.source(prior_key),
            },
        };
        self.entries.insert(key, entry);
        Some(prior_key)
    }

    pub fn insert_inherited(&mut self, key: LayoutKey, value: V, from: Option<LayoutKey>) {
        self.entries.insert(
            key,
            Entry {
                value,
                provenance: Provenance::Inherited { from },
            },
        );
    }

    /// Write `value` at `key` as explicit and propagate it forward
    ///
    /// Returns the later keys that received the value.
    pub fn write_explicit(
        &mut self,
        key: LayoutKey,
        value: V,
        retarget: impl Fn(&V, LayoutKey) -> V,
    ) -> Vec<LayoutKey> {
        let mut propagated = Vec::new();
        let later = (
            Bound::Excluded(key),
            Bound::Included(LayoutKey::last_of(key.category)),
        );
        for (k, entry) in self.entries.range_mut(later) {
            if entry.provenance.is_explicit() {
                break;
            }
            entry.value = retarget(&value, *k);
            entry.provenance = Provenance::Inherited { from: Some(key) };
            propagated.push(*k);
        }

        self.entries.insert(
            key,
            Entry {
                value,
                provenance: Provenance::Explicit,
            },
        );
        propagated
    }

    pub fn remove(&mut self, key: &LayoutKey) -> Option<Entry<V>> {
        self.entries.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LayoutKey, &Entry<V>)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &LayoutKey> {
        self.entries.keys()
    }

    /// Replace every entry
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (LayoutKey, Entry<V>)>) {
        self.entries = entries.into_iter().collect();
    }
}
