//! Change object over the keyed scene collection.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::element::{DrawingElement, ElementId, ElementsMap};

use super::{DeltaSide, ElementDelta};

/// A transition of an [`ElementsMap`], expressed as per-id element deltas.
///
/// Empty deltas are never stored. The change is invertible (swap every
/// delta's halves) and applyable to any live map, including one that has
/// drifted since the change was captured.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementsChange {
    deltas: IndexMap<ElementId, ElementDelta>,
}

impl ElementsChange {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a change from explicit deltas, dropping empty ones.
    pub fn from_deltas(deltas: impl IntoIterator<Item = (ElementId, ElementDelta)>) -> Self {
        Self {
            deltas: deltas
                .into_iter()
                .filter(|(_, delta)| !delta.is_empty())
                .collect(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Number of elements touched by this change.
    #[inline]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn get(&self, id: &ElementId) -> Option<&ElementDelta> {
        self.deltas.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ElementId, &ElementDelta)> {
        self.deltas.iter()
    }

    /// Diffs two versions of the scene.
    ///
    /// Ids present only in `prev` become soft-deletion deltas; ids present
    /// only in `next` become additions; ids in both are diffed only when
    /// their `version_nonce` differs. Deltas that strip down to nothing are
    /// discarded.
    pub fn calculate(prev: &ElementsMap, next: &ElementsMap) -> Self {
        if std::ptr::eq(prev, next) {
            return Self::empty();
        }

        let mut deltas = IndexMap::new();

        for (id, prev_element) in prev.iter() {
            if !next.contains(id) {
                deltas.insert(id.clone(), ElementDelta::removed(prev_element));
            }
        }

        for (id, next_element) in next.iter() {
            match prev.get(id) {
                None => {
                    deltas.insert(id.clone(), ElementDelta::added(next_element));
                }
                Some(prev_element) => {
                    if Arc::ptr_eq(prev_element, next_element)
                        || prev_element.version_nonce == next_element.version_nonce
                    {
                        continue;
                    }
                    if let Some(delta) = ElementDelta::updated(prev_element, next_element) {
                        deltas.insert(id.clone(), delta);
                    }
                }
            }
        }

        Self { deltas }
    }

    /// Returns the change with every delta's halves swapped.
    pub fn inverse(&self) -> Self {
        Self {
            deltas: self
                .deltas
                .iter()
                .map(|(id, delta)| (id.clone(), delta.inverse()))
                .collect(),
        }
    }

    /// Applies every delta's `to` half to the live map.
    ///
    /// Existing targets are replaced in place, keeping identity and z-order;
    /// the map never loses a key. Targets missing from the live map are
    /// skipped, their effect deferred to a later replay. The flag reports
    /// whether anything user-visible changed: a soft-deletion toggle always
    /// counts, other property changes count only on currently-live elements.
    pub fn apply_to(&self, elements: &ElementsMap) -> (ElementsMap, bool) {
        let mut next = elements.clone();
        let mut visible = false;

        for (id, delta) in &self.deltas {
            let Some(existing) = elements.get(id) else {
                continue;
            };

            let toggles_deletion =
                matches!(delta.to.is_deleted, Some(flag) if flag != existing.is_deleted);
            if toggles_deletion {
                visible = true;
            } else if !existing.is_deleted
                && ElementDelta::contains_difference(&delta.to, existing)
            {
                visible = true;
            }

            next.insert(Arc::new(delta.to.merge_into(existing)));
        }

        (next, visible)
    }

    /// Rebases the chosen half of every delta onto current live values.
    ///
    /// A stored delta goes stale the moment a collaborator commits a change:
    /// its captured values no longer describe the live scene. Refreshing one
    /// half from the live map (same keys, current values) keeps the pairing
    /// correct when the change later lands on the opposite stack. Deltas
    /// whose target is not in the live map are kept as captured.
    pub fn apply_latest_changes(&self, elements: &ElementsMap, side: DeltaSide) -> Self {
        let mut deltas = IndexMap::with_capacity(self.deltas.len());

        for (id, delta) in &self.deltas {
            let rebased = match elements.get(id) {
                Some(element) => delta.rebased(element, side),
                None => delta.clone(),
            };
            deltas.insert(id.clone(), rebased);
        }

        Self { deltas }
    }
}
