//! Per-element deltas.
//!
//! Add, remove and update are one shape: a pair of partial property
//! mappings. Adding an element is a flip of `is_deleted` from `true` to
//! `false` carrying the payload; removal is the mirror image. This keeps
//! inverses mechanical and lets concurrent edits touching different
//! properties of the same element compose.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::element::{DrawingElement, PropValue, Props, clear_irrelevant_props};

use super::{Delta, DeltaSide};

/// Partial view of a drawing element: the soft-deletion flag plus any subset
/// of payload keys.
///
/// A `PropValue::Null` entry records that the key was absent on that side of
/// the transition; merging a `Null` removes the key again.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementPartial {
    pub is_deleted: Option<bool>,
    pub props: Props,
}

impl ElementPartial {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.is_deleted.is_none() && self.props.is_empty()
    }

    /// Produces a new element with this partial merged on top.
    ///
    /// Identity and bookkeeping counters of the base element are preserved;
    /// the host owns nonce discipline for elements it commits.
    pub fn merge_into(&self, element: &DrawingElement) -> DrawingElement {
        let mut next = element.clone();
        if let Some(is_deleted) = self.is_deleted {
            next.is_deleted = is_deleted;
        }
        for (key, value) in &self.props {
            if value.is_null() {
                next.props.remove(key);
            } else {
                next.props.insert(key.clone(), value.clone());
            }
        }
        next
    }
}

/// Property-level change of a single element.
pub type ElementDelta = Delta<ElementPartial>;

impl Delta<ElementPartial> {
    /// Delta introducing an element: a resurrection flip carrying the
    /// payload.
    pub fn added(element: &DrawingElement) -> Self {
        Self::new(
            ElementPartial {
                is_deleted: Some(true),
                props: Props::new(),
            },
            ElementPartial {
                is_deleted: Some(false),
                props: element.payload(),
            },
        )
    }

    /// Delta soft-deleting an element, retaining the payload on the `from`
    /// side so the inverse can restore it.
    pub fn removed(element: &DrawingElement) -> Self {
        Self::new(
            ElementPartial {
                is_deleted: Some(false),
                props: element.payload(),
            },
            ElementPartial {
                is_deleted: Some(true),
                props: Props::new(),
            },
        )
    }

    /// Symmetric diff of two versions of the same element.
    ///
    /// Walks the union of payload keys, records both sides wherever values
    /// differ, then strips bookkeeping keys. Returns `None` when the
    /// stripped delta is empty.
    pub fn updated(prev: &DrawingElement, next: &DrawingElement) -> Option<Self> {
        debug_assert_eq!(
            prev.id, next.id,
            "Cannot diff elements with different ids"
        );

        let mut from = ElementPartial::default();
        let mut to = ElementPartial::default();

        if prev.is_deleted != next.is_deleted {
            from.is_deleted = Some(prev.is_deleted);
            to.is_deleted = Some(next.is_deleted);
        }

        let keys: BTreeSet<&String> = prev.props.keys().chain(next.props.keys()).collect();
        for key in keys {
            let before = prev.props.get(key);
            let after = next.props.get(key);
            if before != after {
                from.props.insert(
                    key.clone(),
                    before.cloned().unwrap_or(PropValue::Null),
                );
                to.props
                    .insert(key.clone(), after.cloned().unwrap_or(PropValue::Null));
            }
        }

        clear_irrelevant_props(&mut from.props);
        clear_irrelevant_props(&mut to.props);

        if from.is_empty() && to.is_empty() {
            None
        } else {
            Some(Self::new(from, to))
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.to.is_empty()
    }

    /// Whether applying `partial` to `element` would change anything the
    /// user can observe.
    ///
    /// The element may have drifted since the delta was captured, so this is
    /// evaluated against current values, not against the delta's own `from`
    /// half.
    pub fn contains_difference(partial: &ElementPartial, element: &DrawingElement) -> bool {
        if let Some(is_deleted) = partial.is_deleted
            && is_deleted != element.is_deleted
        {
            return true;
        }

        partial.props.iter().any(|(key, value)| match element.props.get(key) {
            Some(current) => value != current,
            None => !value.is_null(),
        })
    }

    /// Rebuilds the chosen half from the element's current values, keeping
    /// the same key set and leaving the other half untouched.
    pub(super) fn rebased(&self, element: &Arc<DrawingElement>, side: DeltaSide) -> Self {
        let stale = self.side(side);

        let mut refreshed = ElementPartial::default();
        if stale.is_deleted.is_some() {
            refreshed.is_deleted = Some(element.is_deleted);
        }
        for key in stale.props.keys() {
            refreshed.props.insert(
                key.clone(),
                element.props.get(key).cloned().unwrap_or(PropValue::Null),
            );
        }

        match side {
            DeltaSide::From => Self::new(refreshed, self.to.clone()),
            DeltaSide::To => Self::new(self.from.clone(), refreshed),
        }
    }
}
