//! Insertion-ordered scene map.
//!
//! The scene is a mapping from element id to element whose iteration order
//! is the z-order. Elements are shared by `Arc` so that snapshots and
//! applied maps reuse unchanged elements by pointer instead of deep-copying
//! the whole scene on every transition.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{DrawingElement, ElementId};

/// Ordered mapping from element id to element, shared structurally.
///
/// Insertion order is significant (z-order) and preserved by every operation
/// in the crate. Overwriting an existing id keeps its position; new ids are
/// appended. There is deliberately no removal operation: deletion is a flip
/// of [`DrawingElement::is_deleted`].
#[derive(Clone, Debug, Default)]
pub struct ElementsMap {
    inner: IndexMap<ElementId, Arc<DrawingElement>>,
}

impl ElementsMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from elements in the given z-order.
    pub fn from_elements(elements: impl IntoIterator<Item = DrawingElement>) -> Self {
        let mut map = Self::new();
        for element in elements {
            map.insert(Arc::new(element));
        }
        map
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.inner.contains_key(id)
    }

    pub fn get(&self, id: &ElementId) -> Option<&Arc<DrawingElement>> {
        self.inner.get(id)
    }

    /// Inserts an element under its own id.
    ///
    /// An existing id keeps its z-position; a new id lands on top.
    pub fn insert(&mut self, element: Arc<DrawingElement>) -> Option<Arc<DrawingElement>> {
        self.inner.insert(element.id.clone(), element)
    }

    /// Iterates entries in z-order, bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&ElementId, &Arc<DrawingElement>)> {
        self.inner.iter()
    }

    /// Iterates elements in z-order, bottom to top.
    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Arc<DrawingElement>> {
        self.inner.values()
    }

    /// Iterates ids in z-order, bottom to top.
    pub fn ids(&self) -> impl DoubleEndedIterator<Item = &ElementId> {
        self.inner.keys()
    }
}

// IndexMap equality ignores order; z-order is part of scene identity, so
// compare entries pairwise in iteration order.
impl PartialEq for ElementsMap {
    fn eq(&self, other: &Self) -> bool {
        self.inner.len() == other.inner.len()
            && self
                .inner
                .iter()
                .zip(other.inner.iter())
                .all(|((id_a, el_a), (id_b, el_b))| id_a == id_b && el_a == el_b)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ElementsMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.inner.values().map(|element| element.as_ref()))
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ElementsMap {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let elements = Vec::<DrawingElement>::deserialize(deserializer)?;
        Ok(Self::from_elements(elements))
    }
}
