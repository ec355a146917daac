//! Drawing element data model.
//!
//! A [`DrawingElement`] is an opaque record identified by a stable
//! [`ElementId`]. The core never interprets the payload; it only diffs it.
//! Elements are treated as immutable by convention: hosts reallocate on
//! change and bump `version_nonce`, which the diff layer uses as a cheap
//! equality tag.

pub mod map;
pub mod props;

use std::fmt;

pub use map::ElementsMap;
pub use props::{IRRELEVANT_PROPS, PropValue, Props, clear_irrelevant_props};

/// Stable identity of a drawing element.
///
/// Ids are host-assigned and never reused. The core treats them as opaque
/// ordering-free tokens; iteration order of the surrounding map carries the
/// z-order, not the id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(String);

impl ElementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// A single element of the drawing.
///
/// The typed fields are bookkeeping the host maintains; everything the user
/// perceives (geometry, style, text, ...) lives in `props`. `version`,
/// `version_nonce`, `updated` and `seed` are the irrelevant counters: they
/// participate in change detection short-circuits but never in deltas.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawingElement {
    /// Stable identity key.
    pub id: ElementId,
    /// Monotonic edit counter maintained by the host.
    pub version: u64,
    /// Host-assigned tag changed on every observable mutation.
    ///
    /// An equality tag, not an ordering.
    pub version_nonce: u64,
    /// Wall-clock of the last mutation, host-maintained.
    pub updated: u64,
    /// Rendering randomness seed.
    pub seed: u64,
    /// Soft-deletion flag. Elements are never removed from the scene map.
    pub is_deleted: bool,
    /// Arbitrary payload treated as a flat key-value mapping.
    pub props: Props,
}

impl DrawingElement {
    /// Starts building an element with the given id.
    pub fn builder(id: impl Into<ElementId>) -> DrawingElementBuilder {
        DrawingElementBuilder::new(id.into())
    }

    /// Returns the payload with bookkeeping keys stripped.
    ///
    /// This is the observable surface a delta may reference.
    pub fn payload(&self) -> Props {
        let mut payload = self.props.clone();
        clear_irrelevant_props(&mut payload);
        payload
    }

    /// Looks up a payload value by key.
    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }
}

/// Builder for [`DrawingElement`], mainly a fixture surface for hosts and
/// tests.
#[derive(Clone, Debug)]
pub struct DrawingElementBuilder {
    id: ElementId,
    version: u64,
    version_nonce: u64,
    updated: u64,
    seed: u64,
    is_deleted: bool,
    props: Props,
}

impl DrawingElementBuilder {
    fn new(id: ElementId) -> Self {
        Self {
            id,
            version: 1,
            version_nonce: 1,
            updated: 0,
            seed: 0,
            is_deleted: false,
            props: Props::new(),
        }
    }

    #[must_use]
    pub fn version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn version_nonce(mut self, version_nonce: u64) -> Self {
        self.version_nonce = version_nonce;
        self
    }

    #[must_use]
    pub fn updated(mut self, updated: u64) -> Self {
        self.updated = updated;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn deleted(mut self, is_deleted: bool) -> Self {
        self.is_deleted = is_deleted;
        self
    }

    /// Sets a single payload key.
    #[must_use]
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Replaces the whole payload mapping.
    #[must_use]
    pub fn props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }

    pub fn build(self) -> DrawingElement {
        DrawingElement {
            id: self.id,
            version: self.version,
            version_nonce: self.version_nonce,
            updated: self.updated,
            seed: self.seed,
            is_deleted: self.is_deleted,
            props: self.props,
        }
    }
}
