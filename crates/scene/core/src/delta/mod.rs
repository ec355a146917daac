//! Change algebra over the observed editor state.
//!
//! A [`Delta`] is a `(from, to)` pair of partial records describing one
//! property-level change. Change objects bundle deltas into invertible,
//! applyable units: [`ElementsChange`] over the keyed scene collection,
//! [`AppStateChange`] over the observed app-state projection, and
//! [`HistoryEntry`] pairing the two into one undoable step.
//!
//! All values here are created once and never mutated; `inverse` and the
//! rebase operations return fresh values.

mod appstate;
mod element;
mod elements;
mod entry;

pub use appstate::{AppStateChange, AppStatePartial};
pub use element::{ElementDelta, ElementPartial};
pub use elements::ElementsChange;
pub use entry::HistoryEntry;

/// Which half of a delta an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DeltaSide {
    From,
    To,
}

/// A `(from, to)` pair of partial records over the same shape.
///
/// `from` holds the prior values of the changed keys, `to` the new ones.
/// For deltas produced by a diff the two halves reference the same key set
/// and differ on every key; constructed deltas (element add/remove) are
/// allowed to be asymmetric.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Delta<P> {
    pub from: P,
    pub to: P,
}

impl<P> Delta<P> {
    pub fn new(from: P, to: P) -> Self {
        Self { from, to }
    }

    /// Borrows the requested half.
    pub fn side(&self, side: DeltaSide) -> &P {
        match side {
            DeltaSide::From => &self.from,
            DeltaSide::To => &self.to,
        }
    }
}

impl<P: Clone> Delta<P> {
    /// Returns the delta with the two halves swapped.
    pub fn inverse(&self) -> Self {
        Self {
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_twice_is_identity() {
        let delta = Delta::new(1, 2);
        assert_eq!(delta.inverse().inverse(), delta);
    }

    #[test]
    fn side_selects_the_requested_half() {
        let delta = Delta::new("before", "after");
        assert_eq!(*delta.side(DeltaSide::From), "before");
        assert_eq!(*delta.side(DeltaSide::To), "after");
    }
}
