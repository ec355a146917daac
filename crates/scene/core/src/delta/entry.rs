//! One undoable step.

use crate::appstate::ObservedAppState;
use crate::element::ElementsMap;

use super::{AppStateChange, DeltaSide, ElementsChange};

/// Pair of an app-state change and an elements change representing one
/// undoable user step.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub app_state_change: AppStateChange,
    pub elements_change: ElementsChange,
}

impl HistoryEntry {
    pub fn new(app_state_change: AppStateChange, elements_change: ElementsChange) -> Self {
        Self {
            app_state_change,
            elements_change,
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            app_state_change: self.app_state_change.inverse(),
            elements_change: self.elements_change.inverse(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.app_state_change.is_empty() && self.elements_change.is_empty()
    }

    /// Applies both children, returning each `(value, visible)` pair for the
    /// host to commit.
    pub fn apply_to(
        &self,
        elements: &ElementsMap,
        app_state: &ObservedAppState,
    ) -> ((ElementsMap, bool), (ObservedAppState, bool)) {
        (
            self.elements_change.apply_to(elements),
            self.app_state_change.apply_to(app_state),
        )
    }

    /// Rebases the elements side onto the live scene; the app-state change
    /// passes through unchanged.
    pub fn apply_latest_changes(&self, elements: &ElementsMap) -> Self {
        Self {
            app_state_change: self.app_state_change.clone(),
            elements_change: self
                .elements_change
                .apply_latest_changes(elements, DeltaSide::To),
        }
    }
}
