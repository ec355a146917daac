//! Observed projection of the editor state.
//!
//! Only the fields enumerated here participate in history. Everything else
//! the editor tracks (tool mode, zoom, cursor, scroll, ...) is deliberately
//! invisible to the undo machinery.

use std::collections::BTreeMap;

use crate::element::ElementId;

/// The fixed subset of editor state the history core watches.
///
/// Comparison is structural; the two selection maps are plain ordered maps
/// so equality already behaves as a per-entry comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedAppState {
    /// Display name of the drawing.
    pub name: String,
    /// Group currently being edited, if any.
    pub editing_group_id: Option<String>,
    /// Canvas background color.
    pub view_background_color: String,
    /// Selected element ids. Values are always `true`; the map shape mirrors
    /// the host editor's selection model.
    pub selected_element_ids: BTreeMap<ElementId, bool>,
    /// Selected group ids.
    pub selected_group_ids: BTreeMap<String, bool>,
    /// Linear element currently being point-edited, if any.
    pub editing_linear_element: Option<ElementId>,
    /// Linear element currently selected for point manipulation, if any.
    pub selected_linear_element: Option<ElementId>,
}

impl Default for ObservedAppState {
    fn default() -> Self {
        Self {
            name: String::new(),
            editing_group_id: None,
            view_background_color: "#ffffff".to_owned(),
            selected_element_ids: BTreeMap::new(),
            selected_group_ids: BTreeMap::new(),
            editing_linear_element: None,
            selected_linear_element: None,
        }
    }
}

impl ObservedAppState {
    /// Convenience for selecting a set of elements, replacing the current
    /// selection.
    pub fn with_selected_elements<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ElementId>,
    {
        self.selected_element_ids = ids.into_iter().map(|id| (id.into(), true)).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_has_blank_canvas() {
        let state = ObservedAppState::default();
        assert_eq!(state.view_background_color, "#ffffff");
        assert!(state.selected_element_ids.is_empty());
    }

    #[test]
    fn selection_helper_replaces_previous_selection() {
        let state = ObservedAppState::default()
            .with_selected_elements(["a"])
            .with_selected_elements(["b", "c"]);

        assert_eq!(state.selected_element_ids.len(), 2);
        assert!(state.selected_element_ids.contains_key(&"b".into()));
    }
}
