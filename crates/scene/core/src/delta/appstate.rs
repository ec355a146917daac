//! Change object over the observed app-state projection.

use std::collections::BTreeMap;

use crate::appstate::ObservedAppState;
use crate::element::ElementId;

use super::Delta;

macro_rules! diff_fields {
    ($prev:expr, $next:expr, $from:ident, $to:ident, { $($field:ident),+ $(,)? }) => {
        $(
            if $prev.$field != $next.$field {
                $from.$field = Some($prev.$field.clone());
                $to.$field = Some($next.$field.clone());
            }
        )+
    };
}

macro_rules! merge_fields {
    ($partial:expr, $state:ident, { $($field:ident),+ $(,)? }) => {
        $(
            if let Some(value) = &$partial.$field {
                $state.$field = value.clone();
            }
        )+
    };
}

macro_rules! any_field_differs {
    ($partial:expr, $state:expr, { $($field:ident),+ $(,)? }) => {
        false $(
            || matches!(&$partial.$field, Some(value) if value != &$state.$field)
        )+
    };
}

/// Partial view of [`ObservedAppState`]: every watched field, optionally.
///
/// Fields that are themselves optional nest (`Option<Option<..>>`), so a
/// recorded `Some(None)` distinguishes "changed to unset" from "not part of
/// this change".
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppStatePartial {
    pub name: Option<String>,
    pub editing_group_id: Option<Option<String>>,
    pub view_background_color: Option<String>,
    pub selected_element_ids: Option<BTreeMap<ElementId, bool>>,
    pub selected_group_ids: Option<BTreeMap<String, bool>>,
    pub editing_linear_element: Option<Option<ElementId>>,
    pub selected_linear_element: Option<Option<ElementId>>,
}

macro_rules! with_observed_fields {
    ($macro:ident, $($args:tt)*) => {
        $macro!($($args)*, {
            name,
            editing_group_id,
            view_background_color,
            selected_element_ids,
            selected_group_ids,
            editing_linear_element,
            selected_linear_element,
        })
    };
}

impl AppStatePartial {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.editing_group_id.is_none()
            && self.view_background_color.is_none()
            && self.selected_element_ids.is_none()
            && self.selected_group_ids.is_none()
            && self.editing_linear_element.is_none()
            && self.selected_linear_element.is_none()
    }
}

/// One undoable step of the observed app state, wrapping a single delta.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppStateChange {
    delta: Delta<AppStatePartial>,
}

impl AppStateChange {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Field-by-field diff of two observed states.
    pub fn calculate(prev: &ObservedAppState, next: &ObservedAppState) -> Self {
        let mut from = AppStatePartial::default();
        let mut to = AppStatePartial::default();

        with_observed_fields!(diff_fields, prev, next, from, to);

        Self {
            delta: Delta::new(from, to),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            delta: self.delta.inverse(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.delta.from.is_empty() && self.delta.to.is_empty()
    }

    /// Shallow-merges the `to` half onto the state.
    ///
    /// The flag reports whether the merge changes anything against the
    /// current state, which may have drifted since capture.
    pub fn apply_to(&self, state: &ObservedAppState) -> (ObservedAppState, bool) {
        let visible = Self::contains_difference(&self.delta.to, state);

        let mut next = state.clone();
        with_observed_fields!(merge_fields, self.delta.to, next);

        (next, visible)
    }

    fn contains_difference(partial: &AppStatePartial, state: &ObservedAppState) -> bool {
        with_observed_fields!(any_field_differs, partial, state)
    }
}
