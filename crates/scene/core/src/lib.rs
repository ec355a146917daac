//! Scene data model and change algebra for the drawing editor history core.
//!
//! `scene-core` defines the canonical element and app-state types together
//! with the pure delta algebra over them: what changed between two versions
//! of the scene, how to invert that change, and how to apply or rebase it
//! against a scene that has drifted since capture. All orchestration (when
//! to observe, what to record) lives in the `history` crate; nothing here
//! performs I/O or holds interior mutability.
pub mod appstate;
pub mod delta;
pub mod element;

pub use appstate::ObservedAppState;
pub use delta::{
    AppStateChange, AppStatePartial, Delta, DeltaSide, ElementDelta, ElementPartial,
    ElementsChange, HistoryEntry,
};
pub use element::{
    DrawingElement, DrawingElementBuilder, ElementId, ElementsMap, IRRELEVANT_PROPS, PropValue,
    Props, clear_irrelevant_props,
};
