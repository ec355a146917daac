//! Undo/redo stacks over store increments.

use tracing::{debug, trace};

use scene_core::{AppStateChange, ElementsChange, ElementsMap, HistoryEntry};

/// Forward and backward stacks of undoable steps.
///
/// Entries store the *inverse* of the recorded transition, so undo is "pop
/// and apply". Between recording and replay the scene may drift under
/// concurrent collaboration; popped entries are therefore rebased against
/// the live scene before the opposite entry lands on the other stack.
#[derive(Default)]
pub struct History {
    undo_stack: Vec<HistoryEntry>,
    redo_stack: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_undo_stack_empty(&self) -> bool {
        self.undo_stack.is_empty()
    }

    #[inline]
    pub fn is_redo_stack_empty(&self) -> bool {
        self.redo_stack.is_empty()
    }

    /// Stack depths, for host debug overlays.
    pub fn depths(&self) -> (usize, usize) {
        (self.undo_stack.len(), self.redo_stack.len())
    }

    /// Records one emitted transition as an undoable step.
    ///
    /// The stored entry is the inverse of the transition: applying it rolls
    /// the editor back. A non-empty record invalidates the redoable future;
    /// an empty one is ignored outright and leaves the redo stack intact.
    pub fn record(&mut self, elements_change: &ElementsChange, app_state_change: &AppStateChange) {
        let entry = HistoryEntry::new(app_state_change.inverse(), elements_change.inverse());
        if entry.is_empty() {
            trace!("skipping empty history entry");
            return;
        }

        self.undo_stack.push(entry);
        self.redo_stack.clear();
        debug!(undo_depth = self.undo_stack.len(), "recorded history entry");
    }

    /// Pops one undoable step, parking its rebased opposite on the redo
    /// stack. Returns `None` when there is nothing to undo.
    ///
    /// The returned entry is for the caller to apply; its `to` halves match
    /// the captured pre-transition state property by property.
    pub fn undo_once(&mut self, live_elements: &ElementsMap) -> Option<HistoryEntry> {
        Self::step(&mut self.undo_stack, &mut self.redo_stack, live_elements)
    }

    /// Symmetric counterpart of [`History::undo_once`].
    pub fn redo_once(&mut self, live_elements: &ElementsMap) -> Option<HistoryEntry> {
        Self::step(&mut self.redo_stack, &mut self.undo_stack, live_elements)
    }

    /// Moves one entry from `source` to `target`, inverted and rebased.
    ///
    /// The rebase refreshes the `to` half of every element delta from the
    /// live scene, so replaying the parked entry later will not overwrite
    /// concurrent collaborator edits with stale captured values.
    fn step(
        source: &mut Vec<HistoryEntry>,
        target: &mut Vec<HistoryEntry>,
        live_elements: &ElementsMap,
    ) -> Option<HistoryEntry> {
        let entry = source.pop()?;
        target.push(entry.inverse().apply_latest_changes(live_elements));
        Some(entry)
    }

    /// Empties both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
