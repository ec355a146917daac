//! Memoized last-observed editor state.
//!
//! The snapshot is the diff anchor: every accepted capture compares the
//! incoming scene against it and replaces it. Elements are shared
//! structurally between consecutive snapshots; only elements whose
//! `version_nonce` moved are deep-copied.

use std::sync::Arc;

use bitflags::bitflags;

use scene_core::{ElementId, ElementsMap, ObservedAppState};

bitflags! {
    /// Records what moved relative to the predecessor snapshot.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct SnapshotFlags: u8 {
        const DID_ELEMENTS_CHANGE  = 1 << 0;
        const DID_APP_STATE_CHANGE = 1 << 1;
    }
}

/// Per-capture context supplied by the host.
#[derive(Clone, Debug, Default)]
pub struct CaptureOptions {
    /// Host-advanced tag covering the whole scene; equality short-circuit
    /// for element change detection.
    pub scene_version_nonce: Option<u64>,
    /// The capture carries a collaborator's changes rather than local ones.
    pub is_remote_update: bool,
    /// Element the local user is mid-edit on, if any.
    pub editing_element_id: Option<ElementId>,
}

/// Immutable observation of the scene and the watched app-state fields.
#[derive(Clone, Debug)]
pub struct Snapshot {
    elements: ElementsMap,
    app_state: ObservedAppState,
    flags: SnapshotFlags,
    scene_version_nonce: Option<u64>,
    /// Whether this snapshot descends from an actual observation, as opposed
    /// to being the fresh empty anchor.
    observed: bool,
}

impl Snapshot {
    /// The empty scene: identity anchor of a fresh store.
    pub fn empty() -> Self {
        Self {
            elements: ElementsMap::new(),
            app_state: ObservedAppState::default(),
            flags: SnapshotFlags::empty(),
            scene_version_nonce: None,
            observed: false,
        }
    }

    pub fn elements(&self) -> &ElementsMap {
        &self.elements
    }

    pub fn app_state(&self) -> &ObservedAppState {
        &self.app_state
    }

    #[inline]
    pub fn did_elements_change(&self) -> bool {
        self.flags.contains(SnapshotFlags::DID_ELEMENTS_CHANGE)
    }

    #[inline]
    pub fn did_app_state_change(&self) -> bool {
        self.flags.contains(SnapshotFlags::DID_APP_STATE_CHANGE)
    }

    /// Observes the next editor state.
    ///
    /// Returns `None` when nothing the core watches has moved, so the store
    /// keeps the very same snapshot instance. Otherwise returns a successor
    /// whose flags say which side moved.
    ///
    /// The first observation of a fresh snapshot seeds the anchor quietly,
    /// with or without a scene nonce: the successor absorbs the scene and
    /// app state but reports no change, because loading a document into an
    /// empty editor is not an undoable user action.
    pub fn advance(
        &self,
        next_elements: &ElementsMap,
        next_app_state: &ObservedAppState,
        options: &CaptureOptions,
    ) -> Option<Snapshot> {
        let seeding = !self.observed;
        let elements_changed = !seeding
            && self.detect_elements_changed(next_elements, options.scene_version_nonce);
        let app_state_changed = !seeding && self.app_state != *next_app_state;

        if !seeding && !elements_changed && !app_state_changed {
            return None;
        }

        let mut flags = SnapshotFlags::empty();
        if elements_changed {
            flags |= SnapshotFlags::DID_ELEMENTS_CHANGE;
        }
        if app_state_changed {
            flags |= SnapshotFlags::DID_APP_STATE_CHANGE;
        }

        let elements = if elements_changed || seeding {
            self.clone_elements(next_elements, options)
        } else {
            self.elements.clone()
        };

        Some(Snapshot {
            elements,
            app_state: next_app_state.clone(),
            flags,
            scene_version_nonce: options.scene_version_nonce.or(self.scene_version_nonce),
            observed: true,
        })
    }

    fn detect_elements_changed(&self, next: &ElementsMap, nonce: Option<u64>) -> bool {
        if let (Some(prev_nonce), Some(next_nonce)) = (self.scene_version_nonce, nonce) {
            return prev_nonce != next_nonce;
        }
        self.scan_elements_changed(next)
    }

    /// Size check plus a right-to-left id/nonce scan. Recent edits cluster
    /// at the top of the z-order, so the reverse scan bails out early.
    fn scan_elements_changed(&self, next: &ElementsMap) -> bool {
        if self.elements.len() != next.len() {
            return true;
        }
        self.elements
            .iter()
            .rev()
            .zip(next.iter().rev())
            .any(|((prev_id, prev_el), (next_id, next_el))| {
                prev_id != next_id || prev_el.version_nonce != next_el.version_nonce
            })
    }

    /// Structural clone of the scene.
    ///
    /// Every previously observed element is kept (a remote payload may
    /// deliver only a subset of the scene); elements whose nonce moved are
    /// replaced with a deep copy; new ids land on top.
    ///
    /// When the capture is a remote update, the element the local user is
    /// mid-edit on is skipped entirely: a half-committed mutation of it is
    /// not a valid undo target.
    fn clone_elements(&self, next: &ElementsMap, options: &CaptureOptions) -> ElementsMap {
        let mut cloned = self.elements.clone();

        for (id, next_element) in next.iter() {
            if options.is_remote_update && options.editing_element_id.as_ref() == Some(id) {
                continue;
            }

            match self.elements.get(id) {
                Some(prev_element)
                    if prev_element.version_nonce == next_element.version_nonce => {}
                _ => {
                    cloned.insert(Arc::new((**next_element).clone()));
                }
            }
        }

        cloned
    }
}
