//! Transition observer and increment emitter.
//!
//! The store owns the current [`Snapshot`] and decides, per capture, whether
//! the transition is semantically interesting. Accepted transitions produce
//! a [`StoreIncrement`] that is fanned out synchronously to listeners in
//! registration order.

use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, trace};

use scene_core::{AppStateChange, ElementId, ElementsChange, ElementsMap, ObservedAppState};

use crate::snapshot::{CaptureOptions, Snapshot};

bitflags! {
    /// One-shot capture flags, reset at the end of every capture.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    struct StoreFlags: u8 {
        const RECORDING_CHANGES    = 1 << 0;
        const ONLY_UPDATE_SNAPSHOT = 1 << 1;
        const REMOTE_UPDATE        = 1 << 2;
    }
}

/// One emitted change pair: what the scene did and what the observed app
/// state did, in the same transition.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreIncrement {
    pub elements_change: ElementsChange,
    pub app_state_change: AppStateChange,
}

impl StoreIncrement {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements_change.is_empty() && self.app_state_change.is_empty()
    }
}

/// Failure surfaced by a listener during fan-out.
pub type ListenerError = Box<dyn std::error::Error + 'static>;

/// Errors produced by [`Store::capture`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A listener rejected the increment. The snapshot has already been
    /// swapped when this is returned, so a retried capture will not
    /// double-emit.
    #[error("store listener failed: {source}")]
    Listener {
        #[source]
        source: ListenerError,
    },
}

/// Callback invoked for every emitted increment.
pub type ListenerFn = Box<dyn FnMut(&StoreIncrement) -> Result<(), ListenerError>>;

/// Deregistration token returned by [`Store::listen`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerHandle(u64);

struct RegisteredListener {
    id: u64,
    callback: ListenerFn,
}

/// Observes editor state transitions and emits increments.
pub struct Store {
    snapshot: Arc<Snapshot>,
    flags: StoreFlags,
    listeners: Vec<RegisteredListener>,
    next_listener_id: u64,
}

impl Store {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::empty()),
            flags: StoreFlags::empty(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Current diff anchor.
    pub fn snapshot(&self) -> &Arc<Snapshot> {
        &self.snapshot
    }

    /// Arms the next capture to compute and emit an increment.
    pub fn resume_recording(&mut self) {
        self.flags |= StoreFlags::RECORDING_CHANGES;
    }

    /// Arms the next capture to update the snapshot without emitting,
    /// absorbing a transition that must not be undoable on its own.
    pub fn only_update_snapshot(&mut self) {
        self.flags |= StoreFlags::ONLY_UPDATE_SNAPSHOT;
    }

    /// Marks the next capture as carrying a collaborator's changes.
    pub fn mark_remote_update(&mut self) {
        self.flags |= StoreFlags::REMOTE_UPDATE;
    }

    /// Registers a listener; increments are delivered in registration order.
    pub fn listen(
        &mut self,
        callback: impl FnMut(&StoreIncrement) -> Result<(), ListenerError> + 'static,
    ) -> ListenerHandle {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push(RegisteredListener {
            id,
            callback: Box::new(callback),
        });
        ListenerHandle(id)
    }

    /// Deregisters a listener. Unknown handles are ignored.
    pub fn unlisten(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|listener| listener.id != handle.0);
    }

    /// Observes one editor state transition.
    ///
    /// The capture flags are one-shot: whatever the outcome, they are reset
    /// before this returns. A listener failure propagates to the caller, but
    /// only after the snapshot swap, so the transition is never re-emitted
    /// on retry.
    pub fn capture(
        &mut self,
        elements: &ElementsMap,
        app_state: &ObservedAppState,
        scene_version_nonce: Option<u64>,
        editing_element_id: Option<&ElementId>,
    ) -> Result<(), StoreError> {
        let flags = std::mem::take(&mut self.flags);

        if !flags.intersects(StoreFlags::RECORDING_CHANGES | StoreFlags::ONLY_UPDATE_SNAPSHOT) {
            trace!("capture rejected: neither recording nor snapshot update requested");
            return Ok(());
        }

        let options = CaptureOptions {
            scene_version_nonce,
            is_remote_update: flags.contains(StoreFlags::REMOTE_UPDATE),
            editing_element_id: editing_element_id.cloned(),
        };

        let Some(next_snapshot) = self.snapshot.advance(elements, app_state, &options) else {
            trace!("capture rejected: nothing observed changed");
            return Ok(());
        };
        let next_snapshot = Arc::new(next_snapshot);

        let mut increment = None;
        if flags.contains(StoreFlags::RECORDING_CHANGES)
            && !flags.contains(StoreFlags::ONLY_UPDATE_SNAPSHOT)
        {
            let elements_change = if next_snapshot.did_elements_change() {
                ElementsChange::calculate(self.snapshot.elements(), next_snapshot.elements())
            } else {
                ElementsChange::empty()
            };
            let app_state_change = if next_snapshot.did_app_state_change() {
                AppStateChange::calculate(self.snapshot.app_state(), next_snapshot.app_state())
            } else {
                AppStateChange::empty()
            };

            let candidate = StoreIncrement {
                elements_change,
                app_state_change,
            };
            if !candidate.is_empty() {
                increment = Some(candidate);
            }
        }

        self.snapshot = next_snapshot;

        if let Some(increment) = increment {
            debug!(
                touched_elements = increment.elements_change.len(),
                "store emitting increment"
            );
            for listener in &mut self.listeners {
                (listener.callback)(&increment)
                    .map_err(|source| StoreError::Listener { source })?;
            }
        }

        Ok(())
    }

    /// Resets the snapshot to the empty scene. Listeners stay registered;
    /// undo stacks are owned by `History`, not the store.
    pub fn clear(&mut self) {
        self.snapshot = Arc::new(Snapshot::empty());
    }

    /// Clears the snapshot and drops every listener.
    pub fn destroy(&mut self) {
        self.clear();
        self.listeners.clear();
        self.flags = StoreFlags::empty();
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
