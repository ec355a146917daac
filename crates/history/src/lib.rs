//! History orchestration for the drawing editor.
//!
//! This crate wires the pure change algebra of `scene-core` into the two
//! stateful components hosts embed:
//! - [`Store`] observes editor state transitions, owns the memoized
//!   [`Snapshot`] used as the diff anchor, and fans out [`StoreIncrement`]s
//!   to listeners (history, collaboration transport, ...)
//! - [`History`] keeps the undo and redo stacks, rebasing popped entries
//!   against the live scene so replay stays correct under concurrent
//!   collaborator edits
//!
//! Everything is synchronous and single-threaded; hosts serialize calls on
//! their event loop.
pub mod history;
pub mod snapshot;
pub mod store;

pub use history::History;
pub use snapshot::{CaptureOptions, Snapshot, SnapshotFlags};
pub use store::{ListenerError, ListenerFn, ListenerHandle, Store, StoreError, StoreIncrement};
