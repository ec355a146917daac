//! End-to-end flows through Store and History, driven the way a host editor
//! drives them: capture on commit, listener-fed recording, undo/redo applied
//! back onto the live scene.

use std::cell::RefCell;
use std::rc::Rc;

use history::{History, Store};
use scene_core::{
    DrawingElement, ElementsMap, HistoryEntry, ObservedAppState, PropValue,
};

/// Minimal stand-in for the editor host: live scene plus observed app state,
/// with a store wired to a history via the listener channel.
struct Harness {
    store: Store,
    history: Rc<RefCell<History>>,
    elements: ElementsMap,
    app_state: ObservedAppState,
    scene_nonce: u64,
}

impl Harness {
    fn new() -> Self {
        let mut store = Store::new();
        let history = Rc::new(RefCell::new(History::new()));

        let sink = Rc::clone(&history);
        store.listen(move |increment| {
            sink.borrow_mut()
                .record(&increment.elements_change, &increment.app_state_change);
            Ok(())
        });

        Self {
            store,
            history,
            elements: ElementsMap::new(),
            app_state: ObservedAppState::default(),
            scene_nonce: 0,
        }
    }

    /// Local user commit: replace the scene, bump the nonce, capture as a
    /// recordable transition.
    fn commit(&mut self, elements: ElementsMap) {
        self.elements = elements;
        self.scene_nonce += 1;
        self.store.resume_recording();
        self.store
            .capture(&self.elements, &self.app_state, Some(self.scene_nonce), None)
            .unwrap();
    }

    /// Local app-state-only commit (selection etc.).
    fn commit_app_state(&mut self, app_state: ObservedAppState) {
        self.app_state = app_state;
        self.store.resume_recording();
        self.store
            .capture(&self.elements, &self.app_state, Some(self.scene_nonce), None)
            .unwrap();
    }

    /// Remote collaborator payload: absorbed into the snapshot, never
    /// recorded.
    fn remote_update(&mut self, elements: ElementsMap) {
        self.elements = elements;
        self.scene_nonce += 1;
        self.store.only_update_snapshot();
        self.store.mark_remote_update();
        self.store
            .capture(&self.elements, &self.app_state, Some(self.scene_nonce), None)
            .unwrap();
    }

    /// Applies an entry the way the host commits an undo/redo result.
    fn apply(&mut self, entry: &HistoryEntry) -> (bool, bool) {
        let ((elements, elements_visible), (app_state, app_state_visible)) =
            entry.apply_to(&self.elements, &self.app_state);
        self.elements = elements;
        self.app_state = app_state;
        (elements_visible, app_state_visible)
    }

    fn undo(&mut self) -> Option<(bool, bool)> {
        let entry = self.history.borrow_mut().undo_once(&self.elements)?;
        Some(self.apply(&entry))
    }

    fn redo(&mut self) -> Option<(bool, bool)> {
        let entry = self.history.borrow_mut().redo_once(&self.elements)?;
        Some(self.apply(&entry))
    }

    /// Host-level visibility-skip policy: keep stepping until something the
    /// user can see changes, or the stack runs dry. Returns steps consumed.
    fn undo_until_visible(&mut self) -> usize {
        let mut steps = 0;
        while let Some((elements_visible, app_state_visible)) = self.undo() {
            steps += 1;
            if elements_visible || app_state_visible {
                break;
            }
        }
        steps
    }

    fn undo_depth(&self) -> usize {
        self.history.borrow().depths().0
    }

    fn x_of(&self, id: &str) -> Option<PropValue> {
        self.elements.get(&id.into())?.prop("x").cloned()
    }
}

fn rect(id: &str, nonce: u64, x: i64) -> DrawingElement {
    DrawingElement::builder(id)
        .version_nonce(nonce)
        .prop("type", "rect")
        .prop("x", x)
        .build()
}

#[test]
fn add_undo_redo_round_trip() {
    let mut harness = Harness::new();

    // Seed the empty scene, then add a rectangle.
    harness.commit(ElementsMap::new());
    harness.commit(ElementsMap::from_elements([rect("r1", 1, 0)]));
    assert_eq!(harness.undo_depth(), 1);

    harness.undo().unwrap();
    let r1 = harness.elements.get(&"r1".into()).unwrap();
    assert!(r1.is_deleted);

    harness.redo().unwrap();
    let r1 = harness.elements.get(&"r1".into()).unwrap();
    assert!(!r1.is_deleted);
    assert_eq!(r1.prop("x"), Some(&PropValue::Int(0)));
    assert_eq!(r1.prop("type"), Some(&PropValue::Text("rect".into())));
}

#[test]
fn irrelevant_churn_is_ignored() {
    let mut harness = Harness::new();
    harness.commit(ElementsMap::from_elements([rect("a", 1, 0)]));

    // Same payload, fresh nonce and timestamp.
    let churned = DrawingElement::builder("a")
        .version_nonce(2)
        .updated(123)
        .prop("type", "rect")
        .prop("x", 0i64)
        .build();
    harness.commit(ElementsMap::from_elements([churned]));

    assert_eq!(harness.undo_depth(), 0);
}

#[test]
fn undo_composes_with_concurrent_remote_edit() {
    let mut harness = Harness::new();
    harness.commit(ElementsMap::from_elements([rect("a", 1, 10)]));

    // Local move: x 10 -> 20. One undoable step.
    harness.commit(ElementsMap::from_elements([rect("a", 2, 20)]));
    assert_eq!(harness.undo_depth(), 1);

    // Remote collaborator colors the element; not undoable locally.
    let remote = DrawingElement::builder("a")
        .version_nonce(3)
        .prop("type", "rect")
        .prop("x", 20i64)
        .prop("strokeColor", "red")
        .build();
    harness.remote_update(ElementsMap::from_elements([remote]));
    assert_eq!(harness.undo_depth(), 1);

    harness.undo().unwrap();

    // The local move is reverted, the remote color survives.
    let a = harness.elements.get(&"a".into()).unwrap();
    assert_eq!(a.prop("x"), Some(&PropValue::Int(10)));
    assert_eq!(a.prop("strokeColor"), Some(&PropValue::Text("red".into())));

    // Redo restores the move without clobbering the color.
    harness.redo().unwrap();
    let a = harness.elements.get(&"a".into()).unwrap();
    assert_eq!(a.prop("x"), Some(&PropValue::Int(20)));
    assert_eq!(a.prop("strokeColor"), Some(&PropValue::Text("red".into())));
}

#[test]
fn visibility_skip_walks_over_transparent_entries() {
    fn shape(nonce: u64, x: i64, y: i64) -> DrawingElement {
        DrawingElement::builder("a")
            .version_nonce(nonce)
            .prop("x", x)
            .prop("y", y)
            .build()
    }

    let mut harness = Harness::new();
    harness.commit(ElementsMap::new());

    // Three local steps: add the shape, move it on x, move it on y.
    harness.commit(ElementsMap::from_elements([shape(1, 0, 0)]));
    harness.commit(ElementsMap::from_elements([shape(2, 5, 0)]));
    harness.commit(ElementsMap::from_elements([shape(3, 5, 7)]));
    assert_eq!(harness.undo_depth(), 3);

    // A remote rewind reverts both moves: undoing them now produces nothing
    // the user can see.
    harness.remote_update(ElementsMap::from_elements([shape(4, 0, 0)]));

    let steps = harness.undo_until_visible();

    // Two transparent entries are stepped over; the third (the add) flips
    // the deletion flag and is the one user-perceivable change.
    assert_eq!(steps, 3);
    assert!(harness.elements.get(&"a".into()).unwrap().is_deleted);
}

#[test]
fn selection_only_change_is_one_entry() {
    let mut harness = Harness::new();
    harness.commit(ElementsMap::from_elements([rect("a", 1, 0), rect("b", 1, 0)]));

    let selected_a = ObservedAppState::default().with_selected_elements(["a"]);
    harness.commit_app_state(selected_a.clone());
    let selected_both = ObservedAppState::default().with_selected_elements(["a", "b"]);
    harness.commit_app_state(selected_both);

    assert_eq!(harness.undo_depth(), 2);

    let (elements_visible, app_state_visible) = harness.undo().unwrap();
    assert!(!elements_visible);
    assert!(app_state_visible);
    assert_eq!(harness.app_state, selected_a);
}

#[test]
fn first_capture_of_a_loaded_scene_is_not_undoable() {
    let mut harness = Harness::new();

    // Opening a non-empty document: one capture, nothing recorded.
    harness.commit(ElementsMap::from_elements([rect("a", 1, 0), rect("b", 1, 4)]));

    assert_eq!(harness.undo_depth(), 0);
    assert!(harness.undo().is_none());
}

#[test]
fn soft_deletion_survives_undo_of_unrelated_edit() {
    let mut harness = Harness::new();
    harness.commit(ElementsMap::from_elements([rect("a", 1, 0), rect("b", 1, 0)]));

    // Move "a", then soft-delete "b" remotely.
    harness.commit(ElementsMap::from_elements([rect("a", 2, 5), rect("b", 1, 0)]));
    let b_deleted = DrawingElement::builder("b")
        .version_nonce(2)
        .deleted(true)
        .prop("type", "rect")
        .prop("x", 0i64)
        .build();
    harness.remote_update(ElementsMap::from_elements([rect("a", 2, 5), b_deleted]));

    harness.undo().unwrap();

    assert_eq!(harness.x_of("a"), Some(PropValue::Int(0)));
    assert!(harness.elements.get(&"b".into()).unwrap().is_deleted);
    // The map never shrinks; both ids are still present.
    assert_eq!(harness.elements.len(), 2);
}
