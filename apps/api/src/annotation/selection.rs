//! Selection Tracker: the set of selected token ids and the drag gesture
//! layered on top of it.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::annotation::token_store::IdMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionState {
    Empty,
    /// A pointer gesture is in progress.
    Selecting,
    Selected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<usize>,
    /// Anchor id of the active drag gesture.
    drag_anchor: Option<usize>,
}

impl Selection {
    pub fn state(&self) -> SelectionState {
        if self.drag_anchor.is_some() {
            SelectionState::Selecting
        } else if self.ids.is_empty() {
            SelectionState::Empty
        } else {
            SelectionState::Selected
        }
    }

    pub fn ids(&self) -> &BTreeSet<usize> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.ids.contains(&id)
    }

    pub fn toggle(&mut self, id: usize) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
    }

    pub fn select_only(&mut self, id: usize) {
        self.ids.clear();
        self.ids.insert(id);
    }

    /// Replaces the selection with every existing id in the inclusive range
    /// between `anchor` and `id`, in either order.
    pub fn set_range(&mut self, anchor: usize, id: usize, existing: impl Fn(usize) -> bool) {
        let (lo, hi) = if anchor <= id { (anchor, id) } else { (id, anchor) };
        self.ids = (lo..=hi).filter(|candidate| existing(*candidate)).collect();
    }

    pub fn select_all(&mut self, existing: impl IntoIterator<Item = usize>) {
        self.ids = existing.into_iter().collect();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Translates selected ids through a store renumbering. Ids with no
    /// entry in `remap` no longer exist and drop out.
    pub fn reconcile(&mut self, remap: &IdMap) {
        self.ids = self
            .ids
            .iter()
            .filter_map(|id| remap.get(id).copied())
            .collect();
        self.drag_anchor = self.drag_anchor.and_then(|id| remap.get(&id).copied());
    }

    // ────────────────────────────────────────────────────────────────────
    // Drag gesture
    // ────────────────────────────────────────────────────────────────────

    /// Starts a gesture on `id`. With ctrl held the token is toggled into or
    /// out of the current selection, otherwise it becomes the only one.
    pub fn pointer_down(&mut self, id: usize, ctrl: bool) {
        if ctrl {
            self.toggle(id);
        } else {
            self.select_only(id);
        }
        self.drag_anchor = Some(id);
    }

    /// Recomputes the range from the gesture anchor to `id`. Ignored when no
    /// gesture is active. Returns whether the selection was touched.
    pub fn pointer_move(&mut self, id: usize, existing: impl Fn(usize) -> bool) -> bool {
        match self.drag_anchor {
            Some(anchor) => {
                self.set_range(anchor, id, existing);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag_anchor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_exist(_: usize) -> bool {
        true
    }

    fn ids(selection: &Selection) -> Vec<usize> {
        selection.ids().iter().copied().collect()
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = Selection::default();
        selection.toggle(3);
        assert!(selection.contains(3));
        selection.toggle(3);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_range_is_symmetric() {
        let mut forward = Selection::default();
        let mut backward = Selection::default();
        forward.set_range(3, 7, all_exist);
        backward.set_range(7, 3, all_exist);
        assert_eq!(forward, backward);
        assert_eq!(ids(&forward), vec![3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_range_skips_missing_ids() {
        let mut selection = Selection::default();
        selection.set_range(0, 9, |id| id < 4);
        assert_eq!(ids(&selection), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_range_replaces_previous_selection() {
        let mut selection = Selection::default();
        selection.toggle(10);
        selection.set_range(1, 2, all_exist);
        assert_eq!(ids(&selection), vec![1, 2]);
    }

    #[test]
    fn test_select_all_and_clear() {
        let mut selection = Selection::default();
        selection.select_all(0..5);
        assert_eq!(selection.len(), 5);
        assert_eq!(selection.state(), SelectionState::Selected);
        selection.clear();
        assert_eq!(selection.state(), SelectionState::Empty);
    }

    #[test]
    fn test_drag_recomputes_range_on_every_move() {
        let mut selection = Selection::default();
        selection.pointer_down(5, false);
        assert_eq!(selection.state(), SelectionState::Selecting);

        selection.pointer_move(8, all_exist);
        assert_eq!(ids(&selection), vec![5, 6, 7, 8]);
        selection.pointer_move(3, all_exist);
        assert_eq!(ids(&selection), vec![3, 4, 5]);

        selection.pointer_up();
        assert_eq!(selection.state(), SelectionState::Selected);
        assert_eq!(ids(&selection), vec![3, 4, 5]);
    }

    #[test]
    fn test_move_without_gesture_is_ignored() {
        let mut selection = Selection::default();
        selection.toggle(1);
        assert!(!selection.pointer_move(4, all_exist));
        assert_eq!(ids(&selection), vec![1]);
    }

    #[test]
    fn test_ctrl_pointer_down_toggles() {
        let mut selection = Selection::default();
        selection.pointer_down(1, false);
        selection.pointer_up();
        selection.pointer_down(4, true);
        selection.pointer_up();
        assert_eq!(ids(&selection), vec![1, 4]);
        selection.pointer_down(1, true);
        assert_eq!(ids(&selection), vec![4]);
    }

    #[test]
    fn test_reconcile_drops_and_renumbers() {
        let mut selection = Selection::default();
        selection.select_all([0, 2, 3]);
        let remap: IdMap = [(0, 0), (3, 1)].into_iter().collect();
        selection.reconcile(&remap);
        assert_eq!(ids(&selection), vec![0, 1]);
    }
}
