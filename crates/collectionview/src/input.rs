#![forbid(unsafe_code)]

//! Pointer and keyboard handling.
//!
//! | Input                         | Effect                                        |
//! |-------------------------------|-----------------------------------------------|
//! | click on item                 | select only that item                         |
//! | shift-click (multi)           | select the visible range from the anchor      |
//! | ctrl/cmd-click or toggle mode | add or remove the item                        |
//! | click on background           | clear the selection                           |
//! | double click on item          | `DoubleClick` notification                    |
//! | Up / Down with one selected   | move the selection one visible row (trapped)  |
//!
//! Clicks that bubbled up from a nested list arrive as
//! [`PointerTarget::Foreign`] and are ignored.

use collectionview_core::event::{KeyCode, KeyEvent, PointerEvent, PointerKind, PointerTarget};
use collectionview_core::{Cid, ModelRef, Record};

use crate::addressing::{AddressingMode, Selector};
use crate::collection_view::CollectionView;
use crate::error::CollectionError;
use crate::events::CollectionEvent;
use crate::selection::SetOptions;

impl<R: Record> CollectionView<R> {
    /// Handle a hit-tested pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<(), CollectionError> {
        self.sync()?;
        match (event.kind, event.target) {
            (_, PointerTarget::Foreign) => Ok(()),
            (PointerKind::DoubleClick, PointerTarget::Item(cid)) => {
                if let Some(model) = self.store.get(cid) {
                    self.emit(CollectionEvent::DoubleClick(model));
                }
                Ok(())
            }
            (PointerKind::DoubleClick, PointerTarget::Background) => Ok(()),
            (PointerKind::Click, PointerTarget::Background) => {
                if !self.options.selectable {
                    return Ok(());
                }
                self.anchor = None;
                self.select_none(SetOptions::default())
            }
            (PointerKind::Click, PointerTarget::Item(cid)) => self.click_item(cid, &event),
        }
    }

    fn click_item(&mut self, cid: Cid, event: &PointerEvent) -> Result<(), CollectionError> {
        if !self.options.selectable || !self.options.click_to_select {
            return Ok(());
        }
        let multiple = self.options.select_multiple;
        if multiple && event.shift() {
            let range = self.visible_range(cid);
            return self.commit(range, SetOptions::default(), "range");
        }
        self.anchor = Some(cid);
        if multiple && (self.options.click_to_toggle || event.toggle_modifier()) {
            return self.toggle_selected(cid, None, SetOptions::default());
        }
        let clicked: Vec<ModelRef<R>> = self.store.get(cid).into_iter().collect();
        self.commit(clicked, SetOptions::default(), "click")
    }

    /// Visible records between the range root and `clicked`, inclusive.
    fn visible_range(&self, clicked: Cid) -> Vec<ModelRef<R>> {
        let tree = &self.tree;
        let Some(end) = tree.visible_offset(clicked) else {
            return self.store.get(clicked).into_iter().collect();
        };
        let start = self
            .anchor
            .and_then(|cid| tree.visible_offset(cid))
            .or_else(|| {
                tree.visible()
                    .position(|c| self.selection.contains(c.item_id()))
            })
            .unwrap_or(end);
        let (lo, hi) = (start.min(end), start.max(end));
        tree.visible()
            .skip(lo)
            .take(hi - lo + 1)
            .filter_map(|c| self.store.get(c.item_id()))
            .collect()
    }

    /// Handle a key press. Returns `true` when the key was consumed and its
    /// default action (scrolling) should be suppressed.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if !self.options.process_key_events || !self.options.selectable || !event.is_press() {
            return false;
        }
        if self.sync().is_err() {
            return false;
        }
        let Selector::Offsets(offsets) = self.selected(AddressingMode::Offset) else {
            return false;
        };
        let &[current] = offsets.as_slice() else {
            return false;
        };
        let target = match event.code {
            KeyCode::Up => current.saturating_sub(1),
            KeyCode::Down => current + 1,
            KeyCode::Enter => return false,
        };
        self.select_offset(target, true, SetOptions::default()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CollectionOptions;
    use collectionview_core::RecordStore;
    use collectionview_core::event::Modifiers;

    #[derive(Debug)]
    struct File(&'static str);
    impl Record for File {
        type Id = &'static str;
        fn id(&self) -> Option<&'static str> {
            Some(self.0)
        }
    }

    fn files(multiple: bool) -> (CollectionView<File>, Vec<Cid>) {
        let store = RecordStore::from_records(["a", "b", "c", "d"].map(File));
        let cids = store.cids();
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(store)
                .item_template(|f: &File| f.0.into())
                .select_multiple(multiple),
        )
        .unwrap();
        view.render().unwrap();
        (view, cids)
    }

    fn click(cid: Cid) -> PointerEvent {
        PointerEvent::click(PointerTarget::Item(cid))
    }

    #[test]
    fn plain_click_selects_one() {
        let (mut view, c) = files(true);
        view.handle_pointer(click(c[0])).unwrap();
        view.handle_pointer(click(c[2])).unwrap();
        assert_eq!(view.selected_cids(), vec![c[2]]);
    }

    #[test]
    fn shift_click_selects_range_from_anchor() {
        let (mut view, c) = files(true);
        view.handle_pointer(click(c[1])).unwrap();
        view.handle_pointer(click(c[3]).with_modifiers(Modifiers::SHIFT))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[1], c[2], c[3]]);
        view.handle_pointer(click(c[0]).with_modifiers(Modifiers::SHIFT))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[0], c[1]]);
    }

    #[test]
    fn shift_click_without_multiple_is_plain() {
        let (mut view, c) = files(false);
        view.handle_pointer(click(c[0])).unwrap();
        view.handle_pointer(click(c[2]).with_modifiers(Modifiers::SHIFT))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[2]]);
    }

    #[test]
    fn modifier_click_toggles() {
        let (mut view, c) = files(true);
        view.handle_pointer(click(c[0])).unwrap();
        view.handle_pointer(click(c[2]).with_modifiers(Modifiers::CTRL))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[0], c[2]]);
        view.handle_pointer(click(c[0]).with_modifiers(Modifiers::SUPER))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[2]]);
    }

    #[test]
    fn background_click_clears_and_foreign_is_ignored() {
        let (mut view, c) = files(false);
        view.handle_pointer(click(c[1])).unwrap();
        view.handle_pointer(PointerEvent::click(PointerTarget::Foreign))
            .unwrap();
        assert_eq!(view.selected_cids(), vec![c[1]]);
        view.handle_pointer(PointerEvent::click(PointerTarget::Background))
            .unwrap();
        assert!(!view.has_selection());
    }

    #[test]
    fn double_click_notifies() {
        let (mut view, c) = files(false);
        let seen = std::rc::Rc::new(std::cell::Cell::new(None));
        let s = std::rc::Rc::clone(&seen);
        let _sub = view.subscribe(move |e| {
            if let CollectionEvent::DoubleClick(m) = e {
                s.set(Some(m.cid()));
            }
        });
        view.handle_pointer(PointerEvent::double_click(PointerTarget::Item(c[3])))
            .unwrap();
        assert_eq!(seen.get(), Some(c[3]));
        assert!(!view.has_selection());
    }

    #[test]
    fn arrows_move_single_selection_and_trap() {
        let (mut view, c) = files(false);
        assert!(!view.handle_key(&KeyEvent::new(KeyCode::Down)), "nothing selected");
        view.handle_pointer(click(c[0])).unwrap();
        assert!(view.handle_key(&KeyEvent::new(KeyCode::Down)));
        assert_eq!(view.selected_cids(), vec![c[1]]);
        assert!(view.handle_key(&KeyEvent::new(KeyCode::Up)));
        assert!(view.handle_key(&KeyEvent::new(KeyCode::Up)));
        assert_eq!(view.selected_cids(), vec![c[0]]);
        assert!(!view.handle_key(&KeyEvent::new(KeyCode::Enter)));
        assert_eq!(view.selected_cids(), vec![c[0]]);
    }

    #[test]
    fn down_is_clamped_at_the_end() {
        let (mut view, c) = files(false);
        view.handle_pointer(click(c[3])).unwrap();
        assert!(view.handle_key(&KeyEvent::new(KeyCode::Down)));
        assert_eq!(view.selected_cids(), vec![c[3]]);
    }

    #[test]
    fn keys_ignored_when_disabled() {
        let (mut view, c) = files(false);
        view.handle_pointer(click(c[0])).unwrap();
        view.set_option("processKeyEvents", false.into()).unwrap();
        assert!(!view.handle_key(&KeyEvent::new(KeyCode::Down)));
        assert_eq!(view.selected_cids(), vec![c[0]]);
    }
}
