#![forbid(unsafe_code)]

//! Selection save and restore around a render pass.
//!
//! Before a pass rebuilds the tree, the selection is captured together with
//! the visual offset of its first visible member. After the pass:
//!
//! 1. every marker is cleared;
//! 2. the saved records are re-selected, dropping those no longer valid;
//! 3. if that leaves nothing selected and an offset was saved, the item now
//!    at that offset is selected. Offsets past the end select nothing.
//!
//! Step 3 is what makes removing the selected item select its successor,
//! while step 2 keeps the selection stable across unrelated changes.

use collectionview_core::{ModelRef, Record};
use tracing::debug;

use crate::addressing::{AddressingMode, Resolver, Selector};
use crate::collection_view::CollectionView;
use crate::error::CollectionError;
use crate::events::CollectionEvent;
use crate::host::ContainerFlags;
use crate::selection::{SelectionSet, retain_valid};

/// Selection captured before a render pass.
pub struct SavedSelection<R> {
    /// Members at save time.
    pub items: Vec<ModelRef<R>>,
    /// Visual offset of the first visible member at save time.
    pub offset: Option<usize>,
}

impl<R> Clone for SavedSelection<R> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            offset: self.offset,
        }
    }
}

impl<R: Record> std::fmt::Debug for SavedSelection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cids: Vec<_> = self.items.iter().map(|m| m.cid()).collect();
        f.debug_struct("SavedSelection")
            .field("items", &cids)
            .field("offset", &self.offset)
            .finish()
    }
}

impl<R: Record> SavedSelection<R> {
    /// Capture `selection` against the tree as currently rendered.
    #[must_use]
    pub fn capture(selection: &SelectionSet<R>, resolver: &Resolver<'_, R>) -> Self {
        let offset = match resolver.read(selection, AddressingMode::Offset) {
            Selector::Offsets(offsets) => offsets.first().copied(),
            _ => None,
        };
        Self {
            items: selection.models().to_vec(),
            offset,
        }
    }
}

impl<R: Record> CollectionView<R> {
    /// Remember the current selection for a later
    /// [`restore_selection`](Self::restore_selection).
    pub fn save_selection(&mut self) -> Result<(), CollectionError> {
        if !self.options.selectable {
            return Err(CollectionError::NotSelectable);
        }
        self.saved = Some(self.capture_selection());
        Ok(())
    }

    /// Restore the selection saved by
    /// [`save_selection`](Self::save_selection), with offset fallback.
    pub fn restore_selection(&mut self) -> Result<(), CollectionError> {
        let saved = self.saved.take().ok_or(CollectionError::NoSavedSelection)?;
        self.restore_from(saved, true);
        self.update_dependent_controls();
        Ok(())
    }

    pub(crate) fn capture_selection(&self) -> SavedSelection<R> {
        let resolver = Resolver {
            store: &self.store,
            bindings: &self.bindings,
            tree: &self.tree,
        };
        SavedSelection::capture(&self.selection, &resolver)
    }

    /// Apply the restore strategy. Emits at most one `SelectionChanged`,
    /// comparing `saved` with the outcome.
    pub(crate) fn restore_from(&mut self, saved: SavedSelection<R>, offset_fallback: bool) {
        self.tree.clear_flag(ContainerFlags::SELECTED);

        let filter = self.options.selectable_models_filter.clone();
        let mut next = SelectionSet::from_models(saved.items.iter().cloned());
        retain_valid(&mut next, &self.store, filter.as_ref());

        let mut used_offset = false;
        if next.is_empty() && !saved.items.is_empty() && offset_fallback {
            if let Some(offset) = saved.offset {
                let resolver = Resolver {
                    store: &self.store,
                    bindings: &self.bindings,
                    tree: &self.tree,
                };
                next = SelectionSet::from_models(resolver.resolve(&Selector::Offsets(vec![offset])));
                retain_valid(&mut next, &self.store, filter.as_ref());
                used_offset = true;
            }
        }

        for cid in next.cids() {
            let Some(key) = self.bindings.container_of(cid) else {
                continue;
            };
            if let Some(c) = self.tree.container_mut(key) {
                c.set_flag(ContainerFlags::SELECTED, true);
            }
        }

        let previous = SelectionSet::from_models(saved.items);
        let changed = !previous.same_members(&next);
        self.selection = next;
        debug!(
            message = "collection.selection",
            action = "restore",
            selected_count = self.selection.len(),
            changed,
            used_offset
        );
        if changed {
            self.emit(CollectionEvent::SelectionChanged {
                new: self.selection.models().to_vec(),
                old: previous.models().to_vec(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CollectionOptions;
    use crate::view::{ItemView, view_constructor};
    use collectionview_core::{Model, RecordStore};

    struct Word(&'static str);
    impl Record for Word {
        type Id = &'static str;
        fn id(&self) -> Option<&'static str> {
            Some(self.0)
        }
    }

    struct Plain;
    impl ItemView<Word> for Plain {
        fn render(&mut self, model: &Model<Word>) -> Option<String> {
            Some(model.0.into())
        }
    }

    fn rendered(words: &[&'static str]) -> (CollectionView<Word>, RecordStore<Word>) {
        let store = RecordStore::from_records(words.iter().map(|w| Word(*w)));
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(store.clone())
                .model_view(view_constructor(|_, _| Plain)),
        )
        .unwrap();
        view.render().unwrap();
        (view, store)
    }

    #[test]
    fn restore_without_save_fails() {
        let (mut view, _) = rendered(&["a"]);
        assert_eq!(view.restore_selection(), Err(CollectionError::NoSavedSelection));
    }

    #[test]
    fn capture_records_first_visible_offset() {
        let (mut view, store) = rendered(&["a", "b", "c"]);
        let m = store.models();
        view.set_selected(
            Selector::Models(vec![m[2].clone(), m[1].clone()]),
            Default::default(),
        )
        .unwrap();
        let saved = view.capture_selection();
        assert_eq!(saved.offset, Some(1));
        assert_eq!(saved.items.len(), 2);
    }

    #[test]
    fn explicit_save_then_restore() {
        let (mut view, store) = rendered(&["a", "b", "c"]);
        view.set_selected(Selector::Ids(vec!["b"]), Default::default())
            .unwrap();
        view.save_selection().unwrap();
        store.detach(store.models()[1].cid());
        view.restore_selection().unwrap();
        // The tree still shows b at offset 1, which no longer resolves.
        assert!(view.selected_cids().is_empty());

        view.render().unwrap();
        view.set_selected(Selector::Ids(vec!["c"]), Default::default())
            .unwrap();
        view.save_selection().unwrap();
        view.restore_selection().unwrap();
        assert_eq!(view.selected_cids(), vec![store.models()[1].cid()]);
    }
}
