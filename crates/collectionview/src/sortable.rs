#![forbid(unsafe_code)]

//! Drag reordering.
//!
//! The drag library moves containers around in the [`ItemTree`](crate::host::ItemTree) and calls
//! back into the view at start, on every position change, and at stop; for
//! connected lists the receiving view also gets a receive callback. On stop
//! the store is reordered to match the tree with one silent
//! [`RecordStore::reorder`], so no per-record add/remove notifications fire.
//!
//! [`CollectionView::move_item`] and [`connected_drop`] play the drag
//! library's part for callers without one.

use collectionview_core::{Cid, Record, RecordStore, StoreChange};
use tracing::debug;

use crate::addressing::SelectionKey;
use crate::collection_view::CollectionView;
use crate::error::CollectionError;
use crate::events::CollectionEvent;
use crate::selection::SetOptions;

impl<R: Record> CollectionView<R> {
    /// A drag started on the container of `cid`.
    pub fn sort_start(&mut self, cid: Cid) -> Result<(), CollectionError> {
        self.sync()?;
        if let Some(model) = self.store.get(cid) {
            self.emit(CollectionEvent::SortStart(model));
        }
        Ok(())
    }

    /// The dragged container moved to a new position.
    pub fn sort_change(&mut self, cid: Cid) {
        if let Some(model) = self.store.get(cid) {
            self.emit(CollectionEvent::SortChange(model));
        }
    }

    /// A drag ended. Reorders the store to the tree's order; a record whose
    /// container left the tree is dropped from the store.
    ///
    /// Emits `Reorder`, `UpdateDependentControls`, then `SortStop`. A
    /// selected record dragged out also yields `SelectionChanged` first.
    pub fn sort_stop(&mut self, cid: Cid) -> Result<(), CollectionError> {
        let Some(model) = self.store.get(cid) else {
            return Ok(());
        };
        let new_index = self.tree.position_of(cid);
        let detached = new_index.is_none();
        if detached {
            self.store.detach(cid);
            self.revalidate("drag-out");
            if self.anchor == Some(cid) {
                self.anchor = None;
            }
        }

        let order = self.tree.item_order();
        let moved = order
            .iter()
            .zip(self.store.cids())
            .filter(|(a, b)| **a != *b)
            .count();
        self.store.reorder(&order);
        // The tree already shows this order.
        self.discard_pending(StoreChange::Reorder);

        debug!(message = "collection.reorder", moved, detached);
        self.emit(CollectionEvent::Reorder);
        self.update_dependent_controls();
        self.emit(CollectionEvent::SortStop { model, new_index });
        Ok(())
    }

    /// A container dragged out of another view landed in this one.
    ///
    /// Inserts the record at the container's position and selects it.
    pub fn sort_receive(&mut self, sender: &RecordStore<R>, cid: Cid) -> Result<(), CollectionError> {
        if sender.ptr_eq(&self.store) {
            return Ok(());
        }
        let Some(model) = sender.get(cid) else {
            return Ok(());
        };
        let at = self.tree.position_of(cid).unwrap_or(self.tree.len());
        self.store.insert(at, model.clone());
        self.sync()?;
        if self.options.selectable {
            self.set_selected_one(Some(SelectionKey::Model(model)), SetOptions::default())?;
        }
        Ok(())
    }

    /// Drag the container of `cid` to position `to` within this view.
    ///
    /// Returns `false` without any callback when the container is missing or
    /// not draggable.
    pub fn move_item(&mut self, cid: Cid, to: usize) -> Result<bool, CollectionError> {
        self.sync()?;
        let Some(from) = self.tree.position_of(cid) else {
            return Ok(false);
        };
        if !self.tree.is_draggable(from) {
            return Ok(false);
        }
        self.sort_start(cid)?;
        self.tree.move_container(from, to);
        if from != to {
            self.sort_change(cid);
        }
        self.sort_stop(cid)?;
        Ok(true)
    }
}

/// Drag the container of `cid` from `source` into `target` at `at`.
///
/// Runs the callbacks in drag-library order: start on the source, receive on
/// the target, stop on the source. Returns `false` when the container is
/// missing or not draggable.
pub fn connected_drop<R: Record>(
    source: &mut CollectionView<R>,
    target: &mut CollectionView<R>,
    cid: Cid,
    at: usize,
) -> Result<bool, CollectionError> {
    source.sync()?;
    target.sync()?;
    let Some(from) = source.tree.position_of(cid) else {
        return Ok(false);
    };
    if !source.tree.is_draggable(from) {
        return Ok(false);
    }
    source.sort_start(cid)?;
    let Some(container) = source.tree.take_container(cid) else {
        return Ok(false);
    };
    target.tree.insert_container(at, container);
    let sender = source.store.clone();
    target.sort_receive(&sender, cid)?;
    source.sort_stop(cid)?;
    Ok(true)
}
