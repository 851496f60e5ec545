#![forbid(unsafe_code)]

//! Outbound notifications.
//!
//! Every notification a collection view emits is a [`CollectionEvent`],
//! delivered synchronously to subscribers registered with
//! [`CollectionView::subscribe`](crate::collection_view::CollectionView::subscribe).
//!
//! # Ordering
//!
//! Within one render pass the order is fixed: `Render`, then at most one
//! `SelectionChanged`, then exactly one `UpdateDependentControls`. A drag stop
//! emits `Reorder`, `UpdateDependentControls`, then `SortStop`.
//!
//! Handlers run while the view is borrowed; they observe events and must not
//! call back into the emitting view.

use std::fmt;

use collectionview_core::{Cid, ModelRef, Record, StoreChange};

/// A notification emitted by a collection view.
pub enum CollectionEvent<R> {
    /// Selection membership changed.
    SelectionChanged {
        new: Vec<ModelRef<R>>,
        old: Vec<ModelRef<R>>,
    },
    /// Dependent controls should refresh; carries the current selection.
    UpdateDependentControls(Vec<ModelRef<R>>),
    /// A render pass finished building the item tree.
    Render,
    /// The store was reordered to match the rendered order.
    Reorder,
    /// An item was double clicked.
    DoubleClick(ModelRef<R>),
    /// A drag started on this item.
    SortStart(ModelRef<R>),
    /// The dragged item moved over a new position.
    SortChange(ModelRef<R>),
    /// A drag ended. `new_index` is `None` when the item left this list.
    SortStop {
        model: ModelRef<R>,
        new_index: Option<usize>,
    },
    /// The store reported a change and the view reacted to it.
    StoreChanged(StoreChange),
}

impl<R> CollectionEvent<R> {
    /// Event name as hosts usually spell it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SelectionChanged { .. } => "selectionChanged",
            Self::UpdateDependentControls(_) => "updateDependentControls",
            Self::Render => "render",
            Self::Reorder => "reorder",
            Self::DoubleClick(_) => "doubleClick",
            Self::SortStart(_) => "sortStart",
            Self::SortChange(_) => "sortChange",
            Self::SortStop { .. } => "sortStop",
            Self::StoreChanged(_) => "storeChanged",
        }
    }
}

impl<R: Record> CollectionEvent<R> {
    /// Models carried by the event, newest selection first for
    /// `SelectionChanged`.
    #[must_use]
    pub fn models(&self) -> Vec<ModelRef<R>> {
        match self {
            Self::SelectionChanged { new, .. } | Self::UpdateDependentControls(new) => new.clone(),
            Self::DoubleClick(m) | Self::SortStart(m) | Self::SortChange(m) => vec![m.clone()],
            Self::SortStop { model, .. } => vec![model.clone()],
            Self::Render | Self::Reorder | Self::StoreChanged(_) => Vec::new(),
        }
    }
}

impl<R> Clone for CollectionEvent<R> {
    fn clone(&self) -> Self {
        match self {
            Self::SelectionChanged { new, old } => Self::SelectionChanged {
                new: new.clone(),
                old: old.clone(),
            },
            Self::UpdateDependentControls(m) => Self::UpdateDependentControls(m.clone()),
            Self::Render => Self::Render,
            Self::Reorder => Self::Reorder,
            Self::DoubleClick(m) => Self::DoubleClick(m.clone()),
            Self::SortStart(m) => Self::SortStart(m.clone()),
            Self::SortChange(m) => Self::SortChange(m.clone()),
            Self::SortStop { model, new_index } => Self::SortStop {
                model: model.clone(),
                new_index: *new_index,
            },
            Self::StoreChanged(c) => Self::StoreChanged(*c),
        }
    }
}

fn cids<R: Record>(models: &[ModelRef<R>]) -> Vec<Cid> {
    models.iter().map(|m| m.cid()).collect()
}

impl<R: Record> fmt::Debug for CollectionEvent<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectionChanged { new, old } => f
                .debug_struct("SelectionChanged")
                .field("new", &cids(new))
                .field("old", &cids(old))
                .finish(),
            Self::UpdateDependentControls(m) => f
                .debug_tuple("UpdateDependentControls")
                .field(&cids(m))
                .finish(),
            Self::Render => f.write_str("Render"),
            Self::Reorder => f.write_str("Reorder"),
            Self::DoubleClick(m) => f.debug_tuple("DoubleClick").field(&m.cid()).finish(),
            Self::SortStart(m) => f.debug_tuple("SortStart").field(&m.cid()).finish(),
            Self::SortChange(m) => f.debug_tuple("SortChange").field(&m.cid()).finish(),
            Self::SortStop { model, new_index } => f
                .debug_struct("SortStop")
                .field("model", &model.cid())
                .field("new_index", new_index)
                .finish(),
            Self::StoreChanged(c) => f.debug_tuple("StoreChanged").field(c).finish(),
        }
    }
}
