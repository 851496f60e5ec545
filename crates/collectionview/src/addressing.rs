#![forbid(unsafe_code)]

//! Addressing modes for selection reads and writes.
//!
//! A selection can be expressed five ways: by cid, by persistent id, by model,
//! by view handle, or by visual offset. [`Selector`] carries a list of values
//! in one mode; [`SelectionKey`] carries a single value. Each mode has its
//! own resolver that maps values to the models they currently denote.
//! Values that do not resolve are dropped; that is not an error.

use std::fmt;

use collectionview_core::{Cid, ModelRef, Record, RecordStore};

use crate::binding::{BindingRegistry, ViewHandle};
use crate::host::ItemTree;
use crate::selection::SelectionSet;

/// How selection values are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressingMode {
    /// Transient identity handle.
    Cid,
    /// Persistent id.
    Id,
    /// Model reference.
    #[default]
    Model,
    /// View handle from the current render pass.
    View,
    /// Zero-based position among visible items.
    Offset,
}

impl AddressingMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 5] = [Self::Cid, Self::Id, Self::Model, Self::View, Self::Offset];
}

/// A single selection value.
pub enum SelectionKey<R: Record> {
    Cid(Cid),
    Id(R::Id),
    Model(ModelRef<R>),
    View(ViewHandle),
    Offset(usize),
}

/// A list of selection values in one addressing mode.
pub enum Selector<R: Record> {
    Cids(Vec<Cid>),
    Ids(Vec<R::Id>),
    Models(Vec<ModelRef<R>>),
    Views(Vec<ViewHandle>),
    Offsets(Vec<usize>),
}

impl<R: Record> SelectionKey<R> {
    /// Mode of this value.
    #[must_use]
    pub const fn mode(&self) -> AddressingMode {
        match self {
            Self::Cid(_) => AddressingMode::Cid,
            Self::Id(_) => AddressingMode::Id,
            Self::Model(_) => AddressingMode::Model,
            Self::View(_) => AddressingMode::View,
            Self::Offset(_) => AddressingMode::Offset,
        }
    }
}

impl<R: Record> Selector<R> {
    /// Empty selector in `mode`.
    #[must_use]
    pub fn empty(mode: AddressingMode) -> Self {
        match mode {
            AddressingMode::Cid => Self::Cids(Vec::new()),
            AddressingMode::Id => Self::Ids(Vec::new()),
            AddressingMode::Model => Self::Models(Vec::new()),
            AddressingMode::View => Self::Views(Vec::new()),
            AddressingMode::Offset => Self::Offsets(Vec::new()),
        }
    }

    /// Mode of this selector.
    #[must_use]
    pub const fn mode(&self) -> AddressingMode {
        match self {
            Self::Cids(_) => AddressingMode::Cid,
            Self::Ids(_) => AddressingMode::Id,
            Self::Models(_) => AddressingMode::Model,
            Self::Views(_) => AddressingMode::View,
            Self::Offsets(_) => AddressingMode::Offset,
        }
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Cids(v) => v.len(),
            Self::Ids(v) => v.len(),
            Self::Models(v) => v.len(),
            Self::Views(v) => v.len(),
            Self::Offsets(v) => v.len(),
        }
    }

    /// Whether no values are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First value, if any.
    #[must_use]
    pub fn first(&self) -> Option<SelectionKey<R>> {
        match self {
            Self::Cids(v) => v.first().copied().map(SelectionKey::Cid),
            Self::Ids(v) => v.first().cloned().map(SelectionKey::Id),
            Self::Models(v) => v.first().cloned().map(SelectionKey::Model),
            Self::Views(v) => v.first().copied().map(SelectionKey::View),
            Self::Offsets(v) => v.first().copied().map(SelectionKey::Offset),
        }
    }
}

impl<R: Record> From<SelectionKey<R>> for Selector<R> {
    fn from(key: SelectionKey<R>) -> Self {
        match key {
            SelectionKey::Cid(v) => Self::Cids(vec![v]),
            SelectionKey::Id(v) => Self::Ids(vec![v]),
            SelectionKey::Model(v) => Self::Models(vec![v]),
            SelectionKey::View(v) => Self::Views(vec![v]),
            SelectionKey::Offset(v) => Self::Offsets(vec![v]),
        }
    }
}

impl<R: Record> Clone for SelectionKey<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Cid(v) => Self::Cid(*v),
            Self::Id(v) => Self::Id(v.clone()),
            Self::Model(v) => Self::Model(v.clone()),
            Self::View(v) => Self::View(*v),
            Self::Offset(v) => Self::Offset(*v),
        }
    }
}

impl<R: Record> Clone for Selector<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Cids(v) => Self::Cids(v.clone()),
            Self::Ids(v) => Self::Ids(v.clone()),
            Self::Models(v) => Self::Models(v.clone()),
            Self::Views(v) => Self::Views(v.clone()),
            Self::Offsets(v) => Self::Offsets(v.clone()),
        }
    }
}

// Models compare and print by cid.
impl<R: Record> PartialEq for SelectionKey<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Cid(a), Self::Cid(b)) => a == b,
            (Self::Id(a), Self::Id(b)) => a == b,
            (Self::Model(a), Self::Model(b)) => a.cid() == b.cid(),
            (Self::View(a), Self::View(b)) => a == b,
            (Self::Offset(a), Self::Offset(b)) => a == b,
            _ => false,
        }
    }
}

impl<R: Record> PartialEq for Selector<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Cids(a), Self::Cids(b)) => a == b,
            (Self::Ids(a), Self::Ids(b)) => a == b,
            (Self::Models(a), Self::Models(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.cid() == y.cid())
            }
            (Self::Views(a), Self::Views(b)) => a == b,
            (Self::Offsets(a), Self::Offsets(b)) => a == b,
            _ => false,
        }
    }
}

impl<R: Record> fmt::Debug for SelectionKey<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cid(v) => f.debug_tuple("Cid").field(v).finish(),
            Self::Id(v) => f.debug_tuple("Id").field(v).finish(),
            Self::Model(v) => f.debug_tuple("Model").field(&v.cid()).finish(),
            Self::View(v) => f.debug_tuple("View").field(v).finish(),
            Self::Offset(v) => f.debug_tuple("Offset").field(v).finish(),
        }
    }
}

impl<R: Record> fmt::Debug for Selector<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cids(v) => f.debug_tuple("Cids").field(v).finish(),
            Self::Ids(v) => f.debug_tuple("Ids").field(v).finish(),
            Self::Models(v) => {
                let cids: Vec<Cid> = v.iter().map(|m| m.cid()).collect();
                f.debug_tuple("Models").field(&cids).finish()
            }
            Self::Views(v) => f.debug_tuple("Views").field(v).finish(),
            Self::Offsets(v) => f.debug_tuple("Offsets").field(v).finish(),
        }
    }
}

/// What resolvers may consult.
pub struct Resolver<'a, R: Record> {
    pub store: &'a RecordStore<R>,
    pub bindings: &'a BindingRegistry<R>,
    pub tree: &'a ItemTree,
}

impl<R: Record> Resolver<'_, R> {
    /// Resolve a selector to the models it currently denotes, in input order.
    #[must_use]
    pub fn resolve(&self, selector: &Selector<R>) -> Vec<ModelRef<R>> {
        match selector {
            Selector::Cids(cids) => self.by_cid(cids),
            Selector::Ids(ids) => self.by_id(ids),
            Selector::Models(models) => self.by_model(models),
            Selector::Views(handles) => self.by_view(handles),
            Selector::Offsets(offsets) => self.by_offset(offsets),
        }
    }

    fn by_cid(&self, cids: &[Cid]) -> Vec<ModelRef<R>> {
        cids.iter().filter_map(|cid| self.store.get(*cid)).collect()
    }

    fn by_id(&self, ids: &[R::Id]) -> Vec<ModelRef<R>> {
        ids.iter().filter_map(|id| self.store.get_by_id(id)).collect()
    }

    fn by_model(&self, models: &[ModelRef<R>]) -> Vec<ModelRef<R>> {
        models
            .iter()
            .filter_map(|m| self.store.get(m.cid()))
            .collect()
    }

    fn by_view(&self, handles: &[ViewHandle]) -> Vec<ModelRef<R>> {
        handles
            .iter()
            .filter_map(|h| self.bindings.resolve(*h))
            .filter_map(|b| self.store.get(b.model().cid()))
            .collect()
    }

    // Walks visible containers in visual order, as the user sees them.
    fn by_offset(&self, offsets: &[usize]) -> Vec<ModelRef<R>> {
        self.tree
            .visible()
            .enumerate()
            .filter(|(offset, _)| offsets.contains(offset))
            .filter_map(|(_, c)| self.store.get(c.item_id()))
            .collect()
    }

    /// Express `selection` in `mode`.
    #[must_use]
    pub fn read(&self, selection: &SelectionSet<R>, mode: AddressingMode) -> Selector<R> {
        let members = selection.models();
        match mode {
            AddressingMode::Cid => Selector::Cids(selection.cids()),
            AddressingMode::Id => Selector::Ids(members.iter().filter_map(|m| m.id()).collect()),
            AddressingMode::Model => Selector::Models(members.to_vec()),
            AddressingMode::View => Selector::Views(
                members
                    .iter()
                    .filter_map(|m| self.bindings.handle(m.cid()))
                    .collect(),
            ),
            AddressingMode::Offset => Selector::Offsets(
                self.tree
                    .visible()
                    .enumerate()
                    .filter(|(_, c)| selection.contains(c.item_id()))
                    .map(|(offset, _)| offset)
                    .collect(),
            ),
        }
    }
}
