#![forbid(unsafe_code)]

//! Ordered record store with change notification.
//!
//! [`RecordStore<R>`] is a shared handle (`Rc<RefCell<..>>`): cloning it
//! yields another handle to the same ordered collection. Views observe it
//! through [`RecordStore::subscribe`].
//!
//! # Notifications
//!
//! | Operation        | Emits                                   |
//! |------------------|-----------------------------------------|
//! | `add`/`insert`   | [`StoreChange::Add`] per record          |
//! | `remove`         | [`StoreChange::Remove`] if present       |
//! | `reset`          | one [`StoreChange::Reset`]               |
//! | `reorder`        | one [`StoreChange::Reorder`]             |
//! | `detach`         | nothing                                  |
//!
//! Notifications are delivered after the internal borrow is released, so a
//! subscriber may read the store from its callback.
//!
//! # Invariants
//!
//! 1. A cid appears at most once.
//! 2. `by_cid` and `order` always hold the same set of cids.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::trace;

use crate::model::{Cid, Model, ModelRef, Record};
use crate::subscription::{Subscribers, Subscription};

/// A mutation observed on a [`RecordStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// A record was inserted at `index`.
    Add { cid: Cid, index: usize },
    /// A record was removed from `index`.
    Remove { cid: Cid, index: usize },
    /// The whole content was replaced.
    Reset,
    /// Records were reindexed without content change.
    Reorder,
}

struct StoreInner<R> {
    order: Vec<ModelRef<R>>,
    by_cid: AHashMap<Cid, ModelRef<R>>,
}

impl<R> StoreInner<R> {
    fn position(&self, cid: Cid) -> Option<usize> {
        self.order.iter().position(|m| m.cid() == cid)
    }
}

/// Shared ordered collection of [`Model`]s.
pub struct RecordStore<R> {
    inner: Rc<RefCell<StoreInner<R>>>,
    subscribers: Rc<Subscribers<StoreChange>>,
}

// Manual Clone: shares the same Rc.
impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<R> std::fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("RecordStore")
            .field("len", &inner.order.len())
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

impl<R: Record> Default for RecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> RecordStore<R> {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                order: Vec::new(),
                by_cid: AHashMap::new(),
            })),
            subscribers: Rc::new(Subscribers::new()),
        }
    }

    /// Create a store from records, wrapping each in a fresh [`Model`].
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.borrow_mut();
            for record in records {
                let model = Model::new(record);
                inner.by_cid.insert(model.cid(), Rc::clone(&model));
                inner.order.push(model);
            }
        }
        store
    }

    /// Whether two handles refer to the same store.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Observe mutations. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&StoreChange) + 'static) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    /// Append a model. A model already present is left in place.
    pub fn add(&self, model: ModelRef<R>) -> Cid {
        let len = self.len();
        self.insert(len, model)
    }

    /// Wrap and append a record.
    pub fn push(&self, record: R) -> ModelRef<R> {
        let model = Model::new(record);
        self.add(Rc::clone(&model));
        model
    }

    /// Append several models, emitting one `Add` each.
    pub fn add_many(&self, models: impl IntoIterator<Item = ModelRef<R>>) {
        for model in models {
            self.add(model);
        }
    }

    /// Insert a model at `index` (clamped to the length).
    pub fn insert(&self, index: usize, model: ModelRef<R>) -> Cid {
        let cid = model.cid();
        let change = {
            let mut inner = self.inner.borrow_mut();
            if inner.by_cid.contains_key(&cid) {
                return cid;
            }
            let index = index.min(inner.order.len());
            inner.by_cid.insert(cid, Rc::clone(&model));
            inner.order.insert(index, model);
            StoreChange::Add { cid, index }
        };
        self.notify(change);
        cid
    }

    /// Remove the model with `cid`, returning it if it was present.
    pub fn remove(&self, cid: Cid) -> Option<ModelRef<R>> {
        let (model, index) = self.take(cid)?;
        self.notify(StoreChange::Remove { cid, index });
        Some(model)
    }

    /// Replace the whole content.
    pub fn reset(&self, models: impl IntoIterator<Item = ModelRef<R>>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.order.clear();
            inner.by_cid.clear();
            for model in models {
                if inner.by_cid.contains_key(&model.cid()) {
                    continue;
                }
                inner.by_cid.insert(model.cid(), Rc::clone(&model));
                inner.order.push(model);
            }
        }
        self.notify(StoreChange::Reset);
    }

    /// Reindex without per-record add/remove events.
    ///
    /// Records named in `order` are moved, in that order, behind every record
    /// not named. Unknown cids and repeats are ignored. Emits a single
    /// [`StoreChange::Reorder`] when the order actually changed.
    pub fn reorder(&self, order: &[Cid]) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let mut named: Vec<ModelRef<R>> = Vec::with_capacity(order.len());
            for cid in order {
                if named.iter().any(|m| m.cid() == *cid) {
                    continue;
                }
                if let Some(model) = inner.by_cid.get(cid) {
                    named.push(Rc::clone(model));
                }
            }
            let mut next: Vec<ModelRef<R>> = inner
                .order
                .iter()
                .filter(|m| !named.iter().any(|n| n.cid() == m.cid()))
                .cloned()
                .collect();
            next.extend(named);
            let changed = next
                .iter()
                .zip(inner.order.iter())
                .any(|(a, b)| a.cid() != b.cid());
            inner.order = next;
            changed
        };
        if changed {
            self.notify(StoreChange::Reorder);
        }
    }

    /// Remove the model with `cid` without notifying anyone.
    pub fn detach(&self, cid: Cid) -> Option<ModelRef<R>> {
        let (model, _) = self.take(cid)?;
        trace!(message = "store.detach", cid = cid.get());
        Some(model)
    }

    /// Look up a model by cid.
    #[must_use]
    pub fn get(&self, cid: Cid) -> Option<ModelRef<R>> {
        self.inner.borrow().by_cid.get(&cid).cloned()
    }

    /// Look up a model by persistent id.
    #[must_use]
    pub fn get_by_id(&self, id: &R::Id) -> Option<ModelRef<R>> {
        self.inner
            .borrow()
            .order
            .iter()
            .find(|m| m.id().as_ref() == Some(id))
            .cloned()
    }

    /// Model at `index`.
    #[must_use]
    pub fn at(&self, index: usize) -> Option<ModelRef<R>> {
        self.inner.borrow().order.get(index).cloned()
    }

    /// Position of `cid`.
    #[must_use]
    pub fn index_of(&self, cid: Cid) -> Option<usize> {
        self.inner.borrow().position(cid)
    }

    /// Whether `cid` is present.
    #[must_use]
    pub fn contains(&self, cid: Cid) -> bool {
        self.inner.borrow().by_cid.contains_key(&cid)
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().order.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().order.is_empty()
    }

    /// Snapshot of all models in order.
    #[must_use]
    pub fn models(&self) -> Vec<ModelRef<R>> {
        self.inner.borrow().order.clone()
    }

    /// Snapshot of all cids in order.
    #[must_use]
    pub fn cids(&self) -> Vec<Cid> {
        self.inner.borrow().order.iter().map(|m| m.cid()).collect()
    }

    fn take(&self, cid: Cid) -> Option<(ModelRef<R>, usize)> {
        let mut inner = self.inner.borrow_mut();
        let index = inner.position(cid)?;
        inner.by_cid.remove(&cid);
        Some((inner.order.remove(index), index))
    }

    fn notify(&self, change: StoreChange) {
        trace!(message = "store.change", ?change);
        self.subscribers.emit(&change);
    }
}
