#![forbid(unsafe_code)]

//! The selection set.
//!
//! An ordered, duplicate-free list of selected models. Order is insertion
//! order and only matters for output; equality between selections is set
//! equality.
//!
//! # Invariants
//!
//! 1. No cid appears twice.
//! 2. After every commit through a collection view, every member is present
//!    in the store and passes the selectability filter (see
//!    [`retain_valid`]).

use collectionview_core::{Cid, ModelRef, Record, RecordStore};

use crate::view::ModelFilter;

/// Options for selection writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetOptions {
    /// Suppress the `SelectionChanged` notification.
    pub silent: bool,
}

impl SetOptions {
    /// Options with `silent` set.
    #[must_use]
    pub const fn silent() -> Self {
        Self { silent: true }
    }
}

/// Cids whose selection state changed in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionDiff {
    /// Newly selected.
    pub added: Vec<Cid>,
    /// No longer selected.
    pub removed: Vec<Cid>,
}

impl SelectionDiff {
    /// Whether membership changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered set of selected models.
pub struct SelectionSet<R> {
    members: Vec<ModelRef<R>>,
}

impl<R> Default for SelectionSet<R> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<R> Clone for SelectionSet<R> {
    fn clone(&self) -> Self {
        Self {
            members: self.members.clone(),
        }
    }
}

impl<R: Record> std::fmt::Debug for SelectionSet<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cids()).finish()
    }
}

impl<R: Record> SelectionSet<R> {
    /// Empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from candidates, dropping repeated cids.
    #[must_use]
    pub fn from_models(models: impl IntoIterator<Item = ModelRef<R>>) -> Self {
        let mut members: Vec<ModelRef<R>> = Vec::new();
        for model in models {
            if !members.iter().any(|m| m.cid() == model.cid()) {
                members.push(model);
            }
        }
        Self { members }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `cid` is a member.
    #[must_use]
    pub fn contains(&self, cid: Cid) -> bool {
        self.members.iter().any(|m| m.cid() == cid)
    }

    /// Members in insertion order.
    #[must_use]
    pub fn models(&self) -> &[ModelRef<R>] {
        &self.members
    }

    /// Member cids in insertion order.
    #[must_use]
    pub fn cids(&self) -> Vec<Cid> {
        self.members.iter().map(|m| m.cid()).collect()
    }

    /// Set equality with `other`.
    #[must_use]
    pub fn same_members(&self, other: &Self) -> bool {
        self.len() == other.len() && self.members.iter().all(|m| other.contains(m.cid()))
    }

    /// Membership difference going from `self` to `next`.
    #[must_use]
    pub fn diff(&self, next: &Self) -> SelectionDiff {
        SelectionDiff {
            added: next
                .members
                .iter()
                .map(|m| m.cid())
                .filter(|cid| !self.contains(*cid))
                .collect(),
            removed: self
                .members
                .iter()
                .map(|m| m.cid())
                .filter(|cid| !next.contains(*cid))
                .collect(),
        }
    }

    /// Keep only members satisfying `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ModelRef<R>) -> bool) {
        self.members.retain(|m| keep(m));
    }
}

/// Drop members absent from `store` or rejected by `selectable`.
///
/// Runs on every commit, whatever the source of the candidates: the store
/// may have changed since they were computed.
pub fn retain_valid<R: Record>(
    selection: &mut SelectionSet<R>,
    store: &RecordStore<R>,
    selectable: Option<&ModelFilter<R>>,
) {
    selection.retain(|m| store.contains(m.cid()) && selectable.is_none_or(|f| f(&**m)));
}
