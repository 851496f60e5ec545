#![forbid(unsafe_code)]

//! Record identity.
//!
//! Every record managed by a [`RecordStore`](crate::store::RecordStore) is
//! wrapped in a [`Model`], which pairs the caller's data with a transient
//! identity handle ([`Cid`]). The cid is allocated when the record is wrapped
//! and never changes for the lifetime of the model, so it stays valid when the
//! same model moves between stores (e.g. a drag between connected lists).
//!
//! A record may additionally expose a *persistent* id through [`Record::id`].
//! Persistent ids are optional: freshly created records typically have none
//! until they are saved somewhere.

use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CID: AtomicU64 = AtomicU64::new(1);

/// Transient identity handle for a model.
///
/// Unique within the process; `0` is never allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cid(u64);

impl Cid {
    /// Allocate a fresh cid.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_CID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// A value that can live in a record store.
pub trait Record: 'static {
    /// Persistent identifier type.
    type Id: Clone + Eq + Hash + fmt::Debug;

    /// Persistent id, if the record has been assigned one.
    fn id(&self) -> Option<Self::Id>;
}

/// A record together with its identity handle.
#[derive(Debug)]
pub struct Model<R> {
    cid: Cid,
    record: R,
}

/// Shared reference to a model. Comparing two `ModelRef`s by cid is the
/// canonical "same record" test.
pub type ModelRef<R> = Rc<Model<R>>;

impl<R: Record> Model<R> {
    /// Wrap `record`, allocating a new cid.
    #[must_use]
    pub fn new(record: R) -> ModelRef<R> {
        Rc::new(Self {
            cid: Cid::next(),
            record,
        })
    }

    /// Persistent id, if any.
    #[must_use]
    pub fn id(&self) -> Option<R::Id> {
        self.record.id()
    }
}

impl<R> Model<R> {
    /// Transient identity handle.
    #[inline]
    #[must_use]
    pub fn cid(&self) -> Cid {
        self.cid
    }

    /// Borrow the wrapped record.
    #[inline]
    #[must_use]
    pub fn record(&self) -> &R {
        &self.record
    }
}

impl<R> std::ops::Deref for Model<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.record
    }
}
