#![forbid(unsafe_code)]

//! Core: records, identity handles, the record store, and input events.
//!
//! # Role
//! `collectionview-core` holds everything a collection view consumes from
//! its surroundings: the ordered [`RecordStore`](store::RecordStore) it
//! renders, the [`Cid`](model::Cid) identity handles it tracks selection
//! with, and the normalized input events the host feeds it.
//!
//! # How it fits in the system
//! The engine (`collectionview`) subscribes to a store, reconciles a rendered
//! item tree against it, and maintains a selection. Nothing in this crate
//! knows about views or selection.

pub mod event;
pub mod model;
pub mod store;
pub mod subscription;

pub use model::{Cid, Model, ModelRef, Record};
pub use store::{RecordStore, StoreChange};
pub use subscription::{Subscribers, Subscription};
