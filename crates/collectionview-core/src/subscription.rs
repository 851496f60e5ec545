#![forbid(unsafe_code)]

//! Weak subscriber lists with RAII unsubscription.
//!
//! # Design
//!
//! A [`Subscribers<T>`] holds callbacks as `Weak<dyn Fn(&T)>`. The strong
//! reference lives inside the [`Subscription`] guard returned from
//! [`Subscribers::subscribe`]; dropping the guard makes the callback
//! unreachable. Dead entries are pruned lazily on the next
//! [`Subscribers::emit`].
//!
//! # Failure Modes
//!
//! - **Re-entrant emit**: callbacks run after the subscriber list borrow is
//!   released, so a callback may subscribe or emit again. It must not,
//!   however, try to mutably borrow whatever object is currently emitting.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

/// Ordered list of weakly held callbacks.
pub struct Subscribers<T> {
    callbacks: RefCell<Vec<CallbackWeak<T>>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            callbacks: RefCell::new(Vec::new()),
        }
    }
}

impl<T> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.callbacks.borrow().len())
            .finish()
    }
}

impl<T: 'static> Subscribers<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`. It stays registered until the returned guard is
    /// dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.callbacks.borrow_mut().push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Invoke every live callback in registration order.
    pub fn emit(&self, value: &T) {
        let live: Vec<CallbackRc<T>> = {
            let mut callbacks = self.callbacks.borrow_mut();
            callbacks.retain(|w| w.strong_count() > 0);
            callbacks.iter().filter_map(Weak::upgrade).collect()
        };
        for cb in &live {
            cb(value);
        }
    }

    /// Number of registered callbacks, including dead ones not yet pruned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Whether no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.borrow().is_empty()
    }
}

/// RAII guard for a subscribed callback.
///
/// Dropping the guard drops the only strong reference to the callback.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
