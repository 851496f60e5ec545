#![forbid(unsafe_code)]

//! Item views and how they are constructed.
//!
//! A collection view builds one [`ItemView`] per record on every render pass.
//! The view to build is resolved in this order:
//!
//! 1. the item template, if configured (a [`TemplateView`] is built);
//! 2. the configured model view constructor;
//! 3. the options' own default view constructor;
//! 4. the explicitly shared [`DefaultViews`] fallback, if one was passed in.
//!
//! If none applies the render pass fails with
//! [`CollectionError::NoViewForModel`](crate::error::CollectionError).

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use collectionview_core::{Model, ModelRef, Record};

/// Free-form options forwarded to every model view constructor.
pub type ViewOptions = BTreeMap<String, String>;

/// Builds an item view for a model.
pub type ViewConstructor<R> = Rc<dyn Fn(&ModelRef<R>, &ViewOptions) -> Box<dyn ItemView<R>>>;

/// Renders a record to item content.
pub type ItemTemplate<R> = Rc<dyn Fn(&R) -> String>;

/// Predicate over models (selectable / visible / sortable filters).
pub type ModelFilter<R> = Rc<dyn Fn(&Model<R>) -> bool>;

/// A rendered view for one record.
pub trait ItemView<R: Record> {
    /// Tag of the view's own element. Table hosts require `tr`.
    fn element_tag(&self) -> &str {
        "div"
    }

    /// Render `model`. Returning `None` hides the item; it stays in the tree
    /// and remains addressable.
    fn render(&mut self, model: &Model<R>) -> Option<String>;
}

/// Item view backed by an [`ItemTemplate`].
pub struct TemplateView<R> {
    template: ItemTemplate<R>,
    tag: &'static str,
}

impl<R: Record> TemplateView<R> {
    /// Build a template view whose element uses `tag`.
    #[must_use]
    pub fn new(template: ItemTemplate<R>, tag: &'static str) -> Self {
        Self { template, tag }
    }
}

impl<R: Record> ItemView<R> for TemplateView<R> {
    fn element_tag(&self) -> &str {
        self.tag
    }

    fn render(&mut self, model: &Model<R>) -> Option<String> {
        Some((self.template)(model.record()))
    }
}

/// A default view constructor shared between several collection views.
///
/// Cloning yields another handle to the same slot. Views only consult it when
/// handed a handle explicitly via
/// [`CollectionOptions::default_views`](crate::options::CollectionOptions::default_views).
pub struct DefaultViews<R> {
    slot: Rc<RefCell<Option<ViewConstructor<R>>>>,
}

impl<R> Clone for DefaultViews<R> {
    fn clone(&self) -> Self {
        Self {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl<R> Default for DefaultViews<R> {
    fn default() -> Self {
        Self {
            slot: Rc::new(RefCell::new(None)),
        }
    }
}

impl<R> std::fmt::Debug for DefaultViews<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultViews")
            .field("set", &self.slot.borrow().is_some())
            .finish()
    }
}

impl<R: Record> DefaultViews<R> {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shared fallback constructor.
    pub fn set(&self, constructor: ViewConstructor<R>) {
        *self.slot.borrow_mut() = Some(constructor);
    }

    /// Remove the shared fallback constructor.
    pub fn clear(&self) {
        *self.slot.borrow_mut() = None;
    }

    /// Current fallback constructor.
    #[must_use]
    pub fn get(&self) -> Option<ViewConstructor<R>> {
        self.slot.borrow().clone()
    }
}

/// Wrap a closure as a [`ViewConstructor`].
pub fn view_constructor<R, V, F>(f: F) -> ViewConstructor<R>
where
    R: Record,
    V: ItemView<R> + 'static,
    F: Fn(&ModelRef<R>, &ViewOptions) -> V + 'static,
{
    Rc::new(move |model: &ModelRef<R>, options: &ViewOptions| {
        Box::new(f(model, options)) as Box<dyn ItemView<R>>
    })
}
