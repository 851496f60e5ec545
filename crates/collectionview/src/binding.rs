#![forbid(unsafe_code)]

//! Item view bindings.
//!
//! A [`BindingRegistry`] pairs each rendered record with its view and its
//! container for exactly one render pass. The registry of the previous pass
//! is discarded when a new pass starts; views are never reused.

use ahash::AHashMap;
use collectionview_core::{Cid, ModelRef, Record};

use crate::host::ContainerKey;
use crate::view::ItemView;

/// Identifies a render pass. Increases by one per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RenderPass(u64);

impl RenderPass {
    /// The pass after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle to the view bound to a record during one render pass.
///
/// Handles from an earlier pass no longer resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewHandle {
    /// Cid of the bound record.
    pub cid: Cid,
    /// Pass the view was built in.
    pub pass: RenderPass,
}

/// One record's view and container.
pub struct ItemBinding<R: Record> {
    model: ModelRef<R>,
    view: Box<dyn ItemView<R>>,
    container: ContainerKey,
}

impl<R: Record> ItemBinding<R> {
    /// Bound model.
    #[must_use]
    pub fn model(&self) -> &ModelRef<R> {
        &self.model
    }

    /// Bound view.
    #[must_use]
    pub fn view(&self) -> &dyn ItemView<R> {
        self.view.as_ref()
    }

    /// Key of the container in the item tree.
    #[must_use]
    pub const fn container(&self) -> ContainerKey {
        self.container
    }
}

impl<R: Record> std::fmt::Debug for ItemBinding<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemBinding")
            .field("cid", &self.model.cid())
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

/// Bindings for one render pass, keyed by cid.
pub struct BindingRegistry<R: Record> {
    pass: RenderPass,
    by_cid: AHashMap<Cid, ItemBinding<R>>,
}

impl<R: Record> Default for BindingRegistry<R> {
    fn default() -> Self {
        Self {
            pass: RenderPass::default(),
            by_cid: AHashMap::new(),
        }
    }
}

impl<R: Record> std::fmt::Debug for BindingRegistry<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry")
            .field("pass", &self.pass)
            .field("len", &self.by_cid.len())
            .finish()
    }
}

impl<R: Record> BindingRegistry<R> {
    /// Fresh, empty registry for `pass`.
    #[must_use]
    pub fn for_pass(pass: RenderPass) -> Self {
        Self {
            pass,
            by_cid: AHashMap::new(),
        }
    }

    /// Render pass this registry belongs to.
    #[must_use]
    pub const fn pass(&self) -> RenderPass {
        self.pass
    }

    pub(crate) fn bind(
        &mut self,
        model: ModelRef<R>,
        view: Box<dyn ItemView<R>>,
        container: ContainerKey,
    ) {
        self.by_cid.insert(
            model.cid(),
            ItemBinding {
                model,
                view,
                container,
            },
        );
    }

    /// Binding for `cid`.
    #[must_use]
    pub fn get(&self, cid: Cid) -> Option<&ItemBinding<R>> {
        self.by_cid.get(&cid)
    }

    /// Resolve a view handle; stale or unknown handles yield `None`.
    #[must_use]
    pub fn resolve(&self, handle: ViewHandle) -> Option<&ItemBinding<R>> {
        if handle.pass != self.pass {
            return None;
        }
        self.by_cid.get(&handle.cid)
    }

    /// Handle for the view bound to `cid`.
    #[must_use]
    pub fn handle(&self, cid: Cid) -> Option<ViewHandle> {
        self.by_cid.contains_key(&cid).then_some(ViewHandle {
            cid,
            pass: self.pass,
        })
    }

    /// Container key for `cid`.
    #[must_use]
    pub fn container_of(&self, cid: Cid) -> Option<ContainerKey> {
        self.by_cid.get(&cid).map(|b| b.container)
    }

    /// Model bound to `cid`, which may no longer be in the store.
    #[must_use]
    pub fn model(&self, cid: Cid) -> Option<&ModelRef<R>> {
        self.by_cid.get(&cid).map(|b| &b.model)
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_cid.len()
    }

    /// Whether nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_cid.is_empty()
    }
}
