#![forbid(unsafe_code)]

//! The collection view.
//!
//! [`CollectionView`] keeps a [`RecordStore`] in sync with a rendered
//! [`ItemTree`] and owns the selection. The other engine modules add to it:
//! render passes live in [`reconcile`](crate::reconcile), save/restore in
//! [`restore`](crate::restore), drag callbacks in
//! [`sortable`](crate::sortable), and click/key handling in
//! [`input`](crate::input).
//!
//! # Store changes
//!
//! The view subscribes to its store, but store notifications only queue in an
//! inbox. They are processed by [`CollectionView::sync`], which every
//! mutating entry point runs first. Pending changes are coalesced:
//!
//! | Pending                      | Reaction                                        |
//! |------------------------------|-------------------------------------------------|
//! | `Add`                        | render                                          |
//! | `Remove`                     | render, restoring with offset fallback          |
//! | `Reset`                      | validate selection, render without fallback     |
//! | `Reorder` only               | render if the tree order differs from the store |
//!
//! Nothing renders until the view has rendered once; before that only the
//! selection is validated.
//!
//! # Invariants
//!
//! 1. After any public mutation, every selected model is in the store and
//!    passes the selectability filter.
//! 2. Exactly the containers of selected records carry the selection marker.
//! 3. Reads validate against the store on every call, so they are accurate
//!    even with unprocessed store changes.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use collectionview_core::{
    Cid, ModelRef, Record, RecordStore, StoreChange, Subscribers, Subscription,
};
use tracing::{debug, warn};

use crate::addressing::{AddressingMode, Resolver, SelectionKey, Selector};
use crate::binding::BindingRegistry;
use crate::error::CollectionError;
use crate::events::CollectionEvent;
use crate::host::{Container, ContainerFlags, ItemTree};
use crate::options::{CollectionOptions, OptionName, OptionValue};
use crate::restore::SavedSelection;
use crate::selection::{SelectionDiff, SelectionSet, SetOptions, retain_valid};

type Inbox = Rc<RefCell<VecDeque<StoreChange>>>;

/// Selection and render-reconciliation engine for one list or table.
pub struct CollectionView<R: Record> {
    pub(crate) options: CollectionOptions<R>,
    pub(crate) store: RecordStore<R>,
    inbox: Inbox,
    _store_subscription: Subscription,
    pub(crate) tree: ItemTree,
    pub(crate) bindings: BindingRegistry<R>,
    pub(crate) selection: SelectionSet<R>,
    pub(crate) saved: Option<SavedSelection<R>>,
    /// Root of shift-click ranges.
    pub(crate) anchor: Option<Cid>,
    pub(crate) rendered: bool,
    events: Subscribers<CollectionEvent<R>>,
}

impl<R: Record> std::fmt::Debug for CollectionView<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionView")
            .field("store", &self.store)
            .field("selection", &self.selection)
            .field("rendered", &self.rendered)
            .field("pass", &self.bindings.pass())
            .field("pending", &self.inbox.borrow().len())
            .finish_non_exhaustive()
    }
}

fn subscribe_store<R: Record>(store: &RecordStore<R>, inbox: &Inbox) -> Subscription {
    let inbox = Rc::clone(inbox);
    store.subscribe(move |change| inbox.borrow_mut().push_back(*change))
}

impl<R: Record> CollectionView<R> {
    /// Build a view. Nothing is rendered until [`render`](Self::render).
    ///
    /// Without a `collection` option the view gets a fresh empty store.
    pub fn new(mut options: CollectionOptions<R>) -> Result<Self, CollectionError> {
        options.host.validate().inspect_err(|err| {
            warn!(message = "collection.config.error", %err);
        })?;
        let store = options.collection.get_or_insert_with(RecordStore::new).clone();
        let inbox: Inbox = Rc::new(RefCell::new(VecDeque::new()));
        let _store_subscription = subscribe_store(&store, &inbox);
        Ok(Self {
            tree: ItemTree::new(options.host.kind()),
            options,
            store,
            inbox,
            _store_subscription,
            bindings: BindingRegistry::default(),
            selection: SelectionSet::new(),
            saved: None,
            anchor: None,
            rendered: false,
            events: Subscribers::new(),
        })
    }

    /// Observe notifications. Dropping the guard unsubscribes.
    pub fn subscribe(&self, callback: impl Fn(&CollectionEvent<R>) + 'static) -> Subscription {
        self.events.subscribe(callback)
    }

    pub(crate) fn emit(&self, event: CollectionEvent<R>) {
        self.events.emit(&event);
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &RecordStore<R> {
        &self.store
    }

    /// Current options.
    #[must_use]
    pub fn options(&self) -> &CollectionOptions<R> {
        &self.options
    }

    /// The rendered tree.
    #[must_use]
    pub fn tree(&self) -> &ItemTree {
        &self.tree
    }

    /// The rendered tree, for the drag library to move containers around.
    pub fn tree_mut(&mut self) -> &mut ItemTree {
        &mut self.tree
    }

    /// Bindings of the current render pass.
    #[must_use]
    pub fn bindings(&self) -> &BindingRegistry<R> {
        &self.bindings
    }

    /// Whether the view has rendered at least once.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    /// Number of store notifications not yet processed.
    #[must_use]
    pub fn pending_changes(&self) -> usize {
        self.inbox.borrow().len()
    }

    /// Process pending store notifications.
    pub fn sync(&mut self) -> Result<(), CollectionError> {
        let Some(fallback) = self.react_to_store() else {
            return Ok(());
        };
        if self.rendered {
            if let Some(offset_fallback) = fallback {
                self.render_pass(offset_fallback)?;
            }
        }
        Ok(())
    }

    /// Drain the inbox, relaying each change.
    ///
    /// Returns `None` when nothing was pending, otherwise whether a render is
    /// needed and if so whether offset fallback applies.
    pub(crate) fn react_to_store(&mut self) -> Option<Option<bool>> {
        let pending: Vec<StoreChange> = self.inbox.borrow_mut().drain(..).collect();
        if pending.is_empty() {
            return None;
        }
        let reset = pending.contains(&StoreChange::Reset);
        let content_changed = reset
            || pending
                .iter()
                .any(|c| matches!(c, StoreChange::Add { .. } | StoreChange::Remove { .. }));
        if reset || !self.rendered {
            self.revalidate("store.validate");
        }
        for change in pending {
            self.emit(CollectionEvent::StoreChanged(change));
        }
        let needs_render = content_changed || self.tree.item_order() != self.store.cids();
        Some(needs_render.then_some(!reset))
    }

    pub(crate) fn discard_pending(&self, change: StoreChange) {
        self.inbox.borrow_mut().retain(|c| *c != change);
    }

    /// Change one option after construction.
    ///
    /// `name` uses the host spelling (`selectMultiple`) or snake case.
    /// Options in the re-render set render immediately; replacing the
    /// collection renders only if the view has rendered before.
    pub fn set_option(&mut self, name: &str, value: OptionValue<R>) -> Result<(), CollectionError> {
        self.sync()?;
        let name: OptionName = name.parse().inspect_err(|err| {
            warn!(message = "collection.config.error", %err);
        })?;
        let flag = match &value {
            OptionValue::Bool(on) => Some(*on),
            _ => None,
        };

        if name == OptionName::Selectable && flag == Some(false) && !self.selection.is_empty() {
            self.select_none(SetOptions::default())?;
        }

        let previous = self.options.assign(name, value).inspect_err(|err| {
            warn!(message = "collection.config.error", %err);
        })?;

        match name {
            OptionName::SelectMultiple if flag == Some(false) && self.selection.len() > 1 => {
                let first = self.selection.models()[..1].to_vec();
                self.commit(first, SetOptions::default(), "collapse")?;
            }
            OptionName::SelectableModelsFilter => self.revalidate("filter"),
            OptionName::Collection => {
                let store = self.options.collection.clone().unwrap_or_default();
                let replaced = previous.is_none_or(|old| !old.ptr_eq(&store));
                if replaced {
                    self.inbox.borrow_mut().clear();
                    self._store_subscription = subscribe_store(&store, &self.inbox);
                    self.store = store;
                }
                // A new store is a reset: no offset fallback.
                self.revalidate("store.validate");
                if self.rendered {
                    self.render_pass(false)?;
                }
                return Ok(());
            }
            _ => {}
        }

        if name.requires_render() {
            self.render()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    fn resolver(&self) -> Resolver<'_, R> {
        Resolver {
            store: &self.store,
            bindings: &self.bindings,
            tree: &self.tree,
        }
    }

    fn current(&self) -> SelectionSet<R> {
        let mut current = self.selection.clone();
        retain_valid(
            &mut current,
            &self.store,
            self.options.selectable_models_filter.as_ref(),
        );
        current
    }

    /// The selection expressed in `mode`.
    ///
    /// Reads take `&self` and never drain pending store changes. Members
    /// that left the store or became unselectable are hidden at once, but
    /// the successor picked by offset fallback after a `Remove` only shows
    /// up once [`sync`](Self::sync) (or any mutating call) has run.
    #[must_use]
    pub fn selected(&self, mode: AddressingMode) -> Selector<R> {
        self.resolver().read(&self.current(), mode)
    }

    /// First selected value in `mode`.
    #[must_use]
    pub fn selected_one(&self, mode: AddressingMode) -> Option<SelectionKey<R>> {
        self.selected(mode).first()
    }

    /// Selected models in selection order. Same visibility as
    /// [`selected`](Self::selected).
    #[must_use]
    pub fn selected_models(&self) -> Vec<ModelRef<R>> {
        self.current().models().to_vec()
    }

    /// Selected cids in selection order. Same visibility as
    /// [`selected`](Self::selected).
    #[must_use]
    pub fn selected_cids(&self) -> Vec<Cid> {
        self.current().cids()
    }

    /// Whether `cid` is selected. Restored members count only after `sync`.
    #[must_use]
    pub fn is_selected(&self, cid: Cid) -> bool {
        self.current().contains(cid)
    }

    /// Whether anything is selected. May read `false` between a `Remove`
    /// and the `sync` that restores a successor.
    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.current().is_empty()
    }

    /// Containers of the selected records, in selection order.
    #[must_use]
    pub fn selected_containers(&self) -> Vec<&Container> {
        self.current()
            .cids()
            .into_iter()
            .filter_map(|cid| self.bindings.container_of(cid))
            .filter_map(|key| self.tree.container(key))
            .collect()
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Replace the selection with the records `selector` denotes.
    ///
    /// Values that do not resolve are dropped. Fails only when the view is
    /// not selectable.
    pub fn set_selected(
        &mut self,
        selector: Selector<R>,
        options: SetOptions,
    ) -> Result<(), CollectionError> {
        self.sync()?;
        let candidates = self.resolver().resolve(&selector);
        self.commit(candidates, options, "set")
    }

    /// Select a single value; `None` clears the selection.
    pub fn set_selected_one(
        &mut self,
        key: Option<SelectionKey<R>>,
        options: SetOptions,
    ) -> Result<(), CollectionError> {
        match key {
            Some(key) => self.set_selected(key.into(), options),
            None => self.select_none(options),
        }
    }

    /// Clear the selection.
    pub fn select_none(&mut self, options: SetOptions) -> Result<(), CollectionError> {
        self.sync()?;
        self.commit(Vec::new(), options, "clear")
    }

    /// Add or remove one record. `on` defaults to the opposite of its
    /// current state.
    pub fn toggle_selected(
        &mut self,
        cid: Cid,
        on: Option<bool>,
        options: SetOptions,
    ) -> Result<(), CollectionError> {
        self.sync()?;
        let mut next = self.current().models().to_vec();
        let present = next.iter().any(|m| m.cid() == cid);
        match on.unwrap_or(!present) {
            true if !present => next.extend(self.store.get(cid)),
            false => next.retain(|m| m.cid() != cid),
            true => {}
        }
        self.commit(next, options, "toggle")
    }

    /// Select the visible item at `offset`. With `clamp`, offsets past the
    /// end select the last visible item.
    pub fn select_offset(
        &mut self,
        offset: usize,
        clamp: bool,
        options: SetOptions,
    ) -> Result<(), CollectionError> {
        self.sync()?;
        let visible = self.tree.visible_len();
        let offset = if clamp && visible > 0 {
            offset.min(visible - 1)
        } else {
            offset
        };
        let candidates = self.resolver().resolve(&Selector::Offsets(vec![offset]));
        self.commit(candidates, options, "offset")
    }

    /// Validate `candidates` and make them the selection.
    ///
    /// Markers are toggled only on containers whose state changed.
    /// `SelectionChanged` fires on change unless silenced;
    /// `UpdateDependentControls` fires every time.
    pub(crate) fn commit(
        &mut self,
        candidates: Vec<ModelRef<R>>,
        options: SetOptions,
        action: &'static str,
    ) -> Result<(), CollectionError> {
        if !self.options.selectable {
            warn!(message = "collection.config.error", err = %CollectionError::NotSelectable, action);
            return Err(CollectionError::NotSelectable);
        }
        let requested = !candidates.is_empty();
        let mut next = SelectionSet::from_models(candidates);
        retain_valid(
            &mut next,
            &self.store,
            self.options.selectable_models_filter.as_ref(),
        );
        // Asking only for unselectable records leaves the selection alone.
        let rejected = requested && next.is_empty();
        if rejected {
            next = self.selection.clone();
        }

        let changed = !next.same_members(&self.selection);
        if changed {
            let diff = self.selection.diff(&next);
            self.apply_markers(&diff);
            let old = std::mem::replace(&mut self.selection, next);
            if !options.silent {
                self.emit(CollectionEvent::SelectionChanged {
                    new: self.selection.models().to_vec(),
                    old: old.models().to_vec(),
                });
            }
        }
        debug!(
            message = "collection.selection",
            action,
            selected_count = self.selection.len(),
            changed,
            rejected
        );
        self.update_dependent_controls();
        Ok(())
    }

    /// Drop selected records that left the store or fail the filter,
    /// notifying only if something was dropped.
    pub(crate) fn revalidate(&mut self, action: &'static str) {
        let mut next = self.selection.clone();
        retain_valid(
            &mut next,
            &self.store,
            self.options.selectable_models_filter.as_ref(),
        );
        if next.len() == self.selection.len() {
            return;
        }
        let diff = self.selection.diff(&next);
        self.apply_markers(&diff);
        let old = std::mem::replace(&mut self.selection, next);
        debug!(
            message = "collection.selection",
            action,
            selected_count = self.selection.len(),
            changed = true
        );
        self.emit(CollectionEvent::SelectionChanged {
            new: self.selection.models().to_vec(),
            old: old.models().to_vec(),
        });
        self.update_dependent_controls();
    }

    pub(crate) fn apply_markers(&mut self, diff: &SelectionDiff) {
        let updates = diff
            .removed
            .iter()
            .map(|cid| (*cid, false))
            .chain(diff.added.iter().map(|cid| (*cid, true)));
        for (cid, on) in updates {
            let Some(key) = self.bindings.container_of(cid) else {
                continue;
            };
            if let Some(container) = self.tree.container_mut(key) {
                container.set_flag(ContainerFlags::SELECTED, on);
            }
        }
    }

    pub(crate) fn update_dependent_controls(&self) {
        self.emit(CollectionEvent::UpdateDependentControls(
            self.selection.models().to_vec(),
        ));
    }
}
