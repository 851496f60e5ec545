#![forbid(unsafe_code)]

//! Render passes.
//!
//! A pass throws away the previous tree and binding registry and rebuilds
//! both from the store, in store order:
//!
//! 1. if selectable, save the selection and its first visible offset;
//! 2. build one view per record, wrap it in a container tagged with the
//!    record's cid, render it, and register the binding; a view that renders
//!    `None` or a record rejected by the visibility filter yields a hidden
//!    container that stays addressable;
//! 3. if sorting is on, mark containers against the sortability filter and
//!    hand the drag settings to the tree;
//! 4. if a caption is configured and nothing is visible, add it;
//! 5. emit `Render`;
//! 6. if selectable, restore the selection and emit
//!    `UpdateDependentControls`.
//!
//! The new tree replaces the old one only once every view was built, so a
//! failing pass leaves the previous render intact.

use std::rc::Rc;

use collectionview_core::{ModelRef, Record};
use tracing::warn;
use web_time::Instant;

use crate::binding::BindingRegistry;
use crate::collection_view::CollectionView;
use crate::error::CollectionError;
use crate::events::CollectionEvent;
use crate::host::{ContainerFlags, HostKind, ItemTree};
use crate::view::{DefaultViews, ItemView, TemplateView};

impl<R: Record> CollectionView<R> {
    /// Rebuild the tree and bindings from the store.
    ///
    /// Pending store changes are processed first, but no extra pass is run
    /// for them.
    pub fn render(&mut self) -> Result<(), CollectionError> {
        let offset_fallback = match self.react_to_store() {
            Some(Some(fallback)) => fallback,
            _ => true,
        };
        self.render_pass(offset_fallback)
    }

    pub(crate) fn render_pass(&mut self, offset_fallback: bool) -> Result<(), CollectionError> {
        let render_start = Instant::now();
        let total_items = self.store.len();
        let render_span = tracing::debug_span!(
            "collection.render",
            total_items,
            visible_items = tracing::field::Empty,
            selected_count = tracing::field::Empty,
            render_duration_us = tracing::field::Empty
        );
        let _render_guard = render_span.enter();

        self.options.host.validate().inspect_err(|err| {
            warn!(message = "collection.config.error", %err);
        })?;

        let saved = self.options.selectable.then(|| self.capture_selection());

        let (tree, bindings) = self.build().inspect_err(|err| {
            warn!(message = "collection.config.error", %err);
        })?;
        self.tree = tree;
        self.bindings = bindings;
        self.rendered = true;

        self.emit(CollectionEvent::Render);

        if let Some(saved) = saved {
            self.restore_from(saved, offset_fallback);
            self.update_dependent_controls();
        }

        let elapsed_us = render_start.elapsed().as_micros() as u64;
        render_span.record("visible_items", self.tree.visible_len());
        render_span.record("selected_count", self.selection.len());
        render_span.record("render_duration_us", elapsed_us);
        Ok(())
    }

    fn build(&self) -> Result<(ItemTree, BindingRegistry<R>), CollectionError> {
        let kind = self.options.host.kind();
        let mut tree = ItemTree::new(kind);
        let mut bindings = BindingRegistry::for_pass(self.bindings.pass().next());

        for model in self.store.models() {
            let mut view = self.build_view(&model)?;
            if kind == HostKind::Table && view.element_tag() != "tr" {
                return Err(CollectionError::ContainerTagMismatch {
                    expected: "tr",
                    found: view.element_tag().to_owned(),
                });
            }
            let content = view.render(&model);
            let filtered_out = self
                .options
                .visible_models_filter
                .as_ref()
                .is_some_and(|f| !f(model.as_ref()));
            let hidden = content.is_none() || filtered_out;
            let key = tree.append(model.cid(), content.unwrap_or_default(), hidden);

            if self.options.sortable {
                if let Some(filter) = &self.options.sortable_models_filter {
                    let flag = if filter(model.as_ref()) {
                        ContainerFlags::SORTABLE
                    } else {
                        ContainerFlags::NOT_SORTABLE
                    };
                    if let Some(container) = tree.container_mut(key) {
                        container.set_flag(flag, true);
                    }
                }
            }
            bindings.bind(model, view, key);
        }

        if self.options.sortable {
            tree.enable_sorting(self.options.sortable_settings);
        }
        if let Some(caption) = &self.options.empty_list_caption {
            if !tree.has_visible() {
                tree.set_caption(caption.text());
            }
        }
        Ok((tree, bindings))
    }

    /// Resolve the view for `model`: item template, then model view, then
    /// the per-view default, then the shared default.
    fn build_view(&self, model: &ModelRef<R>) -> Result<Box<dyn ItemView<R>>, CollectionError> {
        if let Some(template) = &self.options.item_template {
            let tag = self.options.host.kind().item_tag();
            return Ok(Box::new(TemplateView::new(Rc::clone(template), tag)));
        }
        let constructor = self
            .options
            .model_view
            .clone()
            .or_else(|| self.options.default_view.clone())
            .or_else(|| self.options.default_views.as_ref().and_then(DefaultViews::get))
            .ok_or(CollectionError::NoViewForModel(model.cid()))?;
        Ok(constructor(model, &self.options.model_view_options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostElement;
    use crate::options::CollectionOptions;
    use crate::view::{ViewOptions, view_constructor};
    use collectionview_core::{Model, RecordStore};

    #[derive(Debug)]
    struct Task {
        title: &'static str,
        done: bool,
    }
    impl Record for Task {
        type Id = &'static str;
        fn id(&self) -> Option<&'static str> {
            Some(self.title)
        }
    }

    struct TitleView {
        prefix: String,
    }
    impl ItemView<Task> for TitleView {
        fn render(&mut self, model: &Model<Task>) -> Option<String> {
            (!model.done).then(|| format!("{}{}", self.prefix, model.title))
        }
    }

    struct Row;
    impl ItemView<Task> for Row {
        fn element_tag(&self) -> &str {
            "tr"
        }
        fn render(&mut self, model: &Model<Task>) -> Option<String> {
            Some(model.title.to_string())
        }
    }

    fn tasks() -> RecordStore<Task> {
        RecordStore::from_records([
            Task { title: "write", done: false },
            Task { title: "test", done: true },
            Task { title: "ship", done: false },
        ])
    }

    fn title_view() -> crate::view::ViewConstructor<Task> {
        view_constructor(|_, options: &ViewOptions| TitleView {
            prefix: options.get("prefix").cloned().unwrap_or_default(),
        })
    }

    #[test]
    fn hidden_items_stay_in_the_tree() {
        let store = tasks();
        let mut view =
            CollectionView::new(CollectionOptions::new().collection(store).model_view(title_view()))
                .unwrap();
        view.render().unwrap();
        assert_eq!(view.tree().len(), 3);
        assert_eq!(view.tree().visible_len(), 2);
        assert_eq!(view.bindings().len(), 3);
        assert_eq!(view.tree().lines(), vec!["  write", "  ship"]);
    }

    #[test]
    fn view_options_reach_constructor() {
        let mut options = ViewOptions::new();
        options.insert("prefix".into(), "- ".into());
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .model_view(title_view())
                .model_view_options(options),
        )
        .unwrap();
        view.render().unwrap();
        assert_eq!(view.tree().containers()[0].content(), "- write");
    }

    #[test]
    fn visibility_filter_hides_but_binds() {
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .item_template(|t: &Task| t.title.to_uppercase())
                .visible_models_filter(|m: &Model<Task>| m.title != "write"),
        )
        .unwrap();
        view.render().unwrap();
        assert_eq!(view.tree().lines(), vec!["  TEST", "  SHIP"]);
        assert!(view.tree().containers()[0].is_hidden());
    }

    #[test]
    fn missing_view_is_an_error() {
        let store = tasks();
        let first = store.models()[0].cid();
        let mut view = CollectionView::new(CollectionOptions::new().collection(store)).unwrap();
        assert_eq!(view.render(), Err(CollectionError::NoViewForModel(first)));
        assert!(!view.is_rendered());
    }

    #[test]
    fn default_view_chain() {
        let shared = DefaultViews::new();
        shared.set(view_constructor(|_, _| Row));
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .default_views(shared.clone()),
        )
        .unwrap();
        view.render().unwrap();
        assert_eq!(view.tree().visible_len(), 3);

        view.set_option("modelView", crate::options::OptionValue::ModelView(title_view()))
            .unwrap();
        assert_eq!(view.tree().visible_len(), 2);
    }

    #[test]
    fn table_host_requires_row_views() {
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .host(HostElement::table())
                .model_view(title_view()),
        )
        .unwrap();
        assert_eq!(
            view.render(),
            Err(CollectionError::ContainerTagMismatch {
                expected: "tr",
                found: "div".into()
            })
        );

        let mut rows = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .host(HostElement::table())
                .model_view(view_constructor(|_, _| Row)),
        )
        .unwrap();
        rows.render().unwrap();
        assert!(rows.tree().containers().iter().all(|c| c.tag() == "tr"));
    }

    #[test]
    fn table_host_without_body_fails_construction() {
        let err = CollectionView::<Task>::new(
            CollectionOptions::new().host(HostElement::table().with_body(false)),
        )
        .unwrap_err();
        assert_eq!(err, CollectionError::MissingHostStructure("tbody"));
    }

    #[test]
    fn caption_only_when_nothing_visible() {
        let store = tasks();
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(store.clone())
                .item_template(|t: &Task| t.title.into())
                .visible_models_filter(|m: &Model<Task>| m.done)
                .empty_list_caption("Nothing to do"),
        )
        .unwrap();
        view.render().unwrap();
        assert!(view.tree().caption().is_none());

        store.remove(store.models()[1].cid());
        view.sync().unwrap();
        assert_eq!(view.tree().lines(), vec!["Nothing to do"]);
    }

    #[test]
    fn sortable_filter_marks_containers() {
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .item_template(|t: &Task| t.title.into())
                .sortable(true)
                .sortable_models_filter(|m: &Model<Task>| !m.done),
        )
        .unwrap();
        view.render().unwrap();
        let flags: Vec<ContainerFlags> =
            view.tree().containers().iter().map(|c| c.flags()).collect();
        assert_eq!(
            flags,
            vec![
                ContainerFlags::SORTABLE,
                ContainerFlags::NOT_SORTABLE,
                ContainerFlags::SORTABLE
            ]
        );
        assert!(view.tree().sortable().is_some());
        assert!(!view.tree().is_draggable(1));
    }

    #[test]
    fn each_pass_gets_fresh_bindings() {
        let mut view = CollectionView::new(
            CollectionOptions::new()
                .collection(tasks())
                .model_view(title_view()),
        )
        .unwrap();
        view.render().unwrap();
        let first = view.bindings().pass();
        view.render().unwrap();
        assert_eq!(view.bindings().pass(), first.next());
    }
}
