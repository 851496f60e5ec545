#![forbid(unsafe_code)]

//! Collection view options.
//!
//! [`CollectionOptions`] is the configuration bag handed to
//! [`CollectionView::new`](crate::collection_view::CollectionView::new).
//! Later reconfiguration goes through
//! [`CollectionView::set_option`](crate::collection_view::CollectionView::set_option),
//! which names options with [`OptionName`] and carries values as
//! [`OptionValue`].

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use collectionview_core::{Record, RecordStore};

use crate::config::CollectionConfig;
use crate::error::CollectionError;
use crate::host::{HostElement, SortableSettings};
use crate::view::{DefaultViews, ItemTemplate, ModelFilter, ViewConstructor, ViewOptions};

/// Caption shown when no item is visible.
#[derive(Clone)]
pub enum EmptyCaption {
    /// Fixed text.
    Text(String),
    /// Text computed on every render pass.
    Dynamic(Rc<dyn Fn() -> String>),
}

impl EmptyCaption {
    /// Caption text for the current pass.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Dynamic(f) => f(),
        }
    }
}

impl fmt::Debug for EmptyCaption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for EmptyCaption {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for EmptyCaption {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Configuration bag for a collection view.
pub struct CollectionOptions<R: Record> {
    pub collection: Option<RecordStore<R>>,
    pub model_view: Option<ViewConstructor<R>>,
    pub model_view_options: ViewOptions,
    pub item_template: Option<ItemTemplate<R>>,
    pub empty_list_caption: Option<EmptyCaption>,
    pub selectable: bool,
    pub click_to_select: bool,
    pub selectable_models_filter: Option<ModelFilter<R>>,
    pub visible_models_filter: Option<ModelFilter<R>>,
    pub sortable_models_filter: Option<ModelFilter<R>>,
    pub select_multiple: bool,
    pub click_to_toggle: bool,
    pub process_key_events: bool,
    pub sortable: bool,
    pub sortable_settings: SortableSettings,
    /// Per-view fallback constructor, consulted after `model_view`.
    pub default_view: Option<ViewConstructor<R>>,
    /// Fallback shared with other views, consulted last.
    pub default_views: Option<DefaultViews<R>>,
    pub host: HostElement,
}

impl<R: Record> Default for CollectionOptions<R> {
    fn default() -> Self {
        Self {
            collection: None,
            model_view: None,
            model_view_options: ViewOptions::new(),
            item_template: None,
            empty_list_caption: None,
            selectable: true,
            click_to_select: true,
            selectable_models_filter: None,
            visible_models_filter: None,
            sortable_models_filter: None,
            select_multiple: false,
            click_to_toggle: false,
            process_key_events: true,
            sortable: false,
            sortable_settings: SortableSettings::default(),
            default_view: None,
            default_views: None,
            host: HostElement::default(),
        }
    }
}

impl<R: Record> fmt::Debug for CollectionOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionOptions")
            .field("collection", &self.collection)
            .field("model_view", &self.model_view.is_some())
            .field("item_template", &self.item_template.is_some())
            .field("empty_list_caption", &self.empty_list_caption)
            .field("selectable", &self.selectable)
            .field("click_to_select", &self.click_to_select)
            .field("select_multiple", &self.select_multiple)
            .field("click_to_toggle", &self.click_to_toggle)
            .field("process_key_events", &self.process_key_events)
            .field("sortable", &self.sortable)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl<R: Record> CollectionOptions<R> {
    /// Defaults: selectable, click to select, single selection, keyboard on.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options seeded from a data-only config.
    #[must_use]
    pub fn from_config(config: &CollectionConfig) -> Self {
        let mut options = Self::new()
            .selectable(config.selectable)
            .click_to_select(config.click_to_select)
            .select_multiple(config.select_multiple)
            .click_to_toggle(config.click_to_toggle)
            .process_key_events(config.process_key_events)
            .sortable(config.sortable)
            .sortable_settings(config.sortable_settings)
            .host(HostElement::from_tag(&config.host_tag))
            .model_view_options(config.model_view_options.clone());
        if let Some(caption) = &config.empty_list_caption {
            options = options.empty_list_caption(caption.as_str());
        }
        options
    }

    #[must_use]
    pub fn collection(mut self, store: RecordStore<R>) -> Self {
        self.collection = Some(store);
        self
    }

    #[must_use]
    pub fn model_view(mut self, constructor: ViewConstructor<R>) -> Self {
        self.model_view = Some(constructor);
        self
    }

    #[must_use]
    pub fn model_view_options(mut self, options: ViewOptions) -> Self {
        self.model_view_options = options;
        self
    }

    #[must_use]
    pub fn item_template(mut self, template: impl Fn(&R) -> String + 'static) -> Self {
        self.item_template = Some(Rc::new(template));
        self
    }

    #[must_use]
    pub fn empty_list_caption(mut self, caption: impl Into<EmptyCaption>) -> Self {
        self.empty_list_caption = Some(caption.into());
        self
    }

    #[must_use]
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub fn click_to_select(mut self, click_to_select: bool) -> Self {
        self.click_to_select = click_to_select;
        self
    }

    #[must_use]
    pub fn selectable_models_filter(
        mut self,
        filter: impl Fn(&collectionview_core::Model<R>) -> bool + 'static,
    ) -> Self {
        self.selectable_models_filter = Some(Rc::new(filter));
        self
    }

    #[must_use]
    pub fn visible_models_filter(
        mut self,
        filter: impl Fn(&collectionview_core::Model<R>) -> bool + 'static,
    ) -> Self {
        self.visible_models_filter = Some(Rc::new(filter));
        self
    }

    #[must_use]
    pub fn sortable_models_filter(
        mut self,
        filter: impl Fn(&collectionview_core::Model<R>) -> bool + 'static,
    ) -> Self {
        self.sortable_models_filter = Some(Rc::new(filter));
        self
    }

    #[must_use]
    pub fn select_multiple(mut self, select_multiple: bool) -> Self {
        self.select_multiple = select_multiple;
        self
    }

    #[must_use]
    pub fn click_to_toggle(mut self, click_to_toggle: bool) -> Self {
        self.click_to_toggle = click_to_toggle;
        self
    }

    #[must_use]
    pub fn process_key_events(mut self, process_key_events: bool) -> Self {
        self.process_key_events = process_key_events;
        self
    }

    #[must_use]
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    #[must_use]
    pub fn sortable_settings(mut self, settings: SortableSettings) -> Self {
        self.sortable_settings = settings;
        self
    }

    #[must_use]
    pub fn default_view(mut self, constructor: ViewConstructor<R>) -> Self {
        self.default_view = Some(constructor);
        self
    }

    #[must_use]
    pub fn default_views(mut self, shared: DefaultViews<R>) -> Self {
        self.default_views = Some(shared);
        self
    }

    #[must_use]
    pub fn host(mut self, host: HostElement) -> Self {
        self.host = host;
        self
    }

    /// Assign `value` to the option `name` without side effects.
    ///
    /// Returns the previous collection when `name` is
    /// [`OptionName::Collection`].
    pub(crate) fn assign(
        &mut self,
        name: OptionName,
        value: OptionValue<R>,
    ) -> Result<Option<RecordStore<R>>, CollectionError> {
        let invalid = || CollectionError::InvalidOptionValue {
            option: name.as_str(),
            expected: name.expected(),
        };
        match (name, value) {
            (OptionName::Collection, OptionValue::Store(store)) => {
                return Ok(self.collection.replace(store));
            }
            (OptionName::ModelView, OptionValue::ModelView(ctor)) => self.model_view = Some(ctor),
            (OptionName::ModelView, OptionValue::Unset) => self.model_view = None,
            (OptionName::ModelViewOptions, OptionValue::ViewOptions(options)) => {
                self.model_view_options = options;
            }
            (OptionName::ItemTemplate, OptionValue::Template(template)) => {
                self.item_template = Some(template);
            }
            (OptionName::ItemTemplate, OptionValue::Unset) => self.item_template = None,
            (OptionName::EmptyListCaption, OptionValue::Text(text)) => {
                self.empty_list_caption = Some(EmptyCaption::Text(text));
            }
            (OptionName::EmptyListCaption, OptionValue::Caption(caption)) => {
                self.empty_list_caption = Some(caption);
            }
            (OptionName::EmptyListCaption, OptionValue::Unset) => self.empty_list_caption = None,
            (OptionName::SelectableModelsFilter, OptionValue::Filter(f)) => {
                self.selectable_models_filter = Some(f);
            }
            (OptionName::SelectableModelsFilter, OptionValue::Unset) => {
                self.selectable_models_filter = None;
            }
            (OptionName::VisibleModelsFilter, OptionValue::Filter(f)) => {
                self.visible_models_filter = Some(f);
            }
            (OptionName::VisibleModelsFilter, OptionValue::Unset) => {
                self.visible_models_filter = None;
            }
            (OptionName::SortableModelsFilter, OptionValue::Filter(f)) => {
                self.sortable_models_filter = Some(f);
            }
            (OptionName::SortableModelsFilter, OptionValue::Unset) => {
                self.sortable_models_filter = None;
            }
            (flag, OptionValue::Bool(on)) => {
                let slot = match flag {
                    OptionName::Selectable => &mut self.selectable,
                    OptionName::ClickToSelect => &mut self.click_to_select,
                    OptionName::SelectMultiple => &mut self.select_multiple,
                    OptionName::ClickToToggle => &mut self.click_to_toggle,
                    OptionName::ProcessKeyEvents => &mut self.process_key_events,
                    OptionName::Sortable => &mut self.sortable,
                    _ => return Err(invalid()),
                };
                *slot = on;
            }
            _ => return Err(invalid()),
        }
        Ok(None)
    }
}

/// Options recognized by `set_option`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionName {
    Collection,
    ModelView,
    ModelViewOptions,
    ItemTemplate,
    EmptyListCaption,
    Selectable,
    ClickToSelect,
    SelectableModelsFilter,
    VisibleModelsFilter,
    SelectMultiple,
    ClickToToggle,
    ProcessKeyEvents,
    Sortable,
    SortableModelsFilter,
}

impl OptionName {
    pub const ALL: [Self; 14] = [
        Self::Collection,
        Self::ModelView,
        Self::ModelViewOptions,
        Self::ItemTemplate,
        Self::EmptyListCaption,
        Self::Selectable,
        Self::ClickToSelect,
        Self::SelectableModelsFilter,
        Self::VisibleModelsFilter,
        Self::SelectMultiple,
        Self::ClickToToggle,
        Self::ProcessKeyEvents,
        Self::Sortable,
        Self::SortableModelsFilter,
    ];

    /// Option name as hosts spell it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::ModelView => "modelView",
            Self::ModelViewOptions => "modelViewOptions",
            Self::ItemTemplate => "itemTemplate",
            Self::EmptyListCaption => "emptyListCaption",
            Self::Selectable => "selectable",
            Self::ClickToSelect => "clickToSelect",
            Self::SelectableModelsFilter => "selectableModelsFilter",
            Self::VisibleModelsFilter => "visibleModelsFilter",
            Self::SelectMultiple => "selectMultiple",
            Self::ClickToToggle => "clickToToggle",
            Self::ProcessKeyEvents => "processKeyEvents",
            Self::Sortable => "sortable",
            Self::SortableModelsFilter => "sortableModelsFilter",
        }
    }

    /// Whether changing this option re-renders the view.
    #[must_use]
    pub const fn requires_render(self) -> bool {
        matches!(
            self,
            Self::Collection
                | Self::ModelView
                | Self::ModelViewOptions
                | Self::ItemTemplate
                | Self::SelectableModelsFilter
                | Self::VisibleModelsFilter
        )
    }

    const fn expected(self) -> &'static str {
        match self {
            Self::Collection => "a record store",
            Self::ModelView => "a view constructor or unset",
            Self::ModelViewOptions => "view options",
            Self::ItemTemplate => "an item template or unset",
            Self::EmptyListCaption => "caption text or unset",
            Self::SelectableModelsFilter
            | Self::VisibleModelsFilter
            | Self::SortableModelsFilter => "a model filter or unset",
            Self::Selectable
            | Self::ClickToSelect
            | Self::SelectMultiple
            | Self::ClickToToggle
            | Self::ProcessKeyEvents
            | Self::Sortable => "a boolean",
        }
    }
}

impl fmt::Display for OptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionName {
    type Err = CollectionError;

    /// Accepts the camelCase host spelling and its snake_case equivalent.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s.chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| CollectionError::UnknownOption(s.to_owned()))
    }
}

/// Value passed to `set_option`.
pub enum OptionValue<R: Record> {
    Bool(bool),
    Text(String),
    Caption(EmptyCaption),
    Store(RecordStore<R>),
    ModelView(ViewConstructor<R>),
    ViewOptions(ViewOptions),
    Template(ItemTemplate<R>),
    Filter(ModelFilter<R>),
    /// Clear an optional setting.
    Unset,
}

impl<R: Record> From<bool> for OptionValue<R> {
    fn from(on: bool) -> Self {
        Self::Bool(on)
    }
}

impl<R: Record> From<&str> for OptionValue<R> {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl<R: Record> From<RecordStore<R>> for OptionValue<R> {
    fn from(store: RecordStore<R>) -> Self {
        Self::Store(store)
    }
}

impl<R: Record> OptionValue<R> {
    /// Wrap a model predicate.
    #[must_use]
    pub fn filter(f: impl Fn(&collectionview_core::Model<R>) -> bool + 'static) -> Self {
        Self::Filter(Rc::new(f))
    }

    /// Wrap an item template.
    #[must_use]
    pub fn template(f: impl Fn(&R) -> String + 'static) -> Self {
        Self::Template(Rc::new(f))
    }
}

impl<R: Record> fmt::Debug for OptionValue<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(on) => f.debug_tuple("Bool").field(on).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Caption(caption) => f.debug_tuple("Caption").field(caption).finish(),
            Self::Store(store) => f.debug_tuple("Store").field(store).finish(),
            Self::ModelView(_) => f.write_str("ModelView(..)"),
            Self::ViewOptions(options) => f.debug_tuple("ViewOptions").field(options).finish(),
            Self::Template(_) => f.write_str("Template(..)"),
            Self::Filter(_) => f.write_str("Filter(..)"),
            Self::Unset => f.write_str("Unset"),
        }
    }
}
