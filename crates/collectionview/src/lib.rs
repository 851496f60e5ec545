#![forbid(unsafe_code)]

//! Selection and render-reconciliation engine for list and table views.
//!
//! # Role
//! A [`CollectionView`] renders every record of a
//! [`RecordStore`](collectionview_core::RecordStore) into an [`ItemTree`],
//! tracks which records are selected, and keeps both consistent as the store
//! changes underneath it or the user drags items around.
//!
//! # Primary responsibilities
//! - **Reconciliation**: each render pass rebuilds the tree and the
//!   cid-keyed [`BindingRegistry`] from scratch.
//! - **Selection**: read and written through five [`AddressingMode`]s; every
//!   write is validated against the store and the selectability filter.
//! - **Restoration**: the selection survives render passes, falling back to
//!   the previously selected visual offset when the selected record is gone.
//! - **Drag reorder**: the store is reordered to match the tree in one silent
//!   step when a drag ends.
//!
//! # Example
//! ```rust,ignore
//! let store = RecordStore::from_records(employees);
//! let mut view = CollectionView::new(
//!     CollectionOptions::new()
//!         .collection(store.clone())
//!         .item_template(|e: &Employee| e.name.clone())
//!         .select_multiple(true),
//! )?;
//! let _sub = view.subscribe(|event| println!("{}", event.name()));
//! view.render()?;
//! view.set_selected(Selector::Offsets(vec![0, 2]), SetOptions::default())?;
//! ```

pub mod addressing;
pub mod binding;
pub mod collection_view;
pub mod config;
pub mod error;
pub mod events;
pub mod host;
pub mod input;
pub mod options;
pub mod reconcile;
pub mod restore;
pub mod selection;
pub mod sortable;
pub mod view;

pub use addressing::{AddressingMode, SelectionKey, Selector};
pub use binding::{BindingRegistry, ItemBinding, RenderPass, ViewHandle};
pub use collection_view::CollectionView;
pub use config::{CollectionConfig, ConfigError};
pub use error::CollectionError;
pub use events::CollectionEvent;
pub use host::{
    Axis, Caption, Container, ContainerFlags, ContainerKey, HostElement, HostKind, ItemTree,
    SortableSettings,
};
pub use options::{CollectionOptions, EmptyCaption, OptionName, OptionValue};
pub use restore::SavedSelection;
pub use selection::{SelectionDiff, SelectionSet, SetOptions};
pub use sortable::connected_drop;
pub use view::{
    DefaultViews, ItemTemplate, ItemView, ModelFilter, TemplateView, ViewConstructor, ViewOptions,
    view_constructor,
};

pub use collectionview_core::event::{
    KeyCode, KeyEvent, KeyEventKind, Modifiers, PointerEvent, PointerKind, PointerTarget,
};
pub use collectionview_core::{Cid, Model, ModelRef, Record, RecordStore, StoreChange, Subscription};
