#![forbid(unsafe_code)]

//! Host element and the rendered item tree.
//!
//! [`ItemTree`] is the engine's mirror of the rendered subtree: one
//! [`Container`] per record, in visual order, plus an optional empty-list
//! caption. Each container carries the cid of its record as a presentation
//! attribute (`item_id`) so the host's input layer can hit-test without
//! consulting the binding registry. The registry, not this attribute, is the
//! source of truth for which view belongs to which record.
//!
//! The tree is rebuilt from scratch on every render pass. Between passes it is
//! mutated only by selection marker toggles and by the drag library moving
//! containers around.

use bitflags::bitflags;
use collectionview_core::Cid;
use collectionview_core::event::PointerTarget;

use crate::error::CollectionError;

/// Structural kind of the host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum HostKind {
    /// `ul`/`ol`-like host; items are wrapped in `li` containers.
    #[default]
    List,
    /// `table` host; item views must themselves be `tr` rows.
    Table,
}

impl HostKind {
    /// Tag of the container wrapping each item.
    #[must_use]
    pub const fn item_tag(self) -> &'static str {
        match self {
            Self::List => "li",
            Self::Table => "tr",
        }
    }
}

/// Description of the element a collection view renders into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostElement {
    tag: String,
    kind: HostKind,
    has_body: bool,
}

impl Default for HostElement {
    fn default() -> Self {
        Self::list()
    }
}

impl HostElement {
    /// An unordered list host.
    #[must_use]
    pub fn list() -> Self {
        Self::from_tag("ul")
    }

    /// A table host with its `tbody`.
    #[must_use]
    pub fn table() -> Self {
        Self::from_tag("table")
    }

    /// Host for an arbitrary tag. `table` renders as a table, anything else
    /// as a list.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_ascii_lowercase();
        let kind = if tag == "table" {
            HostKind::Table
        } else {
            HostKind::List
        };
        Self {
            tag,
            kind,
            has_body: true,
        }
    }

    /// Mark whether a table host has its `tbody`.
    #[must_use]
    pub fn with_body(mut self, has_body: bool) -> Self {
        self.has_body = has_body;
        self
    }

    /// Host tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Structural kind.
    #[must_use]
    pub const fn kind(&self) -> HostKind {
        self.kind
    }

    /// Check that the host has the children its kind requires.
    pub fn validate(&self) -> Result<(), CollectionError> {
        if self.kind == HostKind::Table && !self.has_body {
            return Err(CollectionError::MissingHostStructure("tbody"));
        }
        Ok(())
    }
}

/// Drag axis passed to the drag library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

/// Settings handed to the drag library when reordering is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SortableSettings {
    /// Constrain dragging to one axis.
    pub axis: Axis,
    /// Pointer travel (cells) before a drag starts.
    pub distance: u16,
    /// Size the placeholder like the dragged item.
    pub force_placeholder_size: bool,
}

impl Default for SortableSettings {
    fn default() -> Self {
        Self {
            axis: Axis::Vertical,
            distance: 10,
            force_placeholder_size: true,
        }
    }
}

bitflags! {
    /// Presentation markers on a container.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContainerFlags: u8 {
        /// The record is selected.
        const SELECTED     = 0b001;
        /// Accepted by the sortability filter.
        const SORTABLE     = 0b010;
        /// Rejected by the sortability filter; not draggable.
        const NOT_SORTABLE = 0b100;
    }
}

/// Stable handle to a container within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerKey(u32);

/// One rendered item container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    key: ContainerKey,
    item_id: Cid,
    tag: &'static str,
    content: String,
    hidden: bool,
    flags: ContainerFlags,
}

impl Container {
    /// Tree-local key.
    #[must_use]
    pub const fn key(&self) -> ContainerKey {
        self.key
    }

    /// Cid mirrored onto the container for hit-testing.
    #[must_use]
    pub const fn item_id(&self) -> Cid {
        self.item_id
    }

    /// Container tag (`li` or `tr`).
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Rendered content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the container is hidden.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Presentation markers.
    #[must_use]
    pub const fn flags(&self) -> ContainerFlags {
        self.flags
    }

    /// Whether the selection marker is set.
    #[must_use]
    pub const fn is_selected(&self) -> bool {
        self.flags.contains(ContainerFlags::SELECTED)
    }

    pub(crate) fn set_flag(&mut self, flag: ContainerFlags, on: bool) {
        self.flags.set(flag, on);
    }
}

/// Caption shown when no item is visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    /// Caption text.
    pub text: String,
    /// Wrapper tag matching the host structure (`li` or `tr`).
    pub tag: &'static str,
}

/// The rendered subtree of a collection view.
#[derive(Debug, Clone, Default)]
pub struct ItemTree {
    kind: HostKind,
    containers: Vec<Container>,
    caption: Option<Caption>,
    sortable: Option<SortableSettings>,
    next_key: u32,
}

impl ItemTree {
    /// Empty tree for a host of `kind`.
    #[must_use]
    pub fn new(kind: HostKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Host kind.
    #[must_use]
    pub const fn kind(&self) -> HostKind {
        self.kind
    }

    /// Append a fresh container and return its key.
    pub(crate) fn append(&mut self, item_id: Cid, content: String, hidden: bool) -> ContainerKey {
        let key = self.alloc_key();
        self.containers.push(Container {
            key,
            item_id,
            tag: self.kind.item_tag(),
            content,
            hidden,
            flags: ContainerFlags::empty(),
        });
        key
    }

    pub(crate) fn set_caption(&mut self, text: String) {
        self.caption = Some(Caption {
            text,
            tag: self.kind.item_tag(),
        });
    }

    pub(crate) fn enable_sorting(&mut self, settings: SortableSettings) {
        self.sortable = Some(settings);
    }

    pub(crate) fn clear_flag(&mut self, flag: ContainerFlags) {
        for container in &mut self.containers {
            container.flags.remove(flag);
        }
    }

    fn alloc_key(&mut self) -> ContainerKey {
        let key = ContainerKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        key
    }

    /// All containers in visual order, hidden ones included.
    #[must_use]
    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    /// Number of containers (hidden ones included, caption excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// Whether the tree has no item containers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Empty-list caption, if shown.
    #[must_use]
    pub fn caption(&self) -> Option<&Caption> {
        self.caption.as_ref()
    }

    /// Drag settings, if reordering is enabled.
    #[must_use]
    pub fn sortable(&self) -> Option<&SortableSettings> {
        self.sortable.as_ref()
    }

    /// Container by key.
    #[must_use]
    pub fn container(&self, key: ContainerKey) -> Option<&Container> {
        self.containers.iter().find(|c| c.key == key)
    }

    pub(crate) fn container_mut(&mut self, key: ContainerKey) -> Option<&mut Container> {
        self.containers.iter_mut().find(|c| c.key == key)
    }

    /// Visual position of the container with `key`.
    #[must_use]
    pub fn position(&self, key: ContainerKey) -> Option<usize> {
        self.containers.iter().position(|c| c.key == key)
    }

    /// Visual position of the first container mirroring `cid`.
    #[must_use]
    pub fn position_of(&self, cid: Cid) -> Option<usize> {
        self.containers.iter().position(|c| c.item_id == cid)
    }

    /// Cids of all containers in visual order.
    #[must_use]
    pub fn item_order(&self) -> Vec<Cid> {
        self.containers.iter().map(|c| c.item_id).collect()
    }

    /// Visible containers in visual order.
    pub fn visible(&self) -> impl Iterator<Item = &Container> {
        self.containers.iter().filter(|c| !c.hidden)
    }

    /// Whether any container is visible.
    #[must_use]
    pub fn has_visible(&self) -> bool {
        self.visible().next().is_some()
    }

    /// Number of visible containers.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }

    /// Visible container at visual `offset`.
    #[must_use]
    pub fn visible_at(&self, offset: usize) -> Option<&Container> {
        self.visible().nth(offset)
    }

    /// Visual offset of `cid` among visible containers.
    #[must_use]
    pub fn visible_offset(&self, cid: Cid) -> Option<usize> {
        self.visible().position(|c| c.item_id == cid)
    }

    /// Resolve a visible row to a pointer target via the mirrored cid.
    ///
    /// Rows past the last visible item (including the caption row) hit the
    /// background.
    #[must_use]
    pub fn hit_test(&self, row: usize) -> PointerTarget {
        self.visible_at(row)
            .map_or(PointerTarget::Background, |c| PointerTarget::Item(c.item_id))
    }

    /// Whether the drag library may pick up the container at `index`.
    #[must_use]
    pub fn is_draggable(&self, index: usize) -> bool {
        self.sortable.is_some()
            && self
                .containers
                .get(index)
                .is_some_and(|c| !c.flags.contains(ContainerFlags::NOT_SORTABLE))
    }

    /// Move the container at `from` to `to` (both clamped).
    ///
    /// Returns `false` when `from` is out of range.
    pub fn move_container(&mut self, from: usize, to: usize) -> bool {
        if from >= self.containers.len() {
            return false;
        }
        let container = self.containers.remove(from);
        let to = to.min(self.containers.len());
        self.containers.insert(to, container);
        true
    }

    /// Remove the container mirroring `cid` (drag-out to another list).
    pub fn take_container(&mut self, cid: Cid) -> Option<Container> {
        let index = self.position_of(cid)?;
        Some(self.containers.remove(index))
    }

    /// Insert a container taken from another tree at `at` (clamped).
    ///
    /// The container gets a key from this tree; its tag follows this host.
    pub fn insert_container(&mut self, at: usize, mut container: Container) -> ContainerKey {
        let key = self.alloc_key();
        container.key = key;
        container.tag = self.kind.item_tag();
        let at = at.min(self.containers.len());
        self.containers.insert(at, container);
        key
    }

    /// Text rendering of the visible rows: selected rows are prefixed with
    /// `> `, others with two spaces. The caption, if any, is the last line.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .visible()
            .map(|c| {
                let marker = if c.is_selected() { "> " } else { "  " };
                format!("{marker}{}", c.content)
            })
            .collect();
        if let Some(caption) = &self.caption {
            out.push(caption.text.clone());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collectionview_core::{Model, Record};

    struct R;
    impl Record for R {
        type Id = u8;
        fn id(&self) -> Option<u8> {
            None
        }
    }

    fn cids(n: usize) -> Vec<Cid> {
        (0..n).map(|_| Model::new(R).cid()).collect()
    }

    fn tree(hidden: &[bool]) -> (ItemTree, Vec<Cid>) {
        let ids = cids(hidden.len());
        let mut tree = ItemTree::new(HostKind::List);
        for (i, (&cid, &h)) in ids.iter().zip(hidden).enumerate() {
            tree.append(cid, format!("item {i}"), h);
        }
        (tree, ids)
    }

    #[test]
    fn host_from_tag() {
        assert_eq!(HostElement::from_tag("TABLE").kind(), HostKind::Table);
        assert_eq!(HostElement::from_tag("ol").kind(), HostKind::List);
        assert_eq!(HostElement::table().kind().item_tag(), "tr");
        assert_eq!(HostElement::list().kind().item_tag(), "li");
    }

    #[test]
    fn table_without_body_fails_validation() {
        assert!(HostElement::table().validate().is_ok());
        assert_eq!(
            HostElement::table().with_body(false).validate(),
            Err(CollectionError::MissingHostStructure("tbody"))
        );
        assert!(HostElement::list().with_body(false).validate().is_ok());
    }

    #[test]
    fn offsets_skip_hidden_containers() {
        let (tree, ids) = tree(&[false, true, false]);
        assert_eq!(tree.visible_len(), 2);
        assert_eq!(tree.visible_offset(ids[0]), Some(0));
        assert_eq!(tree.visible_offset(ids[1]), None);
        assert_eq!(tree.visible_offset(ids[2]), Some(1));
        assert_eq!(tree.visible_at(1).map(Container::item_id), Some(ids[2]));
    }

    #[test]
    fn hit_test_maps_rows_through_mirror() {
        let (tree, ids) = tree(&[true, false]);
        assert_eq!(tree.hit_test(0), PointerTarget::Item(ids[1]));
        assert_eq!(tree.hit_test(1), PointerTarget::Background);
    }

    #[test]
    fn move_and_transfer_containers() {
        let (mut tree, ids) = tree(&[false, false, false]);
        assert!(tree.move_container(2, 0));
        assert_eq!(tree.item_order(), vec![ids[2], ids[0], ids[1]]);
        assert!(!tree.move_container(5, 0));

        let (mut other, _) = self::tree(&[false]);
        let taken = tree.take_container(ids[0]).unwrap();
        let key = other.insert_container(0, taken);
        assert_eq!(other.position(key), Some(0));
        assert_eq!(other.containers()[0].item_id(), ids[0]);
        assert_eq!(tree.item_order(), vec![ids[2], ids[1]]);
    }

    #[test]
    fn draggable_requires_sorting_and_marker() {
        let (mut tree, _) = tree(&[false, false]);
        assert!(!tree.is_draggable(0));
        tree.enable_sorting(SortableSettings::default());
        let key = tree.containers()[1].key();
        tree.container_mut(key)
            .unwrap()
            .set_flag(ContainerFlags::NOT_SORTABLE, true);
        assert!(tree.is_draggable(0));
        assert!(!tree.is_draggable(1));
        assert!(!tree.is_draggable(2));
    }

    #[test]
    fn lines_mark_selection_and_caption() {
        let (mut tree, _) = tree(&[false, false]);
        let key = tree.containers()[0].key();
        tree.container_mut(key)
            .unwrap()
            .set_flag(ContainerFlags::SELECTED, true);
        assert_eq!(tree.lines(), vec!["> item 0", "  item 1"]);

        let mut tree = ItemTree::new(HostKind::Table);
        tree.set_caption("Nothing here".into());
        assert_eq!(tree.lines(), vec!["Nothing here"]);
        assert_eq!(tree.caption().unwrap().tag, "tr");
    }
}
