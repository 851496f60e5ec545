#![forbid(unsafe_code)]

//! Canonical input events consumed by collection views.
//!
//! The host's input layer does its own hit-testing and hands the engine
//! already-resolved targets: a [`PointerEvent`] names the item (by cid) or
//! the empty background that was clicked, and a [`KeyEvent`] carries the key
//! and modifiers.
//!
//! # Design Notes
//!
//! - `KeyEventKind` defaults to `Press` when the source cannot tell.
//! - `Modifiers` use bitflags for easy combination.
//! - A click that bubbled up from a nested, different list is reported as
//!   [`PointerTarget::Foreign`] and ignored by the receiving view.

use bitflags::bitflags;

use crate::model::Cid;

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this event is a press or auto-repeat.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// Key codes the engine distinguishes.
///
/// Arrows move the selection; `Enter` is passed through unconsumed so the
/// host can act on the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// Enter/Return key.
    Enter,
    /// Up arrow key.
    Up,
    /// Down arrow key.
    Down,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerTarget {
    /// An item container carrying this cid.
    Item(Cid),
    /// The list's own empty background.
    Background,
    /// Something that belongs to a different list.
    Foreign,
}

/// Pointer gesture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Single primary-button click.
    Click,
    /// Double click.
    DoubleClick,
}

/// A resolved pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Gesture kind.
    pub kind: PointerKind,
    /// Hit-tested target.
    pub target: PointerTarget,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// A plain click on `target`.
    #[must_use]
    pub const fn click(target: PointerTarget) -> Self {
        Self {
            kind: PointerKind::Click,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// A double click on `target`.
    #[must_use]
    pub const fn double_click(target: PointerTarget) -> Self {
        Self {
            kind: PointerKind::DoubleClick,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if a toggle modifier (Ctrl or Super/Meta) is held.
    #[must_use]
    pub const fn toggle_modifier(&self) -> bool {
        self.modifiers.intersects(Modifiers::CTRL.union(Modifiers::SUPER))
    }
}
