#![forbid(unsafe_code)]

//! Configuration errors.
//!
//! Every variant is a programmer error raised synchronously at the call site.
//! Stale references (addressing a record that no longer exists) are never
//! errors; they are dropped silently.

use std::fmt;

use collectionview_core::Cid;

/// Error returned by collection view operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Selection was read or written on a view configured as non-selectable.
    NotSelectable,
    /// `set_option` was given a name outside the recognized set.
    UnknownOption(String),
    /// `set_option` was given a value of the wrong shape.
    InvalidOptionValue {
        option: &'static str,
        expected: &'static str,
    },
    /// No item template, model view, or default view could build a view.
    NoViewForModel(Cid),
    /// The host element lacks a structural child it needs.
    MissingHostStructure(&'static str),
    /// An item view's element tag does not fit the host.
    ContainerTagMismatch {
        expected: &'static str,
        found: String,
    },
    /// Selection restore ran without a prior save.
    NoSavedSelection,
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSelectable => write!(f, "attempt to select items on a non-selectable list"),
            Self::UnknownOption(name) => write!(f, "{name} is not an allowed option"),
            Self::InvalidOptionValue { option, expected } => {
                write!(f, "invalid value for option {option}: expected {expected}")
            }
            Self::NoViewForModel(cid) => write!(f, "could not find a model view for model {cid}"),
            Self::MissingHostStructure(part) => {
                write!(f, "host element is missing its required <{part}> child")
            }
            Self::ContainerTagMismatch { expected, found } => write!(
                f,
                "item view element must be <{expected}> for this host, found <{found}>"
            ),
            Self::NoSavedSelection => {
                write!(f, "attempt to restore selection but no selection has been saved")
            }
        }
    }
}

impl std::error::Error for CollectionError {}
