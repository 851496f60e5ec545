#![forbid(unsafe_code)]

//! Data-only collection view configuration.
//!
//! [`CollectionConfig`] holds the options that are plain data (flags, the
//! caption text, the host tag, drag settings) so they can live in a file.
//! Closures such as view constructors and filters are added afterwards on the
//! [`CollectionOptions`](crate::options::CollectionOptions) built from it.
//!
//! # Loading
//!
//! ```toml
//! select_multiple = true
//! empty_list_caption = "No employees"
//! host_tag = "table"
//!
//! [sortable_settings]
//! axis = "horizontal"
//! distance = 4
//! ```
//!
//! ```rust,ignore
//! let config = CollectionConfig::from_toml_file("employees.toml")?;
//! let options = CollectionOptions::from_config(&config).collection(store);
//! ```

use std::collections::BTreeMap;
#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::host::SortableSettings;

/// Data-only subset of the collection view options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct CollectionConfig {
    pub selectable: bool,
    pub click_to_select: bool,
    pub select_multiple: bool,
    pub click_to_toggle: bool,
    pub process_key_events: bool,
    pub sortable: bool,
    pub sortable_settings: SortableSettings,
    pub empty_list_caption: Option<String>,
    /// Tag of the host element (`ul`, `ol`, `table`, ...).
    pub host_tag: String,
    /// Forwarded to every model view constructor.
    pub model_view_options: BTreeMap<String, String>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            selectable: true,
            click_to_select: true,
            select_multiple: false,
            click_to_toggle: false,
            process_key_events: true,
            sortable: false,
            sortable_settings: SortableSettings::default(),
            empty_list_caption: None,
            host_tag: "ul".into(),
            model_view_options: BTreeMap::new(),
        }
    }
}

impl CollectionConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check option combinations.
    ///
    /// Returns a list of problems. An empty list means the config is usable
    /// as is.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.click_to_toggle && !self.select_multiple {
            errors.push("click_to_toggle has no effect without select_multiple".into());
        }
        if self.select_multiple && !self.selectable {
            errors.push("select_multiple requires selectable".into());
        }
        if self.click_to_select && !self.selectable {
            errors.push("click_to_select requires selectable".into());
        }
        if self.host_tag.trim().is_empty() {
            errors.push("host_tag must not be empty".into());
        }
        if self.sortable && self.sortable_settings.distance == 0 {
            // Zero distance turns every click into a drag.
            errors.push("sortable_settings.distance must be > 0".into());
        }

        errors
    }

    /// Validate, failing with every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(message = "collection.config.invalid", problems = errors.len());
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Errors that can occur when loading a collection config.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
