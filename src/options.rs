//! String-keyed configuration consumed by both engines
//!
//! Readers and writers take a [`ParameterMap`] instead of format-specific
//! option structs so that applications can configure any format through one
//! surface. A format implementation reads the keys it recognizes and ignores
//! the rest.
//!
//! # Example
//!
//! ```
//! use phylostream::options::{keys, ParameterMap};
//!
//! let options = ParameterMap::new()
//!     .with_integer(keys::MAX_TOKENS_PER_EVENT, 512)
//!     .with_text(keys::MATCH_TOKEN, ".")
//!     .with_flag(keys::REPLACE_MATCH_TOKENS, true);
//!
//! assert_eq!(options.integer(keys::MAX_TOKENS_PER_EVENT), Some(512));
//! assert_eq!(options.text(keys::LINE_SEPARATOR), None); // unset
//! ```

use std::collections::HashMap;

/// Recognized parameter keys
///
/// Unrecognized keys are silently ignored by a given format implementation,
/// so options for several formats can share one map.
pub mod keys {
    /// Chunk size bound for sequence-token events (integer)
    pub const MAX_TOKENS_PER_EVENT: &str = "max_tokens_per_event";
    /// Length threshold above which comments are split into continued runs (integer)
    pub const MAX_COMMENT_LENGTH: &str = "max_comment_length";
    /// Placeholder token meaning "same as the reference sequence" (text)
    pub const MATCH_TOKEN: &str = "match_token";
    /// Whether match tokens are replaced from the reference sequence (flag)
    pub const REPLACE_MATCH_TOKENS: &str = "replace_match_tokens";
    /// Output line length for writers that wrap (integer)
    pub const LINE_LENGTH: &str = "line_length";
    /// Output line separator for writers (text)
    pub const LINE_SEPARATOR: &str = "line_separator";
    /// Truncation bound for written element labels (integer)
    pub const MAXIMUM_NAME_LENGTH: &str = "maximum_name_length";
    /// Fill token used when padding sequences to a rectangular matrix (text)
    pub const SEQUENCE_EXTENSION_TOKEN: &str = "sequence_extension_token";
    /// Application name written into file-header metadata (text)
    pub const APPLICATION_NAME: &str = "application_name";
    /// Application version written into file-header metadata (text)
    pub const APPLICATION_VERSION: &str = "application_version";
    /// Application URL written into file-header metadata (text)
    pub const APPLICATION_URL: &str = "application_url";
}

/// A single typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    /// Free-form text value
    Text(String),
    /// Non-negative integer value
    Integer(u64),
    /// Boolean flag
    Flag(bool),
}

/// Generic string-keyed option map
///
/// Typed accessors return `None` both for missing keys and for values of the
/// wrong type, so callers always fall back to their documented defaults.
#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    values: HashMap<String, ParameterValue>,
}

impl ParameterMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a text value, replacing any previous value under the key
    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), ParameterValue::Text(value.into()));
    }

    /// Set an integer value, replacing any previous value under the key
    pub fn set_integer(&mut self, key: impl Into<String>, value: u64) {
        self.values.insert(key.into(), ParameterValue::Integer(value));
    }

    /// Set a flag value, replacing any previous value under the key
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.values.insert(key.into(), ParameterValue::Flag(value));
    }

    /// Builder-style [`set_text`](Self::set_text)
    pub fn with_text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(key, value);
        self
    }

    /// Builder-style [`set_integer`](Self::set_integer)
    pub fn with_integer(mut self, key: impl Into<String>, value: u64) -> Self {
        self.set_integer(key, value);
        self
    }

    /// Builder-style [`set_flag`](Self::set_flag)
    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set_flag(key, value);
        self
    }

    /// Text value under `key`, if present and of text type
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ParameterValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Integer value under `key`, if present and of integer type
    pub fn integer(&self, key: &str) -> Option<u64> {
        match self.values.get(key) {
            Some(ParameterValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    /// Flag value under `key`, if present and of flag type
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.values.get(key) {
            Some(ParameterValue::Flag(value)) => Some(*value),
            _ => None,
        }
    }

    /// Integer value as `usize` with a fallback default
    pub fn usize_or(&self, key: &str, default: usize) -> usize {
        self.integer(key).map(|v| v as usize).unwrap_or(default)
    }

    /// Whether any value is present under `key`
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

/// Static information about the application driving a writer
///
/// Writers place these values into file-header metadata of formats that
/// carry generator information. Constructed once by the application and
/// passed explicitly; there is no global instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    /// Application name
    pub name: String,
    /// Application version string
    pub version: String,
    /// Application homepage or documentation URL
    pub url: Option<String>,
}

impl ApplicationInfo {
    /// Create application info from the parameter map keys, if all are set
    pub fn from_parameters(parameters: &ParameterMap) -> Option<Self> {
        Some(Self {
            name: parameters.text(keys::APPLICATION_NAME)?.to_owned(),
            version: parameters.text(keys::APPLICATION_VERSION)?.to_owned(),
            url: parameters.text(keys::APPLICATION_URL).map(str::to_owned),
        })
    }
}
