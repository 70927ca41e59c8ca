//! # config-flatten
//!
//! Flatten JSON and YAML documents into configuration keys.
//!
//! Every leaf of the document becomes one entry whose key joins the keys and
//! array indices leading to it with `:`. Scalars become strings; nulls become
//! an explicit absent value. Keys compare case-insensitively and the first
//! value written for a key wins.
//!
//! ## Quick Start
//!
//! ```rust
//! use config_flatten::{parse_json, parse_yaml};
//!
//! let data = parse_json(r#"{"Logging": {"Level": "Debug", "Sinks": ["console"]}}"#).unwrap();
//! assert_eq!(data.get_str("logging:level"), Some("Debug"));
//! assert_eq!(data.get_str("Logging:Sinks:0"), Some("console"));
//!
//! let data = parse_yaml("Database:\n  Port: 5432\n  Password:\n").unwrap();
//! assert_eq!(data.get_str("Database:Port"), Some("5432"));
//! assert_eq!(data.get("Database:Password"), Some(None));
//! ```
//!
//! Documents whose root is not an object or mapping, and YAML streams that do
//! not hold exactly one document, are rejected with a [`FormatError`].

mod config;
mod error;
mod flat;
mod flatten;
mod format;
pub mod node;
pub mod path;

use std::io::Read;

pub use config::FlattenOptions;
pub use error::{FormatError, JsonKind, ParseError};
pub use flat::{FlatMap, IntoIter, Iter};
pub use flatten::flatten;
pub use format::DocumentFormat;
pub use node::Node;
pub use path::KEY_DELIMITER;

/// Flattens documents with a fixed set of options.
///
/// A `Flattener` holds no per-call state and can be shared across threads.
///
/// ```rust
/// use config_flatten::{DocumentFormat, FlattenOptions, Flattener};
///
/// let mut options = FlattenOptions::default();
/// options.max_depth = 8;
/// let flattener = Flattener::new(options);
///
/// let data = flattener.flatten_str(DocumentFormat::Yaml, "a:\n  - b\n").unwrap();
/// assert_eq!(data.get_str("a:0"), Some("b"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    #[must_use]
    pub fn new(options: FlattenOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Flatten a JSON document given as text.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` for malformed JSON and `ParseError::Format`
    /// when the root is not an object or nesting exceeds `max_depth`.
    pub fn flatten_json_str(&self, text: &str) -> Result<FlatMap, ParseError> {
        format::json::flatten_json_str(text, &self.options)
    }

    /// Flatten a JSON document read to completion from `reader`.
    ///
    /// # Errors
    ///
    /// As [`Flattener::flatten_json_str`], plus read failures and inputs larger
    /// than `max_input_bytes`.
    pub fn flatten_json_reader<R: Read>(&self, reader: R) -> Result<FlatMap, ParseError> {
        format::json::flatten_json_reader(reader, &self.options)
    }

    /// Flatten a single-document YAML stream given as text.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Yaml` for malformed YAML and `ParseError::Format`
    /// when the stream does not hold exactly one document, the root is not a
    /// mapping, nesting exceeds `max_depth`, or aliases expand past
    /// `max_alias_nodes`.
    pub fn flatten_yaml_str(&self, text: &str) -> Result<FlatMap, ParseError> {
        format::yaml::flatten_yaml_str(text, &self.options)
    }

    /// Flatten a single-document YAML stream read to completion from `reader`.
    ///
    /// # Errors
    ///
    /// As [`Flattener::flatten_yaml_str`], plus read failures, inputs larger
    /// than `max_input_bytes` and input that is not UTF-8.
    pub fn flatten_yaml_reader<R: Read>(&self, reader: R) -> Result<FlatMap, ParseError> {
        format::yaml::flatten_yaml_reader(reader, &self.options)
    }

    /// Flatten text in the given format.
    ///
    /// # Errors
    ///
    /// See [`Flattener::flatten_json_str`] and [`Flattener::flatten_yaml_str`].
    pub fn flatten_str(&self, format: DocumentFormat, text: &str) -> Result<FlatMap, ParseError> {
        match format {
            DocumentFormat::Json => self.flatten_json_str(text),
            DocumentFormat::Yaml => self.flatten_yaml_str(text),
        }
    }

    /// Flatten a stream in the given format.
    ///
    /// # Errors
    ///
    /// See [`Flattener::flatten_json_reader`] and
    /// [`Flattener::flatten_yaml_reader`].
    pub fn flatten_reader<R: Read>(
        &self,
        format: DocumentFormat,
        reader: R,
    ) -> Result<FlatMap, ParseError> {
        match format {
            DocumentFormat::Json => self.flatten_json_reader(reader),
            DocumentFormat::Yaml => self.flatten_yaml_reader(reader),
        }
    }
}

/// Flatten a JSON document with default options.
///
/// # Errors
///
/// See [`Flattener::flatten_json_str`].
pub fn parse_json(text: &str) -> Result<FlatMap, ParseError> {
    Flattener::default().flatten_json_str(text)
}

/// Flatten a JSON stream with default options.
///
/// # Errors
///
/// See [`Flattener::flatten_json_reader`].
pub fn parse_json_reader<R: Read>(reader: R) -> Result<FlatMap, ParseError> {
    Flattener::default().flatten_json_reader(reader)
}

/// Flatten a single-document YAML stream with default options.
///
/// # Errors
///
/// See [`Flattener::flatten_yaml_str`].
pub fn parse_yaml(text: &str) -> Result<FlatMap, ParseError> {
    Flattener::default().flatten_yaml_str(text)
}

/// Flatten a single-document YAML stream read from `reader` with default options.
///
/// # Errors
///
/// See [`Flattener::flatten_yaml_reader`].
pub fn parse_yaml_reader<R: Read>(reader: R) -> Result<FlatMap, ParseError> {
    Flattener::default().flatten_yaml_reader(reader)
}
